use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Charm configuration options.
///
/// Every option has a default such that an empty configuration produces a
/// valid launch specification. The orchestration runtime supplies options as
/// strings; [`CharmConfig::from_options`] parses that bag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CharmConfig {
    /// Primary HTTP service port.
    pub port: u16,
    /// gRPC service port; 0 disables the gRPC listener entirely.
    pub grpc_port: u16,
    /// Maximum number of aggregated metrics; -1 means unbounded.
    pub metrics_count_limit: i64,
    /// Scrape timeout in seconds.
    pub scrape_timeout: u64,
}

impl CharmConfig {
    pub const DEFAULT_PORT: u16 = 9091;
    pub const DEFAULT_GRPC_PORT: u16 = 9092;
    pub const DEFAULT_METRICS_COUNT_LIMIT: i64 = -1;
    pub const DEFAULT_SCRAPE_TIMEOUT: u64 = 10;

    /// Build a configuration from the runtime's string-valued option bag.
    ///
    /// Unknown keys are ignored; missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidValue`] if a recognized option fails to parse
    pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = options.get("port") {
            config.port = parse_option("port", value)?;
        }
        if let Some(value) = options.get("grpc_port") {
            config.grpc_port = parse_option("grpc_port", value)?;
        }
        if let Some(value) = options.get("metrics_count_limit") {
            config.metrics_count_limit = parse_option("metrics_count_limit", value)?;
        }
        if let Some(value) = options.get("scrape_timeout") {
            config.scrape_timeout = parse_option("scrape_timeout", value)?;
        }
        Ok(config)
    }
}

impl Default for CharmConfig {
    fn default() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            grpc_port: Self::DEFAULT_GRPC_PORT,
            metrics_count_limit: Self::DEFAULT_METRICS_COUNT_LIMIT,
            scrape_timeout: Self::DEFAULT_SCRAPE_TIMEOUT,
        }
    }
}

fn parse_option<T: std::str::FromStr>(option: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            option: option.to_string(),
            value: value.to_string(),
        })
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for option {option}: {value:?}")]
    InvalidValue { option: String, value: String },
}

/// Source of the current configuration snapshot.
///
/// Owned by the orchestration runtime; the charm reads a fresh snapshot on
/// every reconciliation and never caches it across events.
pub trait ConfigSource {
    fn current(&self) -> Result<CharmConfig, ConfigError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_option_bag_yields_defaults() {
        let config = CharmConfig::from_options(&BTreeMap::new()).expect("empty bag parses");
        assert_eq!(config, CharmConfig::default());
        assert_eq!(config.port, 9091);
        assert_eq!(config.grpc_port, 9092);
        assert_eq!(config.metrics_count_limit, -1);
        assert_eq!(config.scrape_timeout, 10);
    }

    #[test]
    fn recognized_options_override_defaults() {
        let config = CharmConfig::from_options(&options(&[
            ("metrics_count_limit", "200"),
            ("scrape_timeout", "30"),
        ]))
        .expect("overrides parse");
        assert_eq!(config.metrics_count_limit, 200);
        assert_eq!(config.scrape_timeout, 30);
        assert_eq!(config.port, CharmConfig::DEFAULT_PORT);
    }

    #[test]
    fn unknown_options_are_ignored() {
        let config = CharmConfig::from_options(&options(&[("log_level", "debug")]))
            .expect("unknown keys ignored");
        assert_eq!(config, CharmConfig::default());
    }

    #[test]
    fn unparsable_value_is_rejected_with_the_option_name() {
        let err = CharmConfig::from_options(&options(&[("port", "many")]))
            .expect_err("bad port rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref option, .. } if option == "port"
        ));
    }

    #[test]
    fn deserializes_from_yaml_with_missing_fields_defaulted() {
        let config: CharmConfig =
            serde_yaml::from_str("metrics_count_limit: 25\n").expect("partial yaml parses");
        assert_eq!(config.metrics_count_limit, 25);
        assert_eq!(config.grpc_port, CharmConfig::DEFAULT_GRPC_PORT);
    }
}
