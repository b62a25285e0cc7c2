use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::charm::CharmConfig;
use crate::exposure::ServicePort;

/// Name of the managed workload process and its primary service port entry.
pub const SERVICE_NAME: &str = "prometheus-edge-hub";

/// Definition of a single supervised service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub summary: String,
    #[serde(rename = "override")]
    pub override_policy: String,
    pub startup: String,
    pub command: String,
}

impl ServiceSpec {
    /// A service that replaces any previous definition and starts on boot.
    pub fn replacing(summary: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            override_policy: "replace".to_string(),
            startup: "enabled".to_string(),
            command: command.into(),
        }
    }
}

/// A launch specification: a summary plus an ordered service map.
///
/// The same shape serves as the desired specification derived from
/// configuration and as the observed plan fetched from the supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceSpec>,
}

/// Startup command for the workload, derived from configuration alone.
///
/// Flags appear in a fixed order (`-grpc-port`, `-limit`, `-scrapeTimeout`)
/// and only when the governing option differs from its default. The gRPC
/// port flag is always emitted with the effective port, unless gRPC is
/// disabled (`grpc_port == 0`).
pub fn command(config: &CharmConfig) -> String {
    let mut parts = vec![SERVICE_NAME.to_string()];
    if config.grpc_port != 0 {
        parts.push(format!("-grpc-port={}", config.grpc_port));
    }
    if config.metrics_count_limit != CharmConfig::DEFAULT_METRICS_COUNT_LIMIT {
        parts.push(format!("-limit={}", config.metrics_count_limit));
    }
    if config.scrape_timeout != CharmConfig::DEFAULT_SCRAPE_TIMEOUT {
        parts.push(format!("-scrapeTimeout={}", config.scrape_timeout));
    }
    parts.join(" ")
}

/// Desired launch specification for the current configuration.
pub fn desired_layer(config: &CharmConfig) -> Layer {
    let mut services = BTreeMap::new();
    services.insert(
        SERVICE_NAME.to_string(),
        ServiceSpec::replacing(SERVICE_NAME, command(config)),
    );
    Layer {
        summary: format!("{SERVICE_NAME} layer"),
        services,
    }
}

/// Ordered port set to expose for the current configuration.
///
/// The primary port entry is always present; the gRPC entry only when gRPC
/// is enabled.
pub fn service_ports(config: &CharmConfig) -> Vec<ServicePort> {
    let mut ports = vec![ServicePort::symmetric(SERVICE_NAME, config.port)];
    if config.grpc_port != 0 {
        ports.push(ServicePort::symmetric(
            format!("{SERVICE_NAME}-grpc"),
            config.grpc_port,
        ));
    }
    ports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_yields_base_command_with_grpc_port_only() {
        let config = CharmConfig::default();
        assert_eq!(command(&config), "prometheus-edge-hub -grpc-port=9092");
    }

    #[test]
    fn command_is_deterministic() {
        let config = CharmConfig {
            metrics_count_limit: 500,
            scrape_timeout: 30,
            ..CharmConfig::default()
        };
        assert_eq!(command(&config), command(&config));
    }

    #[test]
    fn non_default_limit_appends_limit_flag_only() {
        let config = CharmConfig {
            metrics_count_limit: 200,
            ..CharmConfig::default()
        };
        let cmd = command(&config);
        assert!(cmd.contains("-limit=200"), "command was: {cmd}");
        assert!(!cmd.contains("-port="), "command was: {cmd}");
    }

    #[test]
    fn non_default_scrape_timeout_appends_flag_in_order() {
        let config = CharmConfig {
            metrics_count_limit: 200,
            scrape_timeout: 30,
            ..CharmConfig::default()
        };
        assert_eq!(
            command(&config),
            "prometheus-edge-hub -grpc-port=9092 -limit=200 -scrapeTimeout=30"
        );
    }

    #[test]
    fn grpc_port_zero_disables_the_flag_and_the_port_entry() {
        let config = CharmConfig {
            grpc_port: 0,
            ..CharmConfig::default()
        };
        assert_eq!(command(&config), "prometheus-edge-hub");
        let ports = service_ports(&config);
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0], ServicePort::symmetric("prometheus-edge-hub", 9091));
    }

    #[test]
    fn default_config_exposes_primary_and_grpc_ports() {
        let ports = service_ports(&CharmConfig::default());
        assert_eq!(
            ports,
            vec![
                ServicePort::symmetric("prometheus-edge-hub", 9091),
                ServicePort::symmetric("prometheus-edge-hub-grpc", 9092),
            ]
        );
    }

    #[test]
    fn layer_serializes_with_pebble_field_names() {
        let layer = desired_layer(&CharmConfig::default());
        let yaml = serde_yaml::to_string(&layer).expect("layer serializes");
        assert!(yaml.contains("override: replace"), "yaml was: {yaml}");
        assert!(yaml.contains("startup: enabled"), "yaml was: {yaml}");
        assert!(
            yaml.contains("command: prometheus-edge-hub -grpc-port=9092"),
            "yaml was: {yaml}"
        );
    }
}
