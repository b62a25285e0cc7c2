use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Relation endpoint the metrics collector scrapes through.
pub const METRICS_RELATION: &str = "metrics-endpoint";

/// Key of the readiness flag in the relation data bag.
pub const ACTIVE_KEY: &str = "active";

/// Key under which the scrape job list is announced to the collector.
pub const SCRAPE_JOBS_KEY: &str = "scrape_jobs";

/// A relation lifecycle event as delivered by the runtime.
#[derive(Debug, Clone)]
pub struct RelationEvent {
    pub relation: String,
    pub relation_id: u32,
}

/// Errors reported by the relation data bus.
#[derive(Debug, Error)]
pub enum RelationError {
    #[error("failed to write data for relation {relation_id}")]
    WriteFailed { relation_id: u32 },
}

/// Shared key-value data bus attached to relations.
///
/// Writes are restricted to the leader unit; the charm checks
/// [`is_leader`](RelationDataBus::is_leader) before touching any bag.
pub trait RelationDataBus {
    fn is_leader(&self) -> bool;

    /// Merge `data` into this unit's data bag for the given relation.
    fn write(&self, relation_id: u32, data: &BTreeMap<String, String>)
        -> Result<(), RelationError>;
}

/// One scrape job in the form the metrics collector expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeJob {
    pub static_configs: Vec<StaticConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticConfig {
    pub targets: Vec<String>,
}

/// Scrape job list announcing this application's metrics endpoint.
pub fn scrape_jobs(app_name: &str, port: u16) -> Vec<ScrapeJob> {
    vec![ScrapeJob {
        static_configs: vec![StaticConfig {
            targets: vec![format!("{app_name}:{port}")],
        }],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_jobs_target_the_application_service_port() {
        let jobs = scrape_jobs("edge-hub", 9091);
        let json = serde_json::to_string(&jobs).expect("scrape jobs serialize");
        assert_eq!(
            json,
            r#"[{"static_configs":[{"targets":["edge-hub:9091"]}]}]"#
        );
    }
}
