use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::event::CharmEvent;
use crate::relation::{RelationEvent, METRICS_RELATION};

#[derive(Parser)]
#[command(about, long_about = None, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a sequence of lifecycle events against the in-memory harness
    Replay(ReplayArgs),
}

#[derive(Parser, Clone)]
pub struct ReplayArgs {
    #[arg(
        long,
        env = "CHARM_CONFIG_FILE",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to a YAML mapping of charm options, e.g. config.yaml (defaults apply when omitted)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "CHARM_APP_NAME",
        default_value = "prometheus-edge-hub",
        help = "Application name announced on the metrics relation"
    )]
    pub app_name: String,

    #[arg(
        long,
        help = "Run as the leader unit",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub leader: bool,

    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_event,
        default_value = "pebble-ready,config-changed",
        help = "Comma-separated event sequence: pebble-ready, config-changed, relation-joined, relation-departed"
    )]
    pub events: Vec<CharmEvent>,

    #[arg(
        long,
        default_value = "3",
        help = "How many times a deferred event is redelivered before the replay drops it"
    )]
    pub redelivery_budget: usize,
}

/// Parse an event name as used on the command line.
fn parse_event(name: &str) -> Result<CharmEvent, String> {
    let relation = || RelationEvent {
        relation: METRICS_RELATION.to_string(),
        relation_id: 0,
    };
    match name {
        "pebble-ready" => Ok(CharmEvent::PebbleReady),
        "config-changed" => Ok(CharmEvent::ConfigChanged),
        "relation-joined" => Ok(CharmEvent::RelationJoined(relation())),
        "relation-departed" => Ok(CharmEvent::RelationDeparted(relation())),
        other => Err(format!("unknown event: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn parses_all_event_names() {
        for (name, kind) in [
            ("pebble-ready", EventKind::PebbleReady),
            ("config-changed", EventKind::ConfigChanged),
            ("relation-joined", EventKind::RelationJoined),
            ("relation-departed", EventKind::RelationDeparted),
        ] {
            let event = parse_event(name).expect("known event name parses");
            assert_eq!(event.kind(), kind);
        }
    }

    #[test]
    fn rejects_unknown_event_names() {
        let err = parse_event("upgrade-charm").expect_err("unknown name rejected");
        assert!(err.contains("upgrade-charm"));
    }
}
