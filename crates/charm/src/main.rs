use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use edge_hub_charm::config::{Cli, Commands, ReplayArgs};
use edge_hub_charm::harness::Harness;
use edge_hub_charm::runtime::{Dispatcher, EventLoop};
use edge_hub_charm::{logging, EdgeHubCharm};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(replay_args) => run_replay(replay_args),
    }
}

fn run_replay(args: ReplayArgs) -> Result<()> {
    logging::init();

    tracing::info!("starting {} charm replay", args.app_name);

    let harness = Harness::new();
    harness.set_can_connect(true);
    harness.set_leader(args.leader);
    if let Some(path) = &args.config {
        harness.set_options(load_options(path)?);
    }

    let charm = EdgeHubCharm::new(
        &args.app_name,
        &harness,
        &harness,
        &harness,
        &harness,
        &harness,
    );
    let mut dispatcher = Dispatcher::new();
    charm.register(&mut dispatcher);

    let mut event_loop = EventLoop::new(dispatcher, args.redelivery_budget);
    for event in &args.events {
        event_loop.push(event.clone());
    }
    event_loop
        .run()
        .map_err(|report| anyhow!("replay failed: {report:?}"))?;

    if let Some(status) = harness.last_status() {
        tracing::info!("unit status: {status}");
    }
    for (relation_id, data) in collect_relation_data(&harness) {
        tracing::info!("relation {relation_id} data: {data:?}");
    }

    let plan = serde_yaml::to_string(&harness.plan()).context("failed to render the plan")?;
    print!("{plan}");

    Ok(())
}

/// Read a YAML mapping of charm options into the runtime's string bag.
fn load_options(path: &Path) -> Result<BTreeMap<String, String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let values: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    let mut options = BTreeMap::new();
    for (key, value) in values {
        let rendered = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            other => {
                return Err(anyhow!(
                    "option {key} has unsupported value type: {other:?}"
                ))
            }
        };
        options.insert(key, rendered);
    }
    Ok(options)
}

fn collect_relation_data(harness: &Harness) -> Vec<(u32, BTreeMap<String, String>)> {
    // The replay CLI only ever uses relation id 0.
    harness
        .relation_data(0)
        .map(|data| vec![(0, data)])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_options_renders_scalars_as_strings() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "metrics_count_limit: 200").expect("write config");
        writeln!(file, "scrape_timeout: 30").expect("write config");

        let options = load_options(file.path()).expect("config file parses");
        assert_eq!(options.get("metrics_count_limit").map(String::as_str), Some("200"));
        assert_eq!(options.get("scrape_timeout").map(String::as_str), Some("30"));
    }

    #[test]
    fn load_options_rejects_nested_values() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "ports: [9091, 9092]").expect("write config");

        let err = load_options(file.path()).expect_err("nested value rejected");
        assert!(err.to_string().contains("ports"));
    }
}
