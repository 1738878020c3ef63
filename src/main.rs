//! ShadowLab Core - Main Entry Point
//!
//! Headless monitoring run: sample telemetry at a fixed interval, summarize
//! the event channels, score, persist artifacts. Dashboards and reports are
//! external consumers of the artifacts this binary writes.

mod constants;
mod logic;

use std::path::Path;
use std::time::Duration;

use constants::{APP_NAME, APP_VERSION, DEFAULT_CONFIG_PATH};
use logic::config::{RunConfig, SafetyConfig};
use logic::external_intel::{intel, mitre};
use logic::persist::{self, TelemetryDb};
use logic::sampler::TelemetrySampler;
use logic::scenario::{Profile, ScenarioRunner};
use logic::scorer::DetectionScorer;
use logic::{monitor, persist::db::DB_FILE};

/// Remote IPs checked against the reputation service per run.
const MAX_IP_LOOKUPS: usize = 5;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = RunConfig::load(Path::new(&config_path));
    SafetyConfig::set_ml(cfg.ml_enabled);

    // The only fatal path: without process introspection there is nothing
    // to sample.
    let mut sampler = match TelemetrySampler::new() {
        Ok(s) => s,
        Err(e) => {
            log::error!("Cannot start sampler: {}", e);
            std::process::exit(1);
        }
    };

    let mut scenario = ScenarioRunner::new();
    scenario.start(
        Profile::parse(&cfg.profile),
        Duration::from_secs(cfg.duration_secs),
    );

    let scorer = DetectionScorer;
    let run = monitor::run(&mut sampler, &scorer, &cfg);

    scenario.stop();

    // Persistence failures are logged, not fatal: the score already exists.
    match TelemetryDb::open(&cfg.out_dir.join(DB_FILE)) {
        Ok(db) => {
            if let Err(e) = db.insert_rows(&run.run_id, &run.rows) {
                log::error!("Telemetry insert failed: {}", e);
            }
        }
        Err(e) => log::error!("Cannot open telemetry db: {}", e),
    }
    if let Err(e) = persist::write_artifacts(&cfg.out_dir, &run) {
        log::error!("Artifact export failed: {}", e);
    }

    report(&run);
}

/// Log the human-readable run summary plus display-only enrichment.
fn report(run: &monitor::MonitorRun) {
    log::info!("Final likelihood: {:.3}", run.score.likelihood);
    for (name, value) in &run.score.parts {
        log::info!("  {} = {:.3}", name, value);
    }
    for note in &run.score.notes {
        log::info!("  note: {}", note);
    }

    for (event_id, techniques) in mitre::annotate_summary(&run.channel_b) {
        log::info!("  event {} -> ATT&CK {}", event_id, techniques.join(", "));
    }

    let distinct_ips: Vec<&String> = run
        .rows
        .iter()
        .flat_map(|r| r.remote_ips.iter())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .take(MAX_IP_LOOKUPS)
        .collect();
    for ip in distinct_ips {
        if let Some(rep) = intel::check_ip(ip) {
            log::info!(
                "  {} abuse confidence {} ({} reports)",
                rep.ip_address,
                rep.abuse_confidence_score,
                rep.total_reports
            );
        }
    }
}
