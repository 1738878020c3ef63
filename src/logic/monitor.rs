//! Run Orchestrator
//!
//! Drives the single foreground sampling loop: channel summaries once up
//! front, one sample per interval for a fixed duration, heuristic per tick
//! over the growing row list, the final blend once at the end. The run owns
//! its row history explicitly - no hidden shared state. Once started, a run
//! always completes and always produces a score; absent optional capabilities
//! mean empty outputs, never a crash.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::config::RunConfig;
use crate::logic::events::{self, ChannelConfig, EventSummary};
use crate::logic::sampler::{FeatureRow, TelemetrySampler};
use crate::logic::scorer::{ScoreResult, Scorer};

/// One point of the incremental likelihood curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub ts: f64,
    pub likelihood: f64,
}

/// Everything one monitoring run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorRun {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows: Vec<FeatureRow>,
    pub channel_a: EventSummary,
    pub channel_b: EventSummary,
    pub timeline: Vec<TimelinePoint>,
    pub score: ScoreResult,
}

/// Execute one monitoring run.
///
/// Event channels are read and summarized once, before sampling starts, and
/// every incremental timeline score sees those summaries: channel activity is
/// a constant contribution across the whole curve, not a jump at the end.
/// Per-tick cost stays at the heuristic's O(rows-so-far).
pub fn run(sampler: &mut TelemetrySampler, scorer: &dyn Scorer, cfg: &RunConfig) -> MonitorRun {
    let run_id = uuid::Uuid::new_v4().to_string();
    let started_at = Utc::now();
    let interval = cfg.interval();
    let deadline = Instant::now() + Duration::from_secs(cfg.duration_secs);

    log::info!(
        "Run {} started ({}s duration, {:.1}s interval)",
        run_id,
        cfg.duration_secs,
        interval.as_secs_f64()
    );

    let channel_a_cfg = ChannelConfig::defender().with_extra_labels(&cfg.channel_a_labels);
    let channel_b_cfg = ChannelConfig::sysmon().with_extra_labels(&cfg.channel_b_labels);

    let raw_a = events::read_channel(&cfg.out_dir, &channel_a_cfg);
    let raw_b = events::read_channel(&cfg.out_dir, &channel_b_cfg);
    let channel_a = events::summarize_events(&raw_a, &channel_a_cfg.labels);
    let channel_b = events::summarize_events(&raw_b, &channel_b_cfg.labels);

    let mut rows: Vec<FeatureRow> = Vec::new();
    let mut timeline: Vec<TimelinePoint> = Vec::new();

    loop {
        let row = sampler.sample();
        let ts = row.ts;
        rows.push(row);

        let incremental = scorer.heuristic(&rows, &channel_a, &channel_b);
        timeline.push(TimelinePoint {
            ts,
            likelihood: incremental.likelihood,
        });

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        std::thread::sleep(remaining.min(interval));
    }

    let score = scorer.final_score(&rows, &channel_a, &channel_b);

    log::info!(
        "Run {} finished: {} samples, likelihood {:.3}",
        run_id,
        rows.len(),
        score.likelihood
    );

    MonitorRun {
        run_id,
        started_at,
        finished_at: Utc::now(),
        rows,
        channel_a,
        channel_b,
        timeline,
        score,
    }
}
