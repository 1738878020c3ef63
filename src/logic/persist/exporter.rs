//! Artifact Exporter
//!
//! Writes the run artifacts: `telemetry.csv`, one event-summary document per
//! channel, `score.json`, `timeline.json`. Each file is derived directly from
//! the core's output shapes with no additional transformation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::logic::monitor::MonitorRun;
use crate::logic::sampler::FeatureRow;

pub const TELEMETRY_CSV: &str = "telemetry.csv";
pub const CHANNEL_A_JSON: &str = "events_channel_a.json";
pub const CHANNEL_B_JSON: &str = "events_channel_b.json";
pub const SCORE_JSON: &str = "score.json";
pub const TIMELINE_JSON: &str = "timeline.json";

const CSV_HEADER: &str = "ts,cpu_percent,memory_percent,thread_count,open_file_count,\
established_tcp_count,handle_count,bytes_sent_rate,bytes_recv_rate,remote_ips";

/// Write all artifacts for a finished run. Returns the paths written.
pub fn write_artifacts(out_dir: &Path, run: &MonitorRun) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;

    let csv_path = out_dir.join(TELEMETRY_CSV);
    write_telemetry_csv(&csv_path, &run.rows)?;

    let mut written = vec![csv_path];
    for (name, value) in [
        (CHANNEL_A_JSON, serde_json::to_value(&run.channel_a)?),
        (CHANNEL_B_JSON, serde_json::to_value(&run.channel_b)?),
        (SCORE_JSON, serde_json::to_value(&run.score)?),
        (TIMELINE_JSON, serde_json::to_value(&run.timeline)?),
    ] {
        let path = out_dir.join(name);
        let file = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(file, &value)?;
        written.push(path);
    }

    log::info!("Wrote {} artifacts to {:?}", written.len(), out_dir);
    Ok(written)
}

fn write_telemetry_csv(path: &Path, rows: &[FeatureRow]) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "{}", CSV_HEADER)?;

    for row in rows {
        let handles = row
            .handle_count
            .map(|h| h.to_string())
            .unwrap_or_default();
        writeln!(
            w,
            "{:.3},{},{},{},{},{},{},{},{},{}",
            row.ts,
            row.cpu_percent,
            row.memory_percent,
            row.thread_count,
            row.open_file_count,
            row.established_tcp_count,
            handles,
            row.bytes_sent_rate,
            row.bytes_recv_rate,
            row.remote_ips.join(";"),
        )?;
    }
    w.flush()
}
