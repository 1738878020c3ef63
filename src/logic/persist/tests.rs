use chrono::Utc;
use tempfile::tempdir;

use super::db::{TelemetryDb, DB_FILE};
use super::exporter;
use crate::logic::events::EventSummary;
use crate::logic::monitor::{MonitorRun, TimelinePoint};
use crate::logic::sampler::FeatureRow;
use crate::logic::scorer::ScoreResult;

fn sample_row(ts: f64, cpu: f64) -> FeatureRow {
    FeatureRow {
        ts,
        cpu_percent: cpu,
        memory_percent: 1.5,
        thread_count: 8,
        open_file_count: 12,
        established_tcp_count: 2,
        handle_count: None,
        bytes_sent_rate: 1024.0,
        bytes_recv_rate: 2048.0,
        remote_ips: vec!["10.0.0.5".to_string(), "192.168.1.1".to_string()],
    }
}

fn sample_run() -> MonitorRun {
    let rows = vec![sample_row(100.0, 40.0), sample_row(101.0, 42.0)];
    MonitorRun {
        run_id: "test-run".to_string(),
        started_at: Utc::now(),
        finished_at: Utc::now(),
        rows,
        channel_a: EventSummary::empty(),
        channel_b: EventSummary::empty(),
        timeline: vec![
            TimelinePoint { ts: 100.0, likelihood: 0.2 },
            TimelinePoint { ts: 101.0, likelihood: 0.21 },
        ],
        score: ScoreResult {
            likelihood: 0.21,
            parts: vec![("cpu_activity".to_string(), 0.21)],
            notes: vec!["Elevated CPU: 41.0%".to_string()],
        },
    }
}

#[test]
fn db_roundtrips_feature_rows() {
    let dir = tempdir().unwrap();
    let db = TelemetryDb::open(&dir.path().join(DB_FILE)).unwrap();

    let rows = vec![sample_row(100.0, 40.0), sample_row(101.0, 42.0)];
    db.insert_rows("run-1", &rows).unwrap();

    let loaded = db.rows_for_run("run-1").unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].ts, 100.0);
    assert_eq!(loaded[0].handle_count, None);
    assert_eq!(loaded[1].cpu_percent, 42.0);
    assert_eq!(loaded[1].remote_ips, rows[1].remote_ips);
}

#[test]
fn db_separates_runs() {
    let dir = tempdir().unwrap();
    let db = TelemetryDb::open(&dir.path().join(DB_FILE)).unwrap();

    db.insert_rows("run-a", &[sample_row(1.0, 1.0)]).unwrap();
    db.insert_rows("run-b", &[sample_row(2.0, 2.0), sample_row(3.0, 3.0)]).unwrap();

    assert_eq!(db.rows_for_run("run-a").unwrap().len(), 1);
    assert_eq!(db.rows_for_run("run-b").unwrap().len(), 2);
    assert_eq!(db.total_rows().unwrap(), 3);
}

#[test]
fn exporter_writes_all_artifacts() {
    let dir = tempdir().unwrap();
    let run = sample_run();

    let written = exporter::write_artifacts(dir.path(), &run).unwrap();
    assert_eq!(written.len(), 5);
    for path in &written {
        assert!(path.exists(), "missing artifact {:?}", path);
    }
}

#[test]
fn csv_has_header_plus_one_line_per_row() {
    let dir = tempdir().unwrap();
    let run = sample_run();
    exporter::write_artifacts(dir.path(), &run).unwrap();

    let csv = std::fs::read_to_string(dir.path().join(exporter::TELEMETRY_CSV)).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), run.rows.len() + 1);
    assert!(lines[0].starts_with("ts,cpu_percent"));
    assert!(lines[1].contains("10.0.0.5;192.168.1.1"));
}

#[test]
fn score_json_roundtrips() {
    let dir = tempdir().unwrap();
    let run = sample_run();
    exporter::write_artifacts(dir.path(), &run).unwrap();

    let text = std::fs::read_to_string(dir.path().join(exporter::SCORE_JSON)).unwrap();
    let loaded: ScoreResult = serde_json::from_str(&text).unwrap();
    assert_eq!(loaded, run.score);
}
