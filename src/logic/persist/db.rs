//! Telemetry Database
//!
//! SQLite storage for feature rows, one row per sample, keyed by run id.
//! Content mirrors [`FeatureRow`] losslessly - no transformation beyond the
//! JSON encoding of the remote-IP list.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::logic::sampler::FeatureRow;

/// Database file name inside the output directory.
pub const DB_FILE: &str = "shadowlab.db";

pub struct TelemetryDb {
    conn: Mutex<Connection>,
}

impl TelemetryDb {
    /// Open (creating if needed) the telemetry database at `path`.
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS telemetry (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id TEXT NOT NULL,
                ts REAL NOT NULL,
                cpu_percent REAL,
                memory_percent REAL,
                thread_count INTEGER,
                open_file_count INTEGER,
                established_tcp_count INTEGER,
                handle_count INTEGER,
                bytes_sent_rate REAL,
                bytes_recv_rate REAL,
                remote_ips TEXT
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Append all rows of a run in one transaction.
    pub fn insert_rows(&self, run_id: &str, rows: &[FeatureRow]) -> rusqlite::Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO telemetry (
                    run_id, ts, cpu_percent, memory_percent, thread_count,
                    open_file_count, established_tcp_count, handle_count,
                    bytes_sent_rate, bytes_recv_rate, remote_ips
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                let ips = serde_json::to_string(&row.remote_ips)
                    .unwrap_or_else(|_| "[]".to_string());
                stmt.execute(params![
                    run_id,
                    row.ts,
                    row.cpu_percent,
                    row.memory_percent,
                    row.thread_count,
                    row.open_file_count,
                    row.established_tcp_count,
                    row.handle_count,
                    row.bytes_sent_rate,
                    row.bytes_recv_rate,
                    ips,
                ])?;
            }
        }
        tx.commit()
    }

    /// All rows of a run, in insertion order.
    pub fn rows_for_run(&self, run_id: &str) -> rusqlite::Result<Vec<FeatureRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT ts, cpu_percent, memory_percent, thread_count,
                    open_file_count, established_tcp_count, handle_count,
                    bytes_sent_rate, bytes_recv_rate, remote_ips
             FROM telemetry WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map([run_id], |r| {
            let ips_json: String = r.get(9)?;
            Ok(FeatureRow {
                ts: r.get(0)?,
                cpu_percent: r.get(1)?,
                memory_percent: r.get(2)?,
                thread_count: r.get(3)?,
                open_file_count: r.get(4)?,
                established_tcp_count: r.get(5)?,
                handle_count: r.get(6)?,
                bytes_sent_rate: r.get(7)?,
                bytes_recv_rate: r.get(8)?,
                remote_ips: serde_json::from_str(&ips_json).unwrap_or_default(),
            })
        })?;

        rows.collect()
    }

    /// Total samples stored across all runs.
    pub fn total_rows(&self) -> rusqlite::Result<u64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM telemetry", [], |r| r.get(0))
    }
}
