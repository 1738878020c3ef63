//! Telemetry Sampler
//!
//! One normalized feature row per call. The sampler owns the previous
//! cumulative network snapshot; everything else is read fresh from the OS
//! with per-field fault isolation - a failed metric becomes its documented
//! default, never an aborted sample.

pub mod probe;

use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sysinfo::{Networks, Pid, System};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One telemetry sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Epoch seconds; non-decreasing across a run
    pub ts: f64,
    /// Process CPU% since the previous call (may exceed 100 on multi-core)
    pub cpu_percent: f64,
    /// Process share of total system memory, 0-100
    pub memory_percent: f64,
    pub thread_count: u32,
    pub open_file_count: u32,
    pub established_tcp_count: u32,
    /// Kernel handle count; `None` where the platform has no such concept
    pub handle_count: Option<u32>,
    /// Bytes/second since the previous cumulative snapshot
    pub bytes_sent_rate: f64,
    pub bytes_recv_rate: f64,
    /// Distinct remote addresses of established connections, sorted
    pub remote_ips: Vec<String>,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
pub enum SamplerError {
    /// OS process introspection unavailable. Fatal at construction, no retry.
    DependencyMissing(String),
}

impl std::fmt::Display for SamplerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplerError::DependencyMissing(msg) => {
                write!(f, "dependency missing: {}", msg)
            }
        }
    }
}

impl std::error::Error for SamplerError {}

// ============================================================================
// SAMPLER
// ============================================================================

/// Host/process telemetry sampler.
///
/// Construction takes a baseline CPU reading (discarded) and a baseline
/// cumulative network snapshot, so the first real sample already has a
/// reference point for rates.
pub struct TelemetrySampler {
    sys: System,
    networks: Networks,
    pid: Pid,
    last_bytes_sent: u64,
    last_bytes_recv: u64,
    last_sample_time: Instant,
}

impl TelemetrySampler {
    pub fn new() -> Result<Self, SamplerError> {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| SamplerError::DependencyMissing(format!("current pid: {}", e)))?;

        let mut sys = System::new();
        sys.refresh_processes();
        sys.refresh_memory();
        if sys.process(pid).is_none() {
            return Err(SamplerError::DependencyMissing(format!(
                "process introspection unavailable for pid {}",
                pid
            )));
        }

        // Warm up the CPU meter: the first reading is always 0 and is discarded.
        sys.refresh_process(pid);
        let _ = sys.process(pid).map(|p| p.cpu_usage());

        let networks = Networks::new_with_refreshed_list();
        let (sent, recv) = cumulative_bytes(&networks);

        Ok(Self {
            sys,
            networks,
            pid,
            last_bytes_sent: sent,
            last_bytes_recv: recv,
            last_sample_time: Instant::now(),
        })
    }

    /// Byte rates since the previous snapshot.
    ///
    /// Zero elapsed time reports `(0.0, 0.0)` instead of dividing; the
    /// snapshot and timestamp still advance so drift cannot accumulate.
    pub fn network_sampler(&mut self) -> (f64, f64) {
        self.networks.refresh();
        let (sent, recv) = cumulative_bytes(&self.networks);
        let elapsed = self.last_sample_time.elapsed().as_secs_f64();

        let rates = compute_rates(
            (sent, recv),
            (self.last_bytes_sent, self.last_bytes_recv),
            elapsed,
        );

        self.last_bytes_sent = sent;
        self.last_bytes_recv = recv;
        self.last_sample_time = Instant::now();

        rates
    }

    /// Produce one feature row. Never sleeps, never retries; pacing is the
    /// orchestrator's job.
    pub fn sample(&mut self) -> FeatureRow {
        self.sys.refresh_process(self.pid);
        self.sys.refresh_memory();

        let (cpu_percent, memory_percent) = match self.sys.process(self.pid) {
            Some(proc) => {
                let total = self.sys.total_memory();
                let mem = if total > 0 {
                    proc.memory() as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                (proc.cpu_usage() as f64, mem)
            }
            None => (0.0, 0.0),
        };

        let (established_tcp_count, remote_ips) = probe::established_tcp();
        let (bytes_sent_rate, bytes_recv_rate) = self.network_sampler();

        FeatureRow {
            ts: Utc::now().timestamp_millis() as f64 / 1000.0,
            cpu_percent,
            memory_percent,
            thread_count: probe::thread_count(),
            open_file_count: probe::open_file_count(),
            established_tcp_count,
            handle_count: probe::handle_count(),
            bytes_sent_rate,
            bytes_recv_rate,
            remote_ips,
        }
    }
}

/// First differences over elapsed seconds. Zero elapsed time (clock
/// resolution, re-entrant call) reports zero rates instead of dividing;
/// counters that moved backwards (interface reset) clamp to zero.
fn compute_rates(current: (u64, u64), previous: (u64, u64), elapsed: f64) -> (f64, f64) {
    if elapsed == 0.0 {
        return (0.0, 0.0);
    }
    (
        current.0.saturating_sub(previous.0) as f64 / elapsed,
        current.1.saturating_sub(previous.1) as f64 / elapsed,
    )
}

fn cumulative_bytes(networks: &Networks) -> (u64, u64) {
    let mut sent = 0u64;
    let mut recv = 0u64;
    for (_name, data) in networks.iter() {
        sent += data.total_transmitted();
        recv += data.total_received();
    }
    (sent, recv)
}
