//! Scenario Runner - Synthetic Load Generator
//!
//! Lab-only benign activity so a run has something to observe: short CPU
//! bursts, temp-file churn, loopback connect attempts, memory touch. Tasks
//! share nothing with the sampling core except what the OS sees. Every loop
//! iteration checks the stop flag, and `stop()` waits a bounded time so a
//! stuck task can never block the caller.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rand::RngCore;

/// Poll step while waiting for a task to finish.
const JOIN_POLL: Duration = Duration::from_millis(20);

/// Maximum wait per task on stop.
const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Available load profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    None,
    CpuHeavy,
    MemoryHeavy,
    FileHeavy,
    NetworkHeavy,
    Balanced,
}

impl Profile {
    /// Parse a config string; unknown values mean no load.
    pub fn parse(s: &str) -> Self {
        match s {
            "cpu-heavy" => Profile::CpuHeavy,
            "memory-heavy" => Profile::MemoryHeavy,
            "file-heavy" => Profile::FileHeavy,
            "network-heavy" => Profile::NetworkHeavy,
            "balanced" => Profile::Balanced,
            "none" => Profile::None,
            other => {
                log::warn!("Unknown scenario profile {:?}, running without load", other);
                Profile::None
            }
        }
    }

    fn wants_cpu(self) -> bool {
        matches!(
            self,
            Profile::CpuHeavy | Profile::Balanced | Profile::NetworkHeavy | Profile::MemoryHeavy
        )
    }

    fn wants_files(self) -> bool {
        matches!(self, Profile::FileHeavy | Profile::Balanced)
    }

    fn wants_network(self) -> bool {
        matches!(self, Profile::NetworkHeavy | Profile::Balanced)
    }

    fn wants_memory(self) -> bool {
        matches!(self, Profile::MemoryHeavy)
    }
}

/// Background load runner. Start once, stop once.
pub struct ScenarioRunner {
    stop: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
    running: bool,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            threads: Vec::new(),
            running: false,
        }
    }

    /// Spawn the profile's tasks for at most `duration`. No-op when already
    /// running or when the profile carries no load.
    pub fn start(&mut self, profile: Profile, duration: Duration) {
        if self.running || profile == Profile::None {
            return;
        }
        self.running = true;
        self.stop.store(false, Ordering::SeqCst);

        let deadline = Instant::now() + duration;
        if profile.wants_cpu() {
            self.spawn(move |stop| cpu_loop(stop, deadline));
        }
        if profile.wants_files() {
            self.spawn(move |stop| file_loop(stop, deadline));
        }
        if profile.wants_network() {
            self.spawn(move |stop| network_loop(stop, deadline));
        }
        if profile.wants_memory() {
            self.spawn(move |stop| memory_loop(stop, deadline));
        }

        log::info!(
            "Scenario {:?} started ({} tasks, {}s)",
            profile,
            self.threads.len(),
            duration.as_secs()
        );
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        let stop = Arc::clone(&self.stop);
        self.threads.push(std::thread::spawn(move || task(stop)));
    }

    /// Signal stop and wait a bounded time for each task. A task that ignores
    /// the signal is abandoned (it self-terminates at its deadline) rather
    /// than blocking the caller.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);

        for handle in self.threads.drain(..) {
            let waited = Instant::now();
            while !handle.is_finished() && waited.elapsed() < JOIN_TIMEOUT {
                std::thread::sleep(JOIN_POLL);
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                log::warn!("Scenario task ignored stop signal, abandoning it");
            }
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// LOAD TASKS
// ============================================================================

fn expired(stop: &AtomicBool, deadline: Instant) -> bool {
    stop.load(Ordering::SeqCst) || Instant::now() >= deadline
}

/// Short bursts: ~30ms busy, 70ms idle.
fn cpu_loop(stop: Arc<AtomicBool>, deadline: Instant) {
    while !expired(&stop, deadline) {
        let burst = Instant::now();
        while burst.elapsed() < Duration::from_millis(30) {
            std::hint::spin_loop();
        }
        std::thread::sleep(Duration::from_millis(70));
    }
}

/// Write-and-delete churn of small random files in the temp directory.
fn file_loop(stop: Arc<AtomicBool>, deadline: Instant) {
    let tmpdir = std::env::temp_dir();
    let mut rng = rand::thread_rng();
    let mut payload = [0u8; 4096];
    let mut i = 0u64;

    while !expired(&stop, deadline) {
        rng.fill_bytes(&mut payload);
        let path: PathBuf = tmpdir.join(format!("shadowlab_tmp_{}.dat", i));
        if let Ok(mut f) = std::fs::File::create(&path) {
            let _ = f.write_all(&payload);
        }
        let _ = std::fs::remove_file(&path);
        i += 1;
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Loopback-only connect attempts; failing fast is the point.
fn network_loop(stop: Arc<AtomicBool>, deadline: Instant) {
    let target = std::net::SocketAddr::from(([127, 0, 0, 1], 65535));
    while !expired(&stop, deadline) {
        let _ = std::net::TcpStream::connect_timeout(&target, Duration::from_millis(200));
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Allocate and touch a buffer so the pages are really resident.
fn memory_loop(stop: Arc<AtomicBool>, deadline: Instant) {
    let mut buf: Vec<u8> = Vec::new();
    while !expired(&stop, deadline) {
        if buf.len() < 64 * 1024 * 1024 {
            let chunk = vec![0xABu8; 1024 * 1024];
            buf.extend_from_slice(&chunk);
        }
        for page in buf.chunks_mut(4096) {
            page[0] = page[0].wrapping_add(1);
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}
