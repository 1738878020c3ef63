//! Run Configuration
//!
//! JSON run-config with full defaults. A missing config file is not an
//! error - a run must always be able to start with zero setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DURATION_SECS, DEFAULT_INTERVAL_SECS, DEFAULT_OUT_DIR};

// ============================================================================
// RUN CONFIG
// ============================================================================

/// Configuration for one monitoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Total run duration (seconds)
    pub duration_secs: u64,
    /// Pause between samples (seconds)
    pub interval_secs: f64,
    /// Synthetic load profile: none, cpu-heavy, memory-heavy, file-heavy,
    /// network-heavy, balanced
    pub profile: String,
    /// Directory for run artifacts (db, csv, json)
    pub out_dir: PathBuf,
    /// Statistical-blend capability; false runs the heuristic alone
    pub ml_enabled: bool,
    /// Extra channel-A event labels (event id -> label), merged over defaults
    pub channel_a_labels: BTreeMap<u32, String>,
    /// Extra channel-B event labels (event id -> label), merged over defaults
    pub channel_b_labels: BTreeMap<u32, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            interval_secs: DEFAULT_INTERVAL_SECS,
            profile: "none".to_string(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            ml_enabled: true,
            channel_a_labels: BTreeMap::new(),
            channel_b_labels: BTreeMap::new(),
        }
    }
}

impl RunConfig {
    /// Load from a JSON file; defaults when the file is absent or malformed.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(cfg) => {
                    log::info!("Loaded run config from {:?}", path);
                    cfg
                }
                Err(e) => {
                    log::warn!("Bad run config {:?} ({}), using defaults", path, e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No run config at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    /// Interval floor keeps the sampling loop from busy-spinning.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.interval_secs.max(0.2))
    }
}

// ============================================================================
// CAPABILITY SWITCHES (Kill-switches)
// ============================================================================

// Default state: statistical blending enabled
static ML_ENABLED: AtomicBool = AtomicBool::new(true);

pub struct SafetyConfig;

impl SafetyConfig {
    pub fn is_ml_enabled() -> bool {
        ML_ENABLED.load(Ordering::Relaxed)
    }

    // Setter (e.g. from a panic handler or operator override)
    pub fn set_ml(val: bool) {
        ML_ENABLED.store(val, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_usable() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.duration_secs, DEFAULT_DURATION_SECS);
        assert!(cfg.interval().as_secs_f64() >= 0.2);
        assert_eq!(cfg.profile, "none");
        assert!(cfg.ml_enabled);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = RunConfig::load(Path::new("/nonexistent/shadowlab.json"));
        assert_eq!(cfg.duration_secs, DEFAULT_DURATION_SECS);
    }

    #[test]
    fn partial_json_fills_remaining_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"duration_secs": 30, "profile": "balanced"}"#).unwrap();

        let cfg = RunConfig::load(&path);
        assert_eq!(cfg.duration_secs, 30);
        assert_eq!(cfg.profile, "balanced");
        assert_eq!(cfg.interval_secs, DEFAULT_INTERVAL_SECS);
    }
}
