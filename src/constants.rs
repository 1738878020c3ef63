//! Central Configuration Constants
//!
//! Single source of truth for run defaults and channel identifiers.
//! To change a default interval or output location, only edit this file.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "ShadowLab Core";

/// Default monitoring run duration (seconds)
pub const DEFAULT_DURATION_SECS: u64 = 90;

/// Default sampling interval (seconds)
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;

/// Default output directory for run artifacts
pub const DEFAULT_OUT_DIR: &str = "shadowlab_out";

/// Default run-config file path (argv[1] overrides)
pub const DEFAULT_CONFIG_PATH: &str = "shadowlab.json";

/// Channel A: Defender-style operational log
pub const CHANNEL_A_NAME: &str = "Microsoft-Windows-Windows Defender/Operational";

/// Channel B: sysmon-style operational log
pub const CHANNEL_B_NAME: &str = "Microsoft-Windows-Sysmon/Operational";

/// Maximum raw records read per channel in one run
pub const MAX_CHANNEL_RECORDS: usize = 1200;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the AbuseIPDB API key, if configured
pub fn get_abuseipdb_key() -> Option<String> {
    std::env::var("ABUSEIPDB_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}
