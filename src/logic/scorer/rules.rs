//! Scoring Rules & Thresholds
//!
//! Exact contracts for the likelihood computation. No logic here - only
//! constants used by the heuristic and the blender.

// ============================================================================
// FACTOR NAMES
// ============================================================================

pub const FACTOR_CPU: &str = "cpu_activity";
pub const FACTOR_THREADS: &str = "threads";
pub const FACTOR_TCP: &str = "tcp_conns";
pub const FACTOR_CHANNEL_A: &str = "channel_a_events";
pub const FACTOR_CHANNEL_B: &str = "channel_b_activity";
pub const FACTOR_ML: &str = "ml_component";

// ============================================================================
// NORMALIZATION DIVISORS (saturating ramp: min(x / divisor, 1.0))
// ============================================================================

pub const CPU_DIVISOR: f64 = 50.0;
pub const THREAD_DIVISOR: f64 = 50.0;
pub const TCP_DIVISOR: f64 = 10.0;
pub const CHANNEL_A_DIVISOR: f64 = 10.0;
pub const CHANNEL_B_DIVISOR: f64 = 20.0;

// ============================================================================
// WEIGHTS (sum to 1.0; each factor contributes at most its weight)
// ============================================================================

pub const CPU_WEIGHT: f64 = 0.25;
pub const THREAD_WEIGHT: f64 = 0.15;
pub const TCP_WEIGHT: f64 = 0.10;
pub const CHANNEL_A_WEIGHT: f64 = 0.30;
pub const CHANNEL_B_WEIGHT: f64 = 0.20;

// ============================================================================
// NOTE THRESHOLDS (independent of the weighting)
// ============================================================================

/// Mean CPU% above this triggers a note
pub const CPU_NOTE_THRESHOLD: f64 = 30.0;

/// Mean thread count above this triggers a note
pub const THREAD_NOTE_THRESHOLD: f64 = 40.0;

/// Mean established-TCP count above this triggers a note
pub const TCP_NOTE_THRESHOLD: f64 = 5.0;

// ============================================================================
// CHANNEL-B ACTIVITY LABELS
// ============================================================================

/// Channel-B label counted as network activity
pub const LABEL_NETWORK: &str = "Network connection";

/// Channel-B label counted as dns activity
pub const LABEL_DNS: &str = "DNS query";

// ============================================================================
// FINAL BLEND
// ============================================================================

/// Weight of the classifier probability in the blended likelihood
pub const BLEND_ML_WEIGHT: f64 = 0.6;

/// Weight of the heuristic likelihood in the blended likelihood
pub const BLEND_HEURISTIC_WEIGHT: f64 = 0.4;

/// Appended once whenever the ML signal participates in the blend
pub const ML_DISCLAIMER_NOTE: &str =
    "ML probability is illustrative - not a real detector";

// ============================================================================
// SYNTHETIC TRAINING SET (fixed, reproducible)
// ============================================================================

/// RNG seed for the synthetic reference set. Reproducibility is a hard
/// contract: the same seed must always produce the same training set.
pub const SYNTHETIC_SEED: u64 = 0;

/// Synthetic samples per training run
pub const SYNTHETIC_SAMPLES: usize = 200;

/// Feature-vector dimension (mean cpu, mean threads, mean tcp, channel A
/// total, channel B network count, channel B dns count)
pub const FEATURE_DIM: usize = 6;

/// Per-dimension centers of the synthetic normals
pub const SYNTHETIC_LOC: [f64; FEATURE_DIM] = [10.0, 10.0, 1.0, 0.0, 0.0, 0.0];

/// Per-dimension scales of the synthetic normals
pub const SYNTHETIC_SCALE: [f64; FEATURE_DIM] = [5.0, 5.0, 1.0, 1.0, 1.0, 1.0];

/// Linear labeling rule applied to each synthetic sample
pub const LABEL_COEFFS: [f64; FEATURE_DIM] = [1.0, 0.5, 5.0, 10.0, 2.0, 2.0];

/// Positive label when the linear combination exceeds this
pub const LABEL_THRESHOLD: f64 = 40.0;

/// Gradient-descent iteration budget for the logistic fit
pub const FIT_MAX_ITERS: usize = 500;

/// Gradient-descent learning rate
pub const FIT_LEARNING_RATE: f64 = 0.1;
