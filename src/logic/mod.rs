//! Logic Module - Engines & Business Logic
//!
//! The sampling/scoring core plus its collaborators:
//! - `sampler/` - per-tick telemetry feature rows
//! - `events` - event-log channels and the pure summarizer
//! - `scorer/` - heuristic scoring, statistical blending, final blend
//! - `monitor` - the run orchestrator
//! - `scenario` - synthetic lab load
//! - `persist/` - SQLite history and run artifacts
//! - `external_intel/` - display-only ATT&CK / IP-reputation enrichment

pub mod config;
pub mod events;
pub mod external_intel;
pub mod monitor;
pub mod persist;
pub mod sampler;
pub mod scenario;
pub mod scorer;
