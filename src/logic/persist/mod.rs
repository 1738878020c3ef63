//! Persistence
//!
//! Run artifacts and history storage, content identical to the core's output
//! shapes: a row-oriented telemetry table, two event-summary documents, one
//! score document, and the timeline.
//!
//! ## Structure
//! - `db.rs` - SQLite telemetry table (rusqlite, bundled)
//! - `exporter.rs` - CSV/JSON artifact writer

pub mod db;
pub mod exporter;

pub use self::db::TelemetryDb;
pub use self::exporter::write_artifacts;

#[cfg(test)]
mod tests;
