//! External Intelligence
//!
//! Display-only enrichment around the core's outputs:
//! - `mitre.rs` - event-id to ATT&CK technique mapping
//! - `intel.rs` - optional IP reputation lookups
//!
//! Nothing here feeds back into the score.

pub mod intel;
pub mod mitre;
