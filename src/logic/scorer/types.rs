//! Scoring Types
//!
//! Data structures only - no scoring logic.

use serde::{Deserialize, Serialize};

/// Output of one scoring call. Recomputed from scratch each invocation; a
/// pure function of the row history and the two channel summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Blended likelihood, clamped to [0, 1]
    pub likelihood: f64,
    /// Named factor contributions, already weighted, in factor order.
    /// The `ml_component` entry (blended variant only) is the raw classifier
    /// probability, not a weighted summand.
    pub parts: Vec<(String, f64)>,
    /// Human-readable observations, append-only, no dedup
    pub notes: Vec<String>,
}

impl ScoreResult {
    pub fn part(&self, name: &str) -> Option<f64> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// Aggregate quantities shared by the heuristic and the blender: arithmetic
/// means over the whole row history plus channel totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    pub mean_cpu: f64,
    pub mean_threads: f64,
    pub mean_tcp: f64,
    pub channel_a_total: f64,
    pub channel_b_network: f64,
    pub channel_b_dns: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_lookup_finds_named_factor() {
        let result = ScoreResult {
            likelihood: 0.2,
            parts: vec![("cpu_activity".to_string(), 0.2)],
            notes: vec![],
        };
        assert_eq!(result.part("cpu_activity"), Some(0.2));
        assert_eq!(result.part("threads"), None);
    }
}
