//! Detection Scoring
//!
//! One capability contract ([`Scorer`]), one concrete implementation
//! ([`DetectionScorer`]). Additional scoring strategies are new
//! implementations of the same trait, not subclasses.
//!
//! The heuristic alone serves cheap incremental timeline updates mid-run;
//! [`Scorer::final_score`] is the single entry point for a terminal score.

pub mod blender;
pub mod heuristic;
pub mod rules;
pub mod types;

pub use self::types::ScoreResult;

use crate::logic::config::SafetyConfig;
use crate::logic::events::EventSummary;
use crate::logic::sampler::FeatureRow;

use self::rules::{BLEND_HEURISTIC_WEIGHT, BLEND_ML_WEIGHT, FACTOR_ML, ML_DISCLAIMER_NOTE};

/// Scoring capability: heuristic, optional statistical signal, final blend.
pub trait Scorer {
    /// Deterministic weighted likelihood over the full row history so far.
    fn heuristic(
        &self,
        rows: &[FeatureRow],
        channel_a: &EventSummary,
        channel_b: &EventSummary,
    ) -> ScoreResult;

    /// Optional classifier probability; `None` when the capability is
    /// unavailable or there is no telemetry.
    fn ml_component(
        &self,
        rows: &[FeatureRow],
        channel_a: &EventSummary,
        channel_b: &EventSummary,
    ) -> Option<f64>;

    /// Terminal score: heuristic blended with the statistical signal when
    /// one is available, the heuristic unchanged when not.
    fn final_score(
        &self,
        rows: &[FeatureRow],
        channel_a: &EventSummary,
        channel_b: &EventSummary,
    ) -> ScoreResult {
        let h = self.heuristic(rows, channel_a, channel_b);
        let ml = self.ml_component(rows, channel_a, channel_b);
        blend(h, ml)
    }
}

/// The default scorer.
#[derive(Debug, Default)]
pub struct DetectionScorer;

impl Scorer for DetectionScorer {
    fn heuristic(
        &self,
        rows: &[FeatureRow],
        channel_a: &EventSummary,
        channel_b: &EventSummary,
    ) -> ScoreResult {
        heuristic::heuristic(rows, channel_a, channel_b)
    }

    fn ml_component(
        &self,
        rows: &[FeatureRow],
        channel_a: &EventSummary,
        channel_b: &EventSummary,
    ) -> Option<f64> {
        if !SafetyConfig::is_ml_enabled() {
            return None;
        }
        blender::ml_component(rows, channel_a, channel_b)
    }
}

/// Blend the heuristic result with an optional classifier probability.
///
/// `ml` absent returns the heuristic untouched. Otherwise the likelihood is
/// `0.6*ml + 0.4*h`, clamped; the raw probability is appended under
/// `ml_component` (not weighted-summed with the other parts); and the
/// disclaimer note is appended exactly once.
pub fn blend(h: ScoreResult, ml: Option<f64>) -> ScoreResult {
    let Some(ml) = ml else {
        return h;
    };

    let likelihood =
        (BLEND_ML_WEIGHT * ml + BLEND_HEURISTIC_WEIGHT * h.likelihood).clamp(0.0, 1.0);

    let mut parts = h.parts;
    parts.push((FACTOR_ML.to_string(), ml));

    let mut notes = h.notes;
    notes.push(ML_DISCLAIMER_NOTE.to_string());

    ScoreResult {
        likelihood,
        parts,
        notes,
    }
}
