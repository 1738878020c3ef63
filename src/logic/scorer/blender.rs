//! Statistical Blender
//!
//! Optional secondary signal: a logistic classifier fit per call on a fixed,
//! seeded synthetic reference set, predicting the positive-class probability
//! of the current aggregate feature vector. Stateless by design - the seed,
//! not caching, is what makes repeated calls reproducible.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::logic::events::EventSummary;
use crate::logic::sampler::FeatureRow;

use super::heuristic::aggregates;
use super::rules::*;

/// Classifier probability for the current input, or `None` when there is no
/// telemetry. The process-wide capability switch is enforced by the caller
/// ([`crate::logic::scorer::DetectionScorer`]), which degrades to the pure
/// heuristic in the `None` case.
pub fn ml_component(
    rows: &[FeatureRow],
    channel_a: &EventSummary,
    channel_b: &EventSummary,
) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }

    let agg = aggregates(rows, channel_a, channel_b);
    let x = Array1::from(vec![
        agg.mean_cpu,
        agg.mean_threads,
        agg.mean_tcp,
        agg.channel_a_total,
        agg.channel_b_network,
        agg.channel_b_dns,
    ]);

    let (train_x, train_y) = synthetic_training_set();
    let model = LogisticModel::fit(&train_x, &train_y);
    Some(model.predict_proba(&x))
}

/// 200 six-dimensional samples from per-dimension independent normals,
/// labeled by the fixed linear rule. Seeded: identical on every call.
fn synthetic_training_set() -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(SYNTHETIC_SEED);

    let normals: Vec<Normal<f64>> = (0..FEATURE_DIM)
        .map(|d| Normal::new(SYNTHETIC_LOC[d], SYNTHETIC_SCALE[d]).expect("valid normal params"))
        .collect();

    let mut x = Array2::zeros((SYNTHETIC_SAMPLES, FEATURE_DIM));
    for i in 0..SYNTHETIC_SAMPLES {
        for d in 0..FEATURE_DIM {
            x[[i, d]] = normals[d].sample(&mut rng);
        }
    }

    let y = Array1::from_shape_fn(SYNTHETIC_SAMPLES, |i| {
        let lin: f64 = (0..FEATURE_DIM).map(|d| LABEL_COEFFS[d] * x[[i, d]]).sum();
        if lin > LABEL_THRESHOLD {
            1.0
        } else {
            0.0
        }
    });

    (x, y)
}

/// Logistic regression over standardized features, fit by batch gradient
/// descent with a bounded iteration budget.
struct LogisticModel {
    weights: Array1<f64>,
    bias: f64,
    feature_mean: Array1<f64>,
    feature_std: Array1<f64>,
}

impl LogisticModel {
    fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Self {
        let n = x.nrows() as f64;

        // Standardize by training mean/std so one learning rate covers
        // dimensions of very different magnitude.
        let feature_mean = Array1::from_shape_fn(FEATURE_DIM, |d| x.column(d).sum() / n);
        let feature_std = Array1::from_shape_fn(FEATURE_DIM, |d| {
            let mean = feature_mean[d];
            let var = x.column(d).iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            var.sqrt().max(1e-9)
        });
        let xs = standardize(x, &feature_mean, &feature_std);

        let mut weights = Array1::zeros(FEATURE_DIM);
        let mut bias = 0.0;

        for _ in 0..FIT_MAX_ITERS {
            let z = xs.dot(&weights) + bias;
            let p = z.mapv(sigmoid);
            let err = &p - y;

            let grad_w = xs.t().dot(&err) / n;
            let grad_b = err.sum() / n;

            weights = weights - grad_w * FIT_LEARNING_RATE;
            bias -= FIT_LEARNING_RATE * grad_b;
        }

        Self {
            weights,
            bias,
            feature_mean,
            feature_std,
        }
    }

    fn predict_proba(&self, x: &Array1<f64>) -> f64 {
        let xs = Array1::from_shape_fn(FEATURE_DIM, |d| {
            (x[d] - self.feature_mean[d]) / self.feature_std[d]
        });
        sigmoid(xs.dot(&self.weights) + self.bias)
    }
}

fn standardize(x: &Array2<f64>, mean: &Array1<f64>, std: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn(x.dim(), |(i, d)| (x[[i, d]] - mean[d]) / std[d])
}

/// Numerically stable logistic sigmoid.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let ez = z.exp();
        ez / (1.0 + ez)
    }
}
