//! Downsample thresholds at which a cache simplifies
//!
//! Thresholds start above the minimum downsample and grow by a multiplicative
//! step. Large shapes jump faster so the total number of reductions stays
//! small.

use crate::config::{SimplifyConfig, ThresholdSchedule};
use log::warn;

/// Step used for shapes with at least 100k points
pub const LARGE_SHAPE_STEP: f64 = 2.0;
/// Step used for shapes with at least 10k points
pub const MEDIUM_SHAPE_STEP: f64 = 1.5;
pub const SMALL_SHAPE_STEP: f64 = 1.25;

/// Pick the multiplicative step for a shape with `num_points` vertices
pub fn auto_step(num_points: usize) -> f64 {
    if num_points >= 100_000 {
        LARGE_SHAPE_STEP
    } else if num_points >= 10_000 {
        MEDIUM_SHAPE_STEP
    } else {
        SMALL_SHAPE_STEP
    }
}

/// Strictly increasing sequence of thresholds for one cache
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdLadder {
    Geometric { start: f64, step: f64, max_levels: usize },
    Explicit(Vec<f64>),
}

impl ThresholdLadder {
    /// Ladder for a shape of `num_points` vertices
    ///
    /// Settings that would not give strictly increasing thresholds are
    /// replaced: a step at or below 1 falls back to the automatic step and the
    /// start is kept at 1 or above.
    pub fn for_shape(config: &SimplifyConfig, num_points: usize) -> Self {
        match &config.schedule {
            ThresholdSchedule::Geometric { step } => {
                let step = match *step {
                    Some(step) if step.is_finite() && step > 1.0 => step,
                    Some(step) => {
                        warn!("Ignoring geometric step {}, thresholds must grow", step);
                        auto_step(num_points)
                    }
                    None => auto_step(num_points),
                };
                // NaN.max(1.0) is 1.0
                let start = config.min_downsample.max(1.0);
                ThresholdLadder::Geometric {
                    start: if start.is_finite() { start } else { 1.0 },
                    step,
                    max_levels: config.max_levels,
                }
            }
            ThresholdSchedule::Explicit { thresholds } => {
                let mut sorted: Vec<f64> = thresholds
                    .iter()
                    .copied()
                    .filter(|t| t.is_finite() && *t > config.min_downsample)
                    .collect();
                sorted.sort_by(f64::total_cmp);
                sorted.dedup();
                sorted.truncate(config.max_levels);
                ThresholdLadder::Explicit(sorted)
            }
        }
    }

    /// Threshold of record `index`, `None` past the end of the ladder
    pub fn threshold(&self, index: usize) -> Option<f64> {
        match self {
            ThresholdLadder::Geometric { start, step, max_levels } => {
                if index >= *max_levels {
                    return None;
                }
                Some(start * step.powi(index as i32 + 1))
            }
            ThresholdLadder::Explicit(values) => values.get(index).copied(),
        }
    }
}
