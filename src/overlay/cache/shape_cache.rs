//! Per-ROI cache of progressively simplified shapes
//!
//! Each cache holds the full-resolution shape and an ordered list of
//! threshold records. A request is served by the first level whose threshold
//! reaches the requested downsample. Levels are computed on first use from
//! the level before them, never from the original once an intermediate level
//! exists, so every level costs one reduction of an already reduced shape.

use crate::config::SimplifyConfig;
use crate::overlay::geometry::{ReducedGeometry, RenderShape};
use geo::Polygon;
use crate::overlay::simplify::{PrecisionReducer, ThresholdLadder};
use crate::roi::Roi;
use log::{debug, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::stats::CacheCounters;

/// One materialized simplification level
#[derive(Debug)]
pub struct CachedLevel {
    threshold: f64,
    shape: RenderShape,
}

impl CachedLevel {
    fn new(threshold: f64, shape: RenderShape) -> Self {
        Self { threshold, shape }
    }

    /// Level sharing another level's shape
    fn reuse(threshold: f64, source: &CachedLevel) -> Self {
        Self::new(threshold, source.shape.clone())
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Polygons the next level is reduced from
    pub fn polygons(&self) -> &[Polygon<f64>] {
        self.shape.polygons()
    }

    pub fn shape(&self) -> &RenderShape {
        &self.shape
    }

    pub fn num_points(&self) -> usize {
        self.shape.num_points()
    }
}

/// Threshold and its level, `None` until first requested
#[derive(Debug)]
struct LevelRecord {
    threshold: f64,
    level: Option<Arc<CachedLevel>>,
}

/// Simplified shapes of one ROI, keyed by downsample threshold
///
/// Safe to share between threads. Levels are computed without holding the
/// lock; when two threads race on the same level both compute it and the
/// first published result is kept.
#[derive(Debug)]
pub struct ShapeSimplificationCache {
    base_shape: RenderShape,
    /// Full-resolution geometry, `None` when the ROI is never simplified
    base: Option<Arc<CachedLevel>>,
    config: Arc<SimplifyConfig>,
    ladder: ThresholdLadder,
    records: Mutex<Vec<LevelRecord>>,
    counters: Arc<CacheCounters>,
}

impl ShapeSimplificationCache {
    pub fn new(roi: &dyn Roi, config: Arc<SimplifyConfig>) -> Self {
        Self::with_counters(roi, config, Arc::new(CacheCounters::default()))
    }

    pub(crate) fn with_counters(
        roi: &dyn Roi,
        config: Arc<SimplifyConfig>,
        counters: Arc<CacheCounters>,
    ) -> Self {
        let mut base_shape = roi.to_shape();
        let num_points = roi.num_points();

        let base = if roi.is_area() && num_points >= config.min_points {
            // Area kinds other than (multi)polygons are converted once, so
            // the painted original and the reduction source share storage
            if base_shape.polygons().is_empty() {
                let reduced = ReducedGeometry::from(roi.to_geometry());
                if !reduced.is_empty() {
                    base_shape = RenderShape::from_reduced(reduced);
                }
            }
            if base_shape.polygons().is_empty() {
                None
            } else {
                Some(Arc::new(CachedLevel::new(1.0, base_shape.clone())))
            }
        } else {
            None
        };

        let ladder = ThresholdLadder::for_shape(&config, num_points);

        Self {
            base_shape,
            base,
            config,
            ladder,
            records: Mutex::new(Vec::new()),
            counters,
        }
    }

    /// Whether this ROI is large enough, and an area, to ever be simplified
    pub fn is_simplifiable(&self) -> bool {
        self.base.is_some()
    }

    pub fn base_shape(&self) -> &RenderShape {
        &self.base_shape
    }

    /// Shape to paint at `downsample`
    ///
    /// Returns the full-resolution shape for small or non-area ROIs and for
    /// downsamples at or below the configured minimum. Otherwise walks the
    /// thresholds, computing missing levels on the way, and returns the first
    /// level whose threshold is at least `downsample`. The walk also ends at a
    /// level with fewer points than `min_points`, or at the last threshold.
    pub fn shape_for_downsample(&self, downsample: f64) -> RenderShape {
        let base = match &self.base {
            Some(base) => base,
            None => return self.base_shape.clone(),
        };
        if !downsample.is_finite() || downsample <= self.config.min_downsample {
            return self.base_shape.clone();
        }

        let mut current = Arc::clone(base);
        let mut index = 0;
        while let Some(threshold) = self.ladder.threshold(index) {
            current = match self.cached_level(index, threshold) {
                Some(level) => {
                    self.counters.record_level_hit();
                    level
                }
                None => self.compute_level(index, threshold, &current),
            };
            if threshold >= downsample || current.num_points() < self.config.min_points {
                break;
            }
            index += 1;
        }
        current.shape.clone()
    }

    /// Number of levels materialized so far
    pub fn computed_levels(&self) -> usize {
        self.lock_records()
            .iter()
            .filter(|record| record.level.is_some())
            .count()
    }

    /// Levels materialized so far, in threshold order
    pub fn levels(&self) -> Vec<Arc<CachedLevel>> {
        self.lock_records()
            .iter()
            .filter_map(|record| record.level.clone())
            .collect()
    }

    /// Thresholds of the records created so far, in order
    pub fn thresholds(&self) -> Vec<f64> {
        self.lock_records().iter().map(|record| record.threshold).collect()
    }

    fn lock_records(&self) -> MutexGuard<'_, Vec<LevelRecord>> {
        // A panic while holding the lock cannot leave a half-written record
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Existing level for record `index`, creating empty records up to it
    fn cached_level(&self, index: usize, threshold: f64) -> Option<Arc<CachedLevel>> {
        let mut records = self.lock_records();
        while records.len() <= index {
            let next = records.len();
            let threshold = if next == index {
                threshold
            } else {
                self.ladder.threshold(next)?
            };
            records.push(LevelRecord {
                threshold,
                level: None,
            });
        }
        records[index].level.clone()
    }

    fn compute_level(&self, index: usize, threshold: f64, source: &CachedLevel) -> Arc<CachedLevel> {
        let reducer = PrecisionReducer::from_config(threshold, &self.config)
            .with_fallback(self.base_shape.bounds());
        let level = match reducer.reduce(source.polygons()) {
            Ok(geometry) if geometry.num_points() > source.num_points() => {
                debug!(
                    "Reduction at {:.2} grew {} -> {} points, keeping previous level",
                    threshold,
                    source.num_points(),
                    geometry.num_points()
                );
                CachedLevel::reuse(threshold, source)
            }
            Ok(geometry) if geometry.is_empty() => CachedLevel::reuse(threshold, source),
            Ok(geometry) => CachedLevel::new(threshold, RenderShape::from_reduced(geometry)),
            Err(e) => {
                warn!(
                    "Unable to simplify shape at downsample {:.2} ({} points): {}",
                    threshold,
                    source.num_points(),
                    e
                );
                self.counters.record_failure();
                CachedLevel::reuse(threshold, source)
            }
        };
        self.counters.record_level_computed();
        debug!(
            "Level {} (downsample {:.2}): {} -> {} points",
            index,
            threshold,
            source.num_points(),
            level.num_points()
        );

        let level = Arc::new(level);
        let mut records = self.lock_records();
        match records.get_mut(index) {
            Some(record) => match &record.level {
                Some(existing) => Arc::clone(existing),
                None => {
                    record.level = Some(Arc::clone(&level));
                    level
                }
            },
            None => level,
        }
    }
}
