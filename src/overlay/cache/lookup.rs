//! ROI to cache association
//!
//! Entries are keyed by the identity of the ROI's `Arc` allocation and hold
//! only a weak reference to the ROI, so the annotation model decides how long
//! a ROI lives. Dead entries are dropped on `purge` and, amortized, whenever
//! the map has doubled in size since the last sweep.

use crate::config::SimplifyConfig;
use crate::overlay::geometry::RenderShape;
use crate::roi::Roi;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::shape_cache::ShapeSimplificationCache;
use super::stats::{CacheCounters, CacheStats};

/// Entries below this count are never swept on insert
const MIN_PURGE_THRESHOLD: usize = 64;

struct RegistryEntry {
    roi: Weak<dyn Roi>,
    cache: Arc<ShapeSimplificationCache>,
}

struct RegistryState {
    entries: HashMap<usize, RegistryEntry>,
    purge_at: usize,
}

/// Shared lookup from ROI to its simplification cache
///
/// One registry is normally owned by the viewer context and shared by every
/// viewer painting the same image.
pub struct ShapeCacheRegistry {
    config: Arc<SimplifyConfig>,
    state: Mutex<RegistryState>,
    counters: Arc<CacheCounters>,
}

impl Default for ShapeCacheRegistry {
    fn default() -> Self {
        Self::from_valid_config(SimplifyConfig::default())
    }
}

impl ShapeCacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose caches use `config`; fails if the settings are invalid
    pub fn with_config(config: SimplifyConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: SimplifyConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Mutex::new(RegistryState {
                entries: HashMap::new(),
                purge_at: MIN_PURGE_THRESHOLD,
            }),
            counters: Arc::new(CacheCounters::default()),
        }
    }

    pub fn config(&self) -> &SimplifyConfig {
        &self.config
    }

    /// Shape to paint for `roi` at `downsample`
    pub fn get_for_downsample(&self, roi: &Arc<dyn Roi>, downsample: f64) -> RenderShape {
        self.cache_for(roi).shape_for_downsample(downsample)
    }

    /// Existing cache for this ROI instance, or a new one
    ///
    /// Two ROIs with equal coordinates but separate allocations get separate
    /// caches.
    pub fn cache_for(&self, roi: &Arc<dyn Roi>) -> Arc<ShapeSimplificationCache> {
        let key = identity_key(roi);
        if let Some(entry) = self.lock_state().entries.get(&key) {
            self.counters.record_lookup(true);
            return Arc::clone(&entry.cache);
        }
        self.counters.record_lookup(false);

        // Materializing the base shape can be slow for big ROIs; keep other
        // viewers unblocked meanwhile
        let created = Arc::new(ShapeSimplificationCache::with_counters(
            roi.as_ref(),
            Arc::clone(&self.config),
            Arc::clone(&self.counters),
        ));

        let mut state = self.lock_state();
        if state.entries.len() >= state.purge_at {
            let removed = purge_entries(&mut state.entries);
            state.purge_at = (state.entries.len() * 2).max(MIN_PURGE_THRESHOLD);
            debug!("Purged {} shape caches of dropped ROIs", removed);
        }
        let entry = state.entries.entry(key).or_insert_with(|| {
            self.counters.record_cache_created();
            RegistryEntry {
                roi: Arc::downgrade(roi),
                cache: created,
            }
        });
        Arc::clone(&entry.cache)
    }

    /// Drop the entries of ROIs that no longer exist; returns how many
    pub fn purge(&self) -> usize {
        let mut state = self.lock_state();
        let removed = purge_entries(&mut state.entries);
        state.purge_at = (state.entries.len() * 2).max(MIN_PURGE_THRESHOLD);
        removed
    }

    /// Number of entries, including any not yet purged
    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The weak reference keeps the allocation, so a live entry's address cannot
/// be reused by another ROI
fn identity_key(roi: &Arc<dyn Roi>) -> usize {
    Arc::as_ptr(roi) as *const () as usize
}

fn purge_entries(entries: &mut HashMap<usize, RegistryEntry>) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.roi.strong_count() > 0);
    before - entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::PolygonRoi;

    fn square() -> Arc<dyn Roi> {
        Arc::new(PolygonRoi::rectangle(0.0, 0.0, 100.0, 100.0))
    }

    #[test]
    fn test_same_roi_same_cache() {
        let registry = ShapeCacheRegistry::new();
        let roi = square();
        let a = registry.cache_for(&roi);
        let b = registry.cache_for(&Arc::clone(&roi));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);

        let stats = registry.stats();
        assert_eq!(stats.lookups, 2);
        assert_eq!(stats.lookup_hits, 1);
        assert_eq!(stats.caches_created, 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let flat = SimplifyConfig {
            schedule: crate::config::ThresholdSchedule::Geometric { step: Some(1.0) },
            ..SimplifyConfig::default()
        };
        assert!(ShapeCacheRegistry::with_config(flat).is_err());

        let no_levels = SimplifyConfig {
            max_levels: 0,
            ..SimplifyConfig::default()
        };
        assert!(ShapeCacheRegistry::with_config(no_levels).is_err());
        assert!(ShapeCacheRegistry::with_config(SimplifyConfig::default()).is_ok());
    }

    #[test]
    fn test_racing_lookups_count_one_cache() {
        let registry = Arc::new(ShapeCacheRegistry::new());
        let roi: Arc<dyn Roi> = Arc::new(PolygonRoi::ellipse(0.0, 0.0, 500.0, 500.0, 5_000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let roi = Arc::clone(&roi);
                std::thread::spawn(move || registry.cache_for(&roi))
            })
            .collect();
        let caches: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(caches.iter().all(|c| Arc::ptr_eq(c, &caches[0])));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.stats().caches_created, 1);
    }

    #[test]
    fn test_dropped_roi_is_purged() {
        let registry = ShapeCacheRegistry::new();
        let kept = square();
        registry.cache_for(&kept);
        {
            let dropped = square();
            registry.cache_for(&dropped);
        }
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.purge(), 1);
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_insert_sweeps_dead_entries() {
        let registry = ShapeCacheRegistry::new();
        for _ in 0..MIN_PURGE_THRESHOLD * 3 {
            let roi = square();
            registry.cache_for(&roi);
        }
        // Every ROI died right after its lookup, so sweeps keep the map small
        assert!(registry.len() <= MIN_PURGE_THRESHOLD + 1);
    }
}
