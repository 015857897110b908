//! Counters shared by a registry and the caches it creates

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct CacheCounters {
    lookups: AtomicUsize,
    lookup_hits: AtomicUsize,
    caches_created: AtomicUsize,
    levels_computed: AtomicUsize,
    level_hits: AtomicUsize,
    reduction_failures: AtomicUsize,
}

impl CacheCounters {
    pub fn record_lookup(&self, hit: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.lookup_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cache_created(&self) {
        self.caches_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_level_computed(&self) {
        self.levels_computed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_level_hit(&self) {
        self.level_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.reduction_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            lookup_hits: self.lookup_hits.load(Ordering::Relaxed),
            caches_created: self.caches_created.load(Ordering::Relaxed),
            levels_computed: self.levels_computed.load(Ordering::Relaxed),
            level_hits: self.level_hits.load(Ordering::Relaxed),
            reduction_failures: self.reduction_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters, serializable for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub lookups: usize,
    pub lookup_hits: usize,
    pub caches_created: usize,
    pub levels_computed: usize,
    pub level_hits: usize,
    pub reduction_failures: usize,
}
