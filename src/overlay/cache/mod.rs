//! Caching of simplified ROI shapes
//!
//! # Submodules
//! - `shape_cache` - Per-ROI ladder of lazily computed simplification levels
//! - `lookup` - Weakly keyed registry mapping ROIs to their caches
//! - `stats` - Counters for lookups, computed levels and failures

mod shape_cache;
mod lookup;
mod stats;

pub use shape_cache::{
    CachedLevel,
    ShapeSimplificationCache,
};

pub use lookup::ShapeCacheRegistry;

pub use stats::{
    CacheCounters,
    CacheStats,
};
