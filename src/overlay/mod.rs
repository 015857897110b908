//! Overlay module for painting ROIs at any zoom level
//!
//! # Submodules
//! - `geometry` - Render shapes, reduced geometry and spatial indexing
//! - `simplify` - Precision reduction, degenerate filtering and thresholds
//! - `cache` - Per-ROI simplification caches and their registry
//! - `tessellation` - Earcut triangulation of render shapes
//! - `painter` - Viewport queries resolving shapes for visible ROIs

pub mod geometry;
pub mod simplify;
pub mod cache;
pub mod tessellation;
pub mod painter;

pub use cache::{CacheStats, ShapeCacheRegistry, ShapeSimplificationCache};
pub use geometry::{ReducedGeometry, RenderShape};
pub use painter::{OverlayPainter, PaintItem};
pub use tessellation::{tessellate_shape, Tessellation};
