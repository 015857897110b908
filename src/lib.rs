//! Progressive simplification of region-of-interest shapes for slide overlays
//!
//! Large annotation shapes are reduced to a coarser coordinate grid as the
//! viewer zooms out, and each reduction is cached per ROI so that repeated
//! paints at similar zoom levels reuse earlier work.
//!
//! ```ignore
//! let registry = ShapeCacheRegistry::new();
//! let roi: Arc<dyn Roi> = Arc::new(PolygonRoi::ellipse(0.0, 0.0, 5000.0, 5000.0, 10_000));
//! let shape = registry.get_for_downsample(&roi, 32.0);
//! println!("drawing {} points", shape.num_points());
//! ```

pub mod config;
pub mod error;
pub mod overlay;
pub mod roi;

pub use config::{SimplifyConfig, ThresholdSchedule};
pub use error::SimplifyError;
pub use overlay::{
    CacheStats, OverlayPainter, PaintItem, ReducedGeometry, RenderShape, ShapeCacheRegistry,
    ShapeSimplificationCache, Tessellation,
};
pub use roi::{PolygonRoi, PolylineRoi, Roi};
