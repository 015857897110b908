//! Geometry module for ROI overlays
//!
//! # Submodules
//! - `types` - Render shapes, reduced geometry and vertex counting
//! - `spatial` - Spatial indexing of ROI bounds for viewport queries

mod types;
mod spatial;

pub use types::{
    ring_vertex_count,
    polygon_vertex_count,
    vertex_count,
    polygons_bounds,
    ReducedGeometry,
    RenderShape,
};

pub use spatial::{
    IndexedRoi,
    envelope_of,
};
