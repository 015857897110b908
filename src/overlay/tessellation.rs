//! Polygon tessellation using earcut
//!
//! Converts area shapes into flat triangle buffers for GPU painting. Line
//! shapes carry no area and produce empty buffers; painters stroke them.

use crate::overlay::geometry::RenderShape;
use geo::{Geometry, LineString, Polygon};
use rayon::prelude::*;

/// Polygons below this count are tessellated on the calling thread
const PARALLEL_POLYGON_THRESHOLD: usize = 16;

/// Triangle buffers for one shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tessellation {
    /// x, y pairs
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Tessellation {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append another tessellation, offsetting its indices
    pub(crate) fn append(&mut self, other: Tessellation) {
        let offset = self.vertex_count() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + offset));
    }
}

/// Tessellate every polygon of a shape into one buffer
pub fn tessellate_shape(shape: &RenderShape) -> Tessellation {
    let polygons: Vec<&Polygon<f64>> = match shape.geometry() {
        Geometry::Polygon(p) => vec![p],
        Geometry::MultiPolygon(mp) => mp.0.iter().collect(),
        _ => return Tessellation::default(),
    };

    let parts: Vec<Tessellation> = if polygons.len() >= PARALLEL_POLYGON_THRESHOLD {
        polygons.par_iter().map(|p| tessellate_polygon(p)).collect()
    } else {
        polygons.iter().map(|p| tessellate_polygon(p)).collect()
    };

    let mut combined = Tessellation::default();
    for part in parts {
        combined.append(part);
    }
    combined
}

/// Tessellate a polygon with holes using earcut triangulation
pub fn tessellate_polygon(polygon: &Polygon<f64>) -> Tessellation {
    let mut flat_coords: Vec<f64> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();

    push_ring(&mut flat_coords, polygon.exterior());
    if flat_coords.len() < 6 {
        return Tessellation::default();
    }

    for hole in polygon.interiors() {
        let start = flat_coords.len() / 2;
        push_ring(&mut flat_coords, hole);
        if flat_coords.len() / 2 - start < 3 {
            // Skip degenerate holes
            flat_coords.truncate(start * 2);
            continue;
        }
        hole_indices.push(start);
    }

    let indices = earcutr::earcut(&flat_coords, &hole_indices, 2).unwrap_or_default();

    Tessellation {
        vertices: flat_coords.iter().map(|&v| v as f32).collect(),
        indices: indices.into_iter().map(|i| i as u32).collect(),
    }
}

/// Earcut expects open rings
fn push_ring(flat_coords: &mut Vec<f64>, ring: &LineString<f64>) {
    let coords = ring.0.as_slice();
    let open = if coords.len() > 1 && coords.first() == coords.last() {
        &coords[..coords.len() - 1]
    } else {
        coords
    };
    for c in open {
        flat_coords.push(c.x);
        flat_coords.push(c.y);
    }
}
