//! Core shape types shared by the reducer, the cache and the painter
//!
//! `RenderShape` is what a painter draws. `ReducedGeometry` is what the
//! precision reducer produces, kept as a closed set of variants so callers
//! never have to inspect arbitrary geometry kinds.

use geo::{BoundingRect, Geometry, LineString, MultiPolygon, Polygon, Rect};
use std::sync::Arc;

/// Number of vertices in a ring, not counting the closing coordinate
pub fn ring_vertex_count(ring: &LineString<f64>) -> usize {
    let n = ring.0.len();
    if n > 1 && ring.is_closed() {
        n - 1
    } else {
        n
    }
}

pub fn polygon_vertex_count(polygon: &Polygon<f64>) -> usize {
    ring_vertex_count(polygon.exterior())
        + polygon.interiors().iter().map(ring_vertex_count).sum::<usize>()
}

/// Vertex count of any geometry, ignoring the closing coordinate of rings
pub fn vertex_count(geometry: &Geometry<f64>) -> usize {
    match geometry {
        Geometry::Point(_) => 1,
        Geometry::Line(_) => 2,
        Geometry::LineString(ls) => ls.0.len(),
        Geometry::MultiPoint(mp) => mp.0.len(),
        Geometry::MultiLineString(mls) => mls.0.iter().map(|ls| ls.0.len()).sum(),
        Geometry::Polygon(p) => polygon_vertex_count(p),
        Geometry::MultiPolygon(mp) => mp.0.iter().map(polygon_vertex_count).sum(),
        Geometry::Rect(_) => 4,
        Geometry::Triangle(_) => 3,
        Geometry::GeometryCollection(gc) => gc.0.iter().map(vertex_count).sum(),
    }
}

/// Output of a precision reduction step
#[derive(Debug, Clone, PartialEq)]
pub enum ReducedGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    Empty,
}

impl ReducedGeometry {
    /// Wrap a list of polygons in the narrowest variant
    pub fn from_polygons(mut polygons: Vec<Polygon<f64>>) -> Self {
        match polygons.len() {
            0 => ReducedGeometry::Empty,
            1 => match polygons.pop() {
                Some(polygon) => ReducedGeometry::Polygon(polygon),
                None => ReducedGeometry::Empty,
            },
            _ => ReducedGeometry::MultiPolygon(MultiPolygon::new(polygons)),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ReducedGeometry::Polygon(_) => false,
            ReducedGeometry::MultiPolygon(mp) => mp.0.is_empty(),
            ReducedGeometry::Empty => true,
        }
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            ReducedGeometry::Polygon(p) => std::slice::from_ref(p),
            ReducedGeometry::MultiPolygon(mp) => &mp.0,
            ReducedGeometry::Empty => &[],
        }
    }

    pub fn num_points(&self) -> usize {
        self.polygons().iter().map(polygon_vertex_count).sum()
    }

    pub fn num_holes(&self) -> usize {
        self.polygons().iter().map(|p| p.interiors().len()).sum()
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        polygons_bounds(self.polygons())
    }

    pub fn into_geometry(self) -> Geometry<f64> {
        match self {
            ReducedGeometry::Polygon(p) => Geometry::Polygon(p),
            ReducedGeometry::MultiPolygon(mp) => Geometry::MultiPolygon(mp),
            ReducedGeometry::Empty => Geometry::MultiPolygon(MultiPolygon::new(vec![])),
        }
    }
}

/// Pick the area part of a geometry; anything without area becomes `Empty`
impl From<Geometry<f64>> for ReducedGeometry {
    fn from(geometry: Geometry<f64>) -> Self {
        match geometry {
            Geometry::Polygon(p) => ReducedGeometry::Polygon(p),
            Geometry::MultiPolygon(mp) => ReducedGeometry::from_polygons(mp.0),
            Geometry::Rect(r) => ReducedGeometry::Polygon(r.to_polygon()),
            Geometry::Triangle(t) => ReducedGeometry::Polygon(t.to_polygon()),
            Geometry::GeometryCollection(gc) => ReducedGeometry::from_polygons(
                gc.0.into_iter()
                    .flat_map(|g| ReducedGeometry::from(g).polygons().to_vec())
                    .collect(),
            ),
            _ => ReducedGeometry::Empty,
        }
    }
}

/// Bounding box over a set of polygons
pub fn polygons_bounds(polygons: &[Polygon<f64>]) -> Option<Rect<f64>> {
    let mut rects = polygons.iter().filter_map(|p| p.bounding_rect());
    let first = rects.next()?;
    Some(rects.fold(first, |acc, r| {
        Rect::new(
            (acc.min().x.min(r.min().x), acc.min().y.min(r.min().y)),
            (acc.max().x.max(r.max().x), acc.max().y.max(r.max().y)),
        )
    }))
}

/// A shape ready to be painted
///
/// Cheap to clone: the geometry sits behind an `Arc` so cached levels can be
/// handed to several viewers at once.
#[derive(Debug, Clone)]
pub struct RenderShape {
    geometry: Arc<Geometry<f64>>,
    num_points: usize,
    bounds: Option<Rect<f64>>,
}

impl RenderShape {
    pub fn new(geometry: Geometry<f64>) -> Self {
        let num_points = vertex_count(&geometry);
        let bounds = geometry.bounding_rect();
        Self {
            geometry: Arc::new(geometry),
            num_points,
            bounds,
        }
    }

    pub fn from_reduced(reduced: ReducedGeometry) -> Self {
        Self::new(reduced.into_geometry())
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    /// Area part of the shape, empty for lines and points
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self.geometry.as_ref() {
            Geometry::Polygon(p) => std::slice::from_ref(p),
            Geometry::MultiPolygon(mp) => &mp.0,
            _ => &[],
        }
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Bounding box, `None` for an empty geometry
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    /// True when both shapes share the same underlying geometry allocation
    pub fn ptr_eq(&self, other: &RenderShape) -> bool {
        Arc::ptr_eq(&self.geometry, &other.geometry)
    }

    /// Number of interior rings over all polygons of the shape
    pub fn num_holes(&self) -> usize {
        match self.geometry.as_ref() {
            Geometry::Polygon(p) => p.interiors().len(),
            Geometry::MultiPolygon(mp) => mp.0.iter().map(|p| p.interiors().len()).sum(),
            _ => 0,
        }
    }
}
