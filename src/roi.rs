//! Region-of-interest abstraction consumed by the overlay
//!
//! The annotation model owns its ROIs; the overlay only needs a point count,
//! an area predicate and the two geometric views defined by [`Roi`]. Two
//! plain implementations are provided for callers that do not have their own
//! annotation types.

use crate::overlay::geometry::{polygon_vertex_count, RenderShape};
use geo::{BoundingRect, Coord, Geometry, LineString, MultiPolygon, Polygon, Rect};
use std::f64::consts::PI;

/// A region of interest as seen by the overlay painter
///
/// Implementations must be immutable once shared: cached simplifications are
/// never invalidated.
pub trait Roi: Send + Sync {
    /// Number of vertices defining the ROI
    fn num_points(&self) -> usize;

    /// True for closed areas, false for lines and points
    fn is_area(&self) -> bool;

    /// The full-resolution shape to paint
    fn to_shape(&self) -> RenderShape;

    /// Topological geometry used for precision reduction
    fn to_geometry(&self) -> Geometry<f64>;

    fn bounds(&self) -> Option<Rect<f64>> {
        self.to_geometry().bounding_rect()
    }
}

/// Area ROI made of one or more polygons with optional holes
#[derive(Debug, Clone)]
pub struct PolygonRoi {
    polygons: MultiPolygon<f64>,
}

impl PolygonRoi {
    pub fn new(exterior: Vec<(f64, f64)>, holes: Vec<Vec<(f64, f64)>>) -> Self {
        let polygon = Polygon::new(
            LineString::from(exterior),
            holes.into_iter().map(LineString::from).collect(),
        );
        Self::from_polygon(polygon)
    }

    pub fn from_polygon(polygon: Polygon<f64>) -> Self {
        Self {
            polygons: MultiPolygon::new(vec![polygon]),
        }
    }

    pub fn from_multi_polygon(polygons: MultiPolygon<f64>) -> Self {
        Self { polygons }
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_polygon(Rect::new((x, y), (x + width, y + height)).to_polygon())
    }

    /// Ellipse approximated by `n_points` vertices
    pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64, n_points: usize) -> Self {
        Self::from_polygon(Polygon::new(ellipse_ring(cx, cy, rx, ry, n_points), vec![]))
    }

    /// Ellipse with elliptical holes, each given as `(cx, cy, rx, ry)`
    pub fn ellipse_with_holes(
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        n_points: usize,
        holes: &[(f64, f64, f64, f64)],
        hole_points: usize,
    ) -> Self {
        let interiors = holes
            .iter()
            .map(|&(hx, hy, hrx, hry)| ellipse_ring(hx, hy, hrx, hry, hole_points))
            .collect();
        Self::from_polygon(Polygon::new(ellipse_ring(cx, cy, rx, ry, n_points), interiors))
    }

    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }
}

impl Roi for PolygonRoi {
    fn num_points(&self) -> usize {
        self.polygons.0.iter().map(polygon_vertex_count).sum()
    }

    fn is_area(&self) -> bool {
        true
    }

    fn to_shape(&self) -> RenderShape {
        RenderShape::new(self.to_geometry())
    }

    fn to_geometry(&self) -> Geometry<f64> {
        match self.polygons.0.as_slice() {
            [single] => Geometry::Polygon(single.clone()),
            _ => Geometry::MultiPolygon(self.polygons.clone()),
        }
    }

    fn bounds(&self) -> Option<Rect<f64>> {
        self.polygons.bounding_rect()
    }
}

/// Open polyline ROI; never simplified by the overlay
#[derive(Debug, Clone)]
pub struct PolylineRoi {
    line: LineString<f64>,
}

impl PolylineRoi {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self {
            line: LineString::from(points),
        }
    }
}

impl Roi for PolylineRoi {
    fn num_points(&self) -> usize {
        self.line.0.len()
    }

    fn is_area(&self) -> bool {
        false
    }

    fn to_shape(&self) -> RenderShape {
        RenderShape::new(self.to_geometry())
    }

    fn to_geometry(&self) -> Geometry<f64> {
        Geometry::LineString(self.line.clone())
    }

    fn bounds(&self) -> Option<Rect<f64>> {
        self.line.bounding_rect()
    }
}

fn ellipse_ring(cx: f64, cy: f64, rx: f64, ry: f64, n_points: usize) -> LineString<f64> {
    let n = n_points.max(3);
    let coords: Vec<Coord<f64>> = (0..n)
        .map(|i| {
            let angle = (i as f64 / n as f64) * PI * 2.0;
            Coord {
                x: cx + angle.cos() * rx,
                y: cy + angle.sin() * ry,
            }
        })
        .collect();
    LineString::new(coords)
}
