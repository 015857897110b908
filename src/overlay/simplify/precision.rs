//! Precision reduction of area geometry
//!
//! Coordinates are snapped to a square grid whose cell size is the target
//! downsample. Snapping collapses runs of nearby vertices into duplicates and
//! back-tracking spikes, which are removed before an optional boolean-op
//! clean-up. Rings that end up too small for the grid are dropped.

use crate::config::SimplifyConfig;
use crate::error::{SimplifyError, SimplifyResult};
use crate::overlay::geometry::{polygon_vertex_count, polygons_bounds, ReducedGeometry};
use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon, Rect};
use log::{debug, trace};

use super::degenerate::DegenerateFilter;

/// What a collapse pass did to one ring
#[derive(Debug, Clone, PartialEq)]
enum RingOutcome {
    /// No duplicates or spikes: keep the snapped ring
    Unchanged,
    /// Duplicates removed, at least 3 distinct points remain
    Rebuilt(Vec<Coord<f64>>),
    /// Fewer than 3 distinct points remain
    Degenerate,
}

/// Reduces geometry to a fixed-precision grid
#[derive(Debug, Clone, Copy)]
pub struct PrecisionReducer {
    grid: f64,
    passes: usize,
    clean_topology: bool,
    fallback: Option<Rect<f64>>,
}

impl PrecisionReducer {
    pub fn new(grid: f64) -> Self {
        Self {
            grid,
            passes: 2,
            clean_topology: true,
            fallback: None,
        }
    }

    pub fn from_config(grid: f64, config: &SimplifyConfig) -> Self {
        Self {
            grid,
            passes: config.precision_passes.max(1),
            clean_topology: config.clean_topology,
            fallback: None,
        }
    }

    pub fn with_clean_topology(mut self, clean: bool) -> Self {
        self.clean_topology = clean;
        self
    }

    /// Rectangle returned when nothing survives; defaults to the source bounds
    pub fn with_fallback(mut self, bounds: Option<Rect<f64>>) -> Self {
        self.fallback = bounds;
        self
    }

    /// Reduce `source` to the grid
    ///
    /// Never returns `Empty` for a non-empty source: if nothing survives, the
    /// fallback rectangle (or the source bounding rectangle) is returned
    /// instead.
    pub fn reduce(&self, source: &[Polygon<f64>]) -> SimplifyResult<ReducedGeometry> {
        if !(self.grid.is_finite() && self.grid > 0.0) {
            return Err(SimplifyError::InvalidGrid(self.grid));
        }
        if source
            .iter()
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
            .flat_map(|ring| ring.0.iter())
            .any(|c| !(c.x.is_finite() && c.y.is_finite()))
        {
            return Err(SimplifyError::NonFinite);
        }

        let snapped: Vec<Polygon<f64>> = source
            .iter()
            .filter_map(|p| self.snap_polygon(p))
            .collect();

        let cleaned = if self.clean_topology && !snapped.is_empty() {
            self.clean(snapped)?
        } else {
            snapped
        };

        let survivors = DegenerateFilter::new(self.grid).filter_all(cleaned);
        let reduced = ReducedGeometry::from_polygons(survivors);

        if reduced.is_empty() {
            debug!(
                "Nothing survived reduction at grid {:.3}, falling back to bounds",
                self.grid
            );
            return Ok(match self.fallback.or_else(|| polygons_bounds(source)) {
                Some(rect) => ReducedGeometry::Polygon(rect.to_polygon()),
                None => ReducedGeometry::Empty,
            });
        }

        trace!(
            "Reduced {} -> {} points at grid {:.3}",
            source.iter().map(polygon_vertex_count).sum::<usize>(),
            reduced.num_points(),
            self.grid
        );
        Ok(reduced)
    }

    /// Snap one polygon; `None` when the exterior collapses
    fn snap_polygon(&self, polygon: &Polygon<f64>) -> Option<Polygon<f64>> {
        let exterior = self.snap_ring(polygon.exterior())?;
        let holes = polygon
            .interiors()
            .iter()
            .filter_map(|hole| self.snap_ring(hole))
            .collect();
        Some(Polygon::new(exterior, holes))
    }

    fn snap_ring(&self, ring: &LineString<f64>) -> Option<LineString<f64>> {
        let mut coords: Vec<Coord<f64>> = open_ring(ring)
            .iter()
            .map(|c| snap_coord(*c, self.grid))
            .collect();

        for pass in 0..self.passes {
            match collapse_ring(&coords) {
                RingOutcome::Unchanged => break,
                RingOutcome::Rebuilt(rebuilt) => {
                    trace!("Pass {}: ring {} -> {} points", pass, coords.len(), rebuilt.len());
                    coords = rebuilt;
                }
                RingOutcome::Degenerate => return None,
            }
        }

        if coords.len() < 3 {
            return None;
        }
        // Polygon::new closes the ring
        Some(LineString::new(coords))
    }

    /// Union the snapped polygons to resolve overlaps and self-touching rings
    fn clean(&self, polygons: Vec<Polygon<f64>>) -> SimplifyResult<Vec<Polygon<f64>>> {
        let subject = MultiPolygon::new(polygons);
        let empty = MultiPolygon::<f64>::new(vec![]);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| subject.union(&empty)))
            .map_err(|e| {
                let message = e
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| e.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "boolean operation panicked".to_string());
                SimplifyError::Topology(message)
            })?;
        Ok(result.0)
    }
}

/// Round a coordinate to the nearest multiple of `grid`
pub fn snap_coord(c: Coord<f64>, grid: f64) -> Coord<f64> {
    Coord {
        x: (c.x / grid).round() * grid,
        y: (c.y / grid).round() * grid,
    }
}

/// Ring coordinates without the closing duplicate
fn open_ring(ring: &LineString<f64>) -> &[Coord<f64>] {
    let coords = ring.0.as_slice();
    if coords.len() > 1 && coords.first() == coords.last() {
        &coords[..coords.len() - 1]
    } else {
        coords
    }
}

/// Remove consecutive duplicates and `a b a` spikes from an open ring,
/// treating it as cyclic
fn collapse_ring(coords: &[Coord<f64>]) -> RingOutcome {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for &c in coords {
        if out.last() == Some(&c) {
            continue;
        }
        if out.len() >= 2 && out[out.len() - 2] == c {
            out.pop();
            continue;
        }
        out.push(c);
    }

    // Close the cycle: the seam between the last and first point can hide
    // the same duplicates and spikes
    loop {
        let n = out.len();
        if n >= 2 && out[0] == out[n - 1] {
            out.pop();
        } else if n >= 3 && out[n - 2] == out[0] {
            out.pop();
        } else if n >= 3 && out[n - 1] == out[1] {
            out.remove(0);
        } else {
            break;
        }
    }

    if out.len() < 3 {
        RingOutcome::Degenerate
    } else if out.len() == coords.len() {
        RingOutcome::Unchanged
    } else {
        RingOutcome::Rebuilt(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Rect};
    use std::f64::consts::PI;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn circle(radius: f64, n: usize) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * PI * 2.0;
                c(a.cos() * radius, a.sin() * radius)
            })
            .collect();
        Polygon::new(LineString::new(coords), vec![])
    }

    #[test]
    fn test_snap_coord() {
        assert_eq!(snap_coord(c(3.9, -4.1), 8.0), c(8.0, -8.0));
        assert_eq!(snap_coord(c(3.9, 12.5), 1.0), c(4.0, 13.0));
    }

    #[test]
    fn test_collapse_removes_duplicates() {
        let ring = vec![c(0.0, 0.0), c(0.0, 0.0), c(8.0, 0.0), c(8.0, 8.0), c(0.0, 8.0)];
        assert_eq!(
            collapse_ring(&ring),
            RingOutcome::Rebuilt(vec![c(0.0, 0.0), c(8.0, 0.0), c(8.0, 8.0), c(0.0, 8.0)])
        );
    }

    #[test]
    fn test_collapse_removes_spikes() {
        // The excursion to (16, 0) goes out and straight back
        let ring = vec![
            c(0.0, 0.0),
            c(8.0, 0.0),
            c(16.0, 0.0),
            c(8.0, 0.0),
            c(8.0, 8.0),
            c(0.0, 8.0),
        ];
        assert_eq!(
            collapse_ring(&ring),
            RingOutcome::Rebuilt(vec![c(0.0, 0.0), c(8.0, 0.0), c(8.0, 8.0), c(0.0, 8.0)])
        );
    }

    #[test]
    fn test_collapse_across_seam() {
        let ring = vec![c(0.0, 0.0), c(8.0, 0.0), c(8.0, 8.0), c(0.0, 8.0), c(0.0, 0.0)];
        assert_eq!(
            collapse_ring(&ring),
            RingOutcome::Rebuilt(vec![c(0.0, 0.0), c(8.0, 0.0), c(8.0, 8.0), c(0.0, 8.0)])
        );
    }

    #[test]
    fn test_collapse_keeps_clean_ring() {
        let ring = vec![c(0.0, 0.0), c(8.0, 0.0), c(8.0, 8.0)];
        assert_eq!(collapse_ring(&ring), RingOutcome::Unchanged);
    }

    #[test]
    fn test_collapse_degenerate() {
        let ring = vec![c(0.0, 0.0), c(8.0, 0.0), c(0.0, 0.0), c(8.0, 0.0)];
        assert_eq!(collapse_ring(&ring), RingOutcome::Degenerate);
    }

    #[test]
    fn test_reduce_circle_reduces_points() {
        let source = vec![circle(1000.0, 4000)];
        let reduced = PrecisionReducer::new(16.0).reduce(&source).unwrap();
        assert!(reduced.num_points() < 4000);
        assert!(reduced.num_points() >= 3);

        let bounds = reduced.bounds().unwrap();
        assert!((bounds.width() - 2000.0).abs() <= 32.0, "width {}", bounds.width());
        assert!((bounds.height() - 2000.0).abs() <= 32.0, "height {}", bounds.height());
    }

    #[test]
    fn test_reduce_drops_small_hole() {
        let polygon = Polygon::new(
            circle(500.0, 2000).exterior().clone(),
            vec![Rect::new((100.0, 100.0), (103.0, 103.0)).to_polygon().exterior().clone()],
        );
        let reduced = PrecisionReducer::new(8.0)
            .reduce(&[polygon])
            .unwrap();
        assert_eq!(reduced.num_holes(), 0);
        assert!(!reduced.is_empty());
    }

    #[test]
    fn test_reduce_tiny_shape_falls_back_to_bounds() {
        let tiny = polygon![
            (x: 1.0, y: 1.0),
            (x: 3.0, y: 1.5),
            (x: 2.5, y: 3.0),
            (x: 1.2, y: 2.8),
        ];
        let reduced = PrecisionReducer::new(16.0)
            .reduce(&[tiny])
            .unwrap();
        let bounds = reduced.bounds().unwrap();
        assert_eq!(reduced.num_points(), 4);
        assert_eq!(bounds.min().x, 1.0);
        assert_eq!(bounds.max().x, 3.0);
        assert_eq!(bounds.min().y, 1.0);
        assert_eq!(bounds.max().y, 3.0);
    }

    #[test]
    fn test_fallback_uses_given_bounds() {
        // A previous level snapped to grid 8 has drifted from the real extent
        let snapped = polygon![
            (x: 0.0, y: 0.0),
            (x: 8.0, y: 0.0),
            (x: 8.0, y: 8.0),
            (x: 0.0, y: 8.0),
        ];
        let original = Rect::new((1.0, 1.0), (6.5, 7.0));
        let reduced = PrecisionReducer::new(32.0)
            .with_fallback(Some(original))
            .reduce(&[snapped])
            .unwrap();
        assert_eq!(reduced.num_points(), 4);
        assert_eq!(reduced.bounds(), Some(original));
    }

    #[test]
    fn test_reduce_without_clean_up() {
        let source = vec![circle(1000.0, 4000)];
        let reduced = PrecisionReducer::new(16.0)
            .with_clean_topology(false)
            .reduce(&source)
            .unwrap();
        assert!(matches!(reduced, ReducedGeometry::Polygon(_)));
        assert!(reduced.num_points() < 4000);
    }

    #[test]
    fn test_reduce_rejects_bad_input() {
        let source = vec![circle(10.0, 16)];
        assert!(matches!(
            PrecisionReducer::new(0.0).reduce(&source),
            Err(SimplifyError::InvalidGrid(_))
        ));

        let broken = polygon![(x: 0.0, y: 0.0), (x: f64::NAN, y: 0.0), (x: 1.0, y: 1.0)];
        assert!(matches!(
            PrecisionReducer::new(4.0).reduce(&[broken]),
            Err(SimplifyError::NonFinite)
        ));
    }
}
