//! Removal of rings too small to see at a given grid size

use geo::{BoundingRect, LineString, Polygon};

/// Drops polygons and holes whose bounding box is smaller than the grid
#[derive(Debug, Clone, Copy)]
pub struct DegenerateFilter {
    grid: f64,
}

impl DegenerateFilter {
    pub fn new(grid: f64) -> Self {
        Self { grid }
    }

    /// A ring is visible when both sides of its bounding box reach the grid
    pub fn is_visible(&self, ring: &LineString<f64>) -> bool {
        match ring.bounding_rect() {
            Some(rect) => rect.width() >= self.grid && rect.height() >= self.grid,
            None => false,
        }
    }

    /// Filter one polygon: `None` if the exterior is too small, otherwise the
    /// polygon with its invisible holes removed
    pub fn filter_polygon(&self, polygon: Polygon<f64>) -> Option<Polygon<f64>> {
        if !self.is_visible(polygon.exterior()) {
            return None;
        }
        if polygon.interiors().iter().all(|hole| self.is_visible(hole)) {
            return Some(polygon);
        }
        let (exterior, interiors) = polygon.into_inner();
        let kept: Vec<LineString<f64>> = interiors
            .into_iter()
            .filter(|hole| self.is_visible(hole))
            .collect();
        Some(Polygon::new(exterior, kept))
    }

    pub fn filter_all(&self, polygons: Vec<Polygon<f64>>) -> Vec<Polygon<f64>> {
        polygons
            .into_iter()
            .filter_map(|p| self.filter_polygon(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Rect};

    fn square(x: f64, y: f64, size: f64) -> LineString<f64> {
        Rect::new((x, y), (x + size, y + size)).to_polygon().exterior().clone()
    }

    #[test]
    fn test_small_exterior_is_dropped() {
        let filter = DegenerateFilter::new(8.0);
        let tiny = Polygon::new(square(0.0, 0.0, 5.0), vec![]);
        assert!(filter.filter_polygon(tiny).is_none());

        // Wide but flat: one side below the grid is enough to drop it
        let flat = polygon![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0), (x: 100.0, y: 4.0)];
        assert!(filter.filter_polygon(flat).is_none());
    }

    #[test]
    fn test_small_holes_are_dropped() {
        let filter = DegenerateFilter::new(8.0);
        let polygon = Polygon::new(
            square(0.0, 0.0, 100.0),
            vec![square(10.0, 10.0, 4.0), square(50.0, 50.0, 20.0)],
        );
        let kept = filter.filter_polygon(polygon).unwrap();
        assert_eq!(kept.interiors().len(), 1);
        assert_eq!(kept.interiors()[0].bounding_rect().unwrap().width(), 20.0);
    }

    #[test]
    fn test_grid_sized_ring_is_visible() {
        let filter = DegenerateFilter::new(8.0);
        assert!(filter.is_visible(&square(0.0, 0.0, 8.0)));
        assert!(!filter.is_visible(&LineString::new(vec![])));
    }
}
