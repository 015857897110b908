//! Spatial indexing of ROI bounds
//!
//! R-tree entries used by the overlay painter to find the ROIs touching a
//! viewport region without visiting every annotation on the slide.

use geo::Rect;
use rstar::{RTreeObject, AABB};

/// One ROI in the spatial index, identified by its slot in the painter
#[derive(Clone, Debug)]
pub struct IndexedRoi {
    pub slot: usize,
    pub bounds: AABB<[f64; 2]>,
}

impl IndexedRoi {
    pub fn new(slot: usize, rect: Rect<f64>) -> Self {
        let bounds = AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );
        Self { slot, bounds }
    }
}

impl RTreeObject for IndexedRoi {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

impl rstar::PointDistance for IndexedRoi {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.bounds.distance_2(point)
    }
}

/// Convert a viewport rectangle into an R-tree query envelope
pub fn envelope_of(rect: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}
