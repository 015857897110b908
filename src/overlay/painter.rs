//! Viewport-driven resolution of ROI shapes
//!
//! The painter keeps the ROIs of one image in an R-tree over their bounds.
//! For a visible region and downsample it returns, in insertion order, the
//! shape each intersecting ROI should be drawn with, resolving shapes in
//! parallel through the shared cache registry.

use crate::overlay::cache::ShapeCacheRegistry;
use crate::overlay::geometry::{envelope_of, IndexedRoi, RenderShape};
use crate::overlay::tessellation::{tessellate_shape, Tessellation};
use crate::roi::Roi;
use geo::Rect;
use log::debug;
use rayon::prelude::*;
use rstar::RTree;
use std::sync::Arc;

/// A ROI and the shape to draw for it
#[derive(Debug, Clone)]
pub struct PaintItem {
    /// Insertion position of the ROI in the painter
    pub slot: usize,
    pub shape: RenderShape,
}

pub struct OverlayPainter {
    registry: Arc<ShapeCacheRegistry>,
    rois: Vec<Arc<dyn Roi>>,
    index: RTree<IndexedRoi>,
}

impl OverlayPainter {
    pub fn new(registry: Arc<ShapeCacheRegistry>) -> Self {
        Self {
            registry,
            rois: Vec::new(),
            index: RTree::new(),
        }
    }

    /// Build a painter over `rois`, bulk loading the spatial index
    pub fn with_rois(registry: Arc<ShapeCacheRegistry>, rois: Vec<Arc<dyn Roi>>) -> Self {
        let entries: Vec<IndexedRoi> = rois
            .iter()
            .enumerate()
            .filter_map(|(slot, roi)| roi.bounds().map(|rect| IndexedRoi::new(slot, rect)))
            .collect();
        Self {
            registry,
            rois,
            index: RTree::bulk_load(entries),
        }
    }

    /// Add a ROI; returns its slot
    pub fn insert(&mut self, roi: Arc<dyn Roi>) -> usize {
        let slot = self.rois.len();
        if let Some(rect) = roi.bounds() {
            self.index.insert(IndexedRoi::new(slot, rect));
        }
        self.rois.push(roi);
        slot
    }

    pub fn len(&self) -> usize {
        self.rois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }

    pub fn registry(&self) -> &Arc<ShapeCacheRegistry> {
        &self.registry
    }

    pub fn roi(&self, slot: usize) -> Option<&Arc<dyn Roi>> {
        self.rois.get(slot)
    }

    /// Slots of the ROIs whose bounds intersect `region`, in insertion order
    pub fn slots_in_region(&self, region: &Rect<f64>) -> Vec<usize> {
        let mut slots: Vec<usize> = self
            .index
            .locate_in_envelope_intersecting(&envelope_of(region))
            .map(|entry| entry.slot)
            .collect();
        slots.sort_unstable();
        slots
    }

    /// Shapes to draw for the ROIs visible in `region` at `downsample`
    pub fn shapes_in_region(&self, region: &Rect<f64>, downsample: f64) -> Vec<PaintItem> {
        let start = std::time::Instant::now();
        let slots = self.slots_in_region(region);

        let items: Vec<PaintItem> = slots
            .par_iter()
            .map(|&slot| PaintItem {
                slot,
                shape: self.registry.get_for_downsample(&self.rois[slot], downsample),
            })
            .collect();

        debug!(
            "Resolved {} shapes ({} points) at downsample {:.2} in {:?}",
            items.len(),
            items.iter().map(|item| item.shape.num_points()).sum::<usize>(),
            downsample,
            start.elapsed()
        );
        items
    }

    /// Triangles for every area visible in `region`, merged into one buffer
    pub fn tessellate_region(&self, region: &Rect<f64>, downsample: f64) -> Tessellation {
        let parts: Vec<Tessellation> = self
            .shapes_in_region(region, downsample)
            .par_iter()
            .map(|item| tessellate_shape(&item.shape))
            .collect();

        let mut combined = Tessellation::default();
        for part in parts {
            combined.append(part);
        }
        combined
    }
}
