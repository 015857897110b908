// Viewport queries through the overlay painter
use geo::Rect;
use roi_overlay::{OverlayPainter, PolygonRoi, PolylineRoi, Roi, ShapeCacheRegistry};
use std::sync::Arc;

fn slide_rois() -> Vec<Arc<dyn Roi>> {
    let mut rois: Vec<Arc<dyn Roi>> = Vec::new();
    // A 3x3 grid of large tissue outlines
    for row in 0..3 {
        for col in 0..3 {
            let cx = 20_000.0 * col as f64 + 10_000.0;
            let cy = 20_000.0 * row as f64 + 10_000.0;
            rois.push(Arc::new(PolygonRoi::ellipse(cx, cy, 8_000.0, 6_000.0, 20_000)));
        }
    }
    rois.push(Arc::new(PolylineRoi::new(vec![(0.0, 0.0), (60_000.0, 60_000.0)])));
    rois
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoomed_out_view_is_simplified() {
        let registry = Arc::new(ShapeCacheRegistry::new());
        let painter = OverlayPainter::with_rois(Arc::clone(&registry), slide_rois());
        let whole_slide = Rect::new((0.0, 0.0), (60_000.0, 60_000.0));

        let detailed = painter.shapes_in_region(&whole_slide, 1.0);
        let overview = painter.shapes_in_region(&whole_slide, 64.0);
        assert_eq!(detailed.len(), 10);
        assert_eq!(overview.len(), 10);

        let detailed_points: usize = detailed.iter().map(|item| item.shape.num_points()).sum();
        let overview_points: usize = overview.iter().map(|item| item.shape.num_points()).sum();
        println!("detailed: {} points, overview: {} points", detailed_points, overview_points);
        assert!(overview_points < detailed_points);

        // The diagonal line keeps both of its points
        let line = overview.iter().find(|item| item.slot == 9).unwrap();
        assert_eq!(line.shape.num_points(), 2);
    }

    #[test]
    fn test_region_limits_the_work() {
        let registry = Arc::new(ShapeCacheRegistry::new());
        let painter = OverlayPainter::with_rois(Arc::clone(&registry), slide_rois());

        // Top-left tissue outline only (plus the diagonal line)
        let region = Rect::new((0.0, 0.0), (15_000.0, 15_000.0));
        let items = painter.shapes_in_region(&region, 32.0);
        let slots: Vec<usize> = items.iter().map(|item| item.slot).collect();
        assert_eq!(slots, vec![0, 9]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_tessellated_overview() {
        let registry = Arc::new(ShapeCacheRegistry::new());
        let painter = OverlayPainter::with_rois(registry, slide_rois());
        let region = Rect::new((0.0, 0.0), (60_000.0, 60_000.0));

        let tess = painter.tessellate_region(&region, 128.0);
        assert!(tess.triangle_count() > 0);
        assert!(tess
            .indices
            .iter()
            .all(|&i| (i as usize) < tess.vertex_count()));
    }
}
