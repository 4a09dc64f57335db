use crate::config::PlacementStrategy;
use crate::geometry::convex_hull::convex_hull_area;
use crate::geometry::primitives::{Point, Rect};

/// Final position of one part on a sheet. `x`/`y` translate the part's
/// rotated outline; `rotation` is the angle that was applied to it.
#[derive(Clone, Debug, PartialEq)]
pub struct PartPlacement {
    pub id: usize,
    pub source: usize,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
}

/// Everything placed on one sheet, with the per-sheet aggregates the
/// fitness evaluator consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetLayout {
    pub sheet_id: usize,
    pub sheet_source: usize,
    pub sheet_area: f64,
    pub strategy: PlacementStrategy,
    pub placements: Vec<PartPlacement>,
    /// Sum of the net areas of the placed parts.
    pub parts_area: f64,
    /// Bounding rect over all placed part outlines.
    pub bounds: Rect,
    /// All translated part vertices; hull area is derived from these when
    /// the strategy is Squeeze.
    pub hull_points: Vec<Point>,
    pub merged_length: f64,
}

impl SheetLayout {
    /// Area the placed parts span: the convex hull for Squeeze, the
    /// bounding rect otherwise.
    pub fn bounds_area(&self) -> f64 {
        match self.strategy {
            PlacementStrategy::Squeeze => convex_hull_area(self.hull_points.clone()),
            _ => self.bounds.area(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(strategy: PlacementStrategy) -> SheetLayout {
        SheetLayout {
            sheet_id: 0,
            sheet_source: 0,
            sheet_area: 400.0,
            strategy,
            placements: vec![],
            parts_area: 0.0,
            bounds: Rect::new(0.0, 0.0, 6.0, 4.0),
            hull_points: vec![
                Point(0.0, 0.0),
                Point(6.0, 0.0),
                Point(0.0, 4.0),
            ],
            merged_length: 0.0,
        }
    }

    #[test]
    fn bounds_area_follows_the_strategy() {
        assert_eq!(layout(PlacementStrategy::Gravity).bounds_area(), 24.0);
        assert_eq!(layout(PlacementStrategy::BoundingBox).bounds_area(), 24.0);
        // hull of the triangle is half the box
        assert_eq!(layout(PlacementStrategy::Squeeze).bounds_area(), 12.0);
    }
}
