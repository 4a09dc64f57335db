//! Scores a placement result. Lower is better.
//!
//! Every used sheet contributes its full area, so solutions using fewer
//! sheets always beat solutions using more; the remaining terms reward
//! tight placement on the sheets that are used. Unplaced parts carry a
//! penalty large enough to dominate any achievable geometric score.

use crate::entities::{FitnessBreakdown, SheetLayout};

/// Penalty per part that found no sheet.
pub const UNPLACED_PENALTY: f64 = 1.0e8;

const BOUNDS_WEIGHT: f64 = 0.71;
const WASTE_WEIGHT: f64 = 0.94;
const UTILIZATION_WEIGHT: f64 = 0.78;

pub fn evaluate(layouts: &[SheetLayout], unplaced_count: usize) -> FitnessBreakdown {
    let mut f = FitnessBreakdown {
        unplaced: unplaced_count as f64 * UNPLACED_PENALTY,
        ..FitnessBreakdown::default()
    };
    for layout in layouts {
        if layout.sheet_area <= 0.0 {
            continue;
        }
        let covered = (layout.parts_area / layout.sheet_area).clamp(0.0, 1.0);
        f.sheets += layout.sheet_area;
        f.bounds += BOUNDS_WEIGHT * layout.bounds_area();
        f.wasted += WASTE_WEIGHT * (layout.sheet_area - layout.parts_area).max(0.0);
        f.utilization += UTILIZATION_WEIGHT * (1.0 - covered) * layout.sheet_area;
    }
    f.total = f.unplaced + f.sheets + f.bounds + f.wasted + f.utilization;
    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlacementStrategy;
    use crate::geometry::primitives::Rect;

    fn layout(sheet_area: f64, parts_area: f64, bounds: Rect) -> SheetLayout {
        SheetLayout {
            sheet_id: 0,
            sheet_source: 0,
            sheet_area,
            strategy: PlacementStrategy::BoundingBox,
            placements: vec![],
            parts_area,
            bounds,
            hull_points: vec![],
            merged_length: 0.0,
        }
    }

    #[test]
    fn splitting_parts_over_more_sheets_scores_worse() {
        let one = vec![layout(400.0, 242.0, Rect::new(0.0, 0.0, 20.0, 11.0))];
        let two = vec![
            layout(400.0, 121.0, Rect::new(0.0, 0.0, 11.0, 11.0)),
            layout(400.0, 121.0, Rect::new(0.0, 0.0, 11.0, 11.0)),
        ];
        assert!(evaluate(&two, 0).total > evaluate(&one, 0).total);
    }

    #[test]
    fn unplaced_dominates_everything() {
        let perfect = vec![layout(400.0, 400.0, Rect::new(0.0, 0.0, 20.0, 20.0))];
        let sloppy = vec![layout(400.0, 10.0, Rect::new(0.0, 0.0, 20.0, 20.0))];
        assert!(evaluate(&perfect, 1).total > evaluate(&sloppy, 0).total);
    }

    #[test]
    fn tighter_bounds_score_better_on_the_same_sheet() {
        let tight = vec![layout(400.0, 121.0, Rect::new(0.0, 0.0, 11.0, 11.0))];
        let loose = vec![layout(400.0, 121.0, Rect::new(0.0, 0.0, 20.0, 11.0))];
        assert!(evaluate(&tight, 0).total < evaluate(&loose, 0).total);
    }

    #[test]
    fn breakdown_terms_sum_to_the_total() {
        let f = evaluate(
            &[layout(400.0, 121.0, Rect::new(0.0, 0.0, 11.0, 11.0))],
            2,
        );
        let sum = f.unplaced + f.sheets + f.bounds + f.wasted + f.utilization;
        assert_eq!(f.total, sum);
        assert_eq!(f.unplaced, 2.0 * UNPLACED_PENALTY);
    }
}
