use crate::entities::SheetLayout;

/// Per-term decomposition of a layout's fitness. Lower is better; the terms
/// keep a strict priority: unplaced parts dominate everything, then sheet
/// count, then how tightly the placed parts sit.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FitnessBreakdown {
    /// Penalty for every part that could not be placed.
    pub unplaced: f64,
    /// Sum of the areas of all sheets that received at least one part.
    pub sheets: f64,
    /// Weighted area spanned by the placed parts (rect, or hull for Squeeze).
    pub bounds: f64,
    /// Weighted sheet area not covered by parts.
    pub wasted: f64,
    /// Weighted penalty on the uncovered fraction of each used sheet.
    pub utilization: f64,
    pub total: f64,
}

/// One complete evaluated layout: the placements per sheet, the parts that
/// found no home, and the score.
#[derive(Clone, Debug, PartialEq)]
pub struct NestResult {
    pub layouts: Vec<SheetLayout>,
    /// Ids of the part instances that fit on no sheet at any rotation.
    pub unplaced: Vec<usize>,
    /// Total coincident-edge length between touching placed parts.
    pub merged_length: f64,
    pub fitness: FitnessBreakdown,
}

impl NestResult {
    pub fn placed_count(&self) -> usize {
        self.layouts.iter().map(|l| l.placements.len()).sum()
    }

    /// Parts area over used sheet area, as a ratio in [0, 1].
    pub fn material_utilization(&self) -> f64 {
        let sheet_area: f64 = self.layouts.iter().map(|l| l.sheet_area).sum();
        if sheet_area == 0.0 {
            return 0.0;
        }
        let parts_area: f64 = self.layouts.iter().map(|l| l.parts_area).sum();
        parts_area / sheet_area
    }
}
