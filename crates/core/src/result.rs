//! Nesting result representation.

use crate::geometry::Aabb;
use crate::placement::{NestedPart, UnplacedPart};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome for one stock sheet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SheetResult {
    /// Sheet index (0-based) within the run.
    pub sheet_index: usize,

    /// Nominal stock width.
    pub sheet_width: f64,

    /// Nominal stock height.
    pub sheet_height: f64,

    /// Maximum x-extent consumed by placements.
    pub used_width: f64,

    /// Maximum y-extent consumed by placements.
    pub used_height: f64,

    /// Parts placed on this sheet.
    pub placed_parts: Vec<NestedPart>,

    /// Sum of true contour areas over the placed parts.
    pub total_parts_area: f64,

    /// `sheet_width * used_height`.
    pub used_sheet_area: f64,

    /// `total_parts_area / used_sheet_area` (0.0 for an empty sheet).
    pub efficiency: f64,

    /// Full-sheet purchase cost, filled by the cost pass.
    pub sheet_cost: f64,

    /// Cost attributable to the billed portion, filled by the cost pass.
    pub used_sheet_cost: f64,
}

impl SheetResult {
    /// Creates an empty sheet.
    pub fn new(sheet_index: usize, sheet_width: f64, sheet_height: f64) -> Self {
        Self {
            sheet_index,
            sheet_width,
            sheet_height,
            used_width: 0.0,
            used_height: 0.0,
            placed_parts: Vec::new(),
            total_parts_area: 0.0,
            used_sheet_area: 0.0,
            efficiency: 0.0,
            sheet_cost: 0.0,
            used_sheet_cost: 0.0,
        }
    }

    /// Creates a sheet from final placements and computes its metrics.
    pub fn from_placements(
        sheet_index: usize,
        sheet_width: f64,
        sheet_height: f64,
        placed_parts: Vec<NestedPart>,
    ) -> Self {
        let mut sheet = Self::new(sheet_index, sheet_width, sheet_height);
        sheet.placed_parts = placed_parts;
        sheet.recompute_metrics();
        sheet
    }

    /// Recomputes used extents, areas and efficiency from the placements.
    pub fn recompute_metrics(&mut self) {
        let (used_width, used_height) =
            self.placed_parts
                .iter()
                .map(NestedPart::bounds)
                .fold((0.0_f64, 0.0_f64), |(w, h), b| (w.max(b.max_x), h.max(b.max_y)));

        self.used_width = used_width.min(self.sheet_width);
        self.used_height = used_height.min(self.sheet_height);
        self.total_parts_area = self.placed_parts.iter().map(NestedPart::contour_area).sum();
        self.used_sheet_area = self.sheet_width * self.used_height;
        self.efficiency = ratio(self.total_parts_area, self.used_sheet_area);
    }

    /// Returns the nominal sheet area.
    pub fn nominal_area(&self) -> f64 {
        self.sheet_width * self.sheet_height
    }

    /// Returns the nominal sheet outline.
    pub fn outline(&self) -> Aabb {
        Aabb::new(0.0, 0.0, self.sheet_width, self.sheet_height)
    }

    /// Returns the number of parts on this sheet.
    pub fn part_count(&self) -> usize {
        self.placed_parts.len()
    }

    /// Returns true if nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.placed_parts.is_empty()
    }
}

/// Material cost breakdown for all placed copies of one source part.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartCostBreakdown {
    /// Source part name.
    pub source_name: String,
    /// Placed copies.
    pub quantity: usize,
    /// Weight of one copy (kg).
    pub unit_weight_kg: f64,
    /// Weight of all copies (kg).
    pub total_weight_kg: f64,
    /// True area of one copy (mm²).
    pub unit_contour_area: f64,
    /// True area of all copies (mm²).
    pub total_contour_area: f64,
    /// Share of the job's placed true area (0.0 - 1.0).
    pub area_share: f64,
    /// Material cost of one copy.
    pub unit_material_cost: f64,
    /// Material cost of all copies.
    pub total_material_cost: f64,
}

/// Aggregate result of a nesting run.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NestingResult {
    /// Sheets that received at least one part, in fill order.
    pub sheets: Vec<SheetResult>,

    /// Part instances that could not be placed.
    pub unplaced_parts: Vec<UnplacedPart>,

    /// Per-source cost breakdown, sorted by descending area share.
    pub cost_breakdown: Vec<PartCostBreakdown>,

    /// Sum of billed sheet costs, filled by the cost pass.
    pub total_cost: f64,

    /// Placed true area over billed sheet area, filled by the cost pass.
    pub effective_utilization: f64,

    /// Seed of the random source used for shuffled attempts.
    pub seed: Option<u64>,

    /// Packing attempts evaluated across all sheets.
    pub attempts: usize,

    /// Whether the run was stopped early.
    pub cancelled: bool,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl NestingResult {
    /// Creates a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of sheets used.
    pub fn sheets_used(&self) -> usize {
        self.sheets.len()
    }

    /// Iterates over every placed part across all sheets.
    pub fn placed_parts(&self) -> impl Iterator<Item = &NestedPart> {
        self.sheets.iter().flat_map(|s| s.placed_parts.iter())
    }

    /// Returns the number of placed part instances.
    pub fn placed_count(&self) -> usize {
        self.sheets.iter().map(SheetResult::part_count).sum()
    }

    /// Returns the number of unplaced part instances.
    pub fn unplaced_count(&self) -> usize {
        self.unplaced_parts.len()
    }

    /// Returns true if every queued instance was placed.
    pub fn all_placed(&self) -> bool {
        self.unplaced_parts.is_empty()
    }

    /// Sum of part area over sum of used sheet area across all sheets.
    pub fn total_efficiency(&self) -> f64 {
        let parts: f64 = self.sheets.iter().map(|s| s.total_parts_area).sum();
        let used: f64 = self.sheets.iter().map(|s| s.used_sheet_area).sum();
        ratio(parts, used)
    }

    /// First-sheet used width, for callers that assume a single sheet.
    pub fn used_width(&self) -> f64 {
        self.sheets.first().map_or(0.0, |s| s.used_width)
    }

    /// First-sheet used height, for callers that assume a single sheet.
    pub fn used_height(&self) -> f64 {
        self.sheets.first().map_or(0.0, |s| s.used_height)
    }

    /// First-sheet efficiency, for callers that assume a single sheet.
    pub fn efficiency(&self) -> f64 {
        self.sheets.first().map_or(0.0, |s| s.efficiency)
    }

    /// Returns summary statistics.
    pub fn summary(&self) -> NestingSummary {
        NestingSummary::from(self)
    }
}

/// Summary statistics for a nesting result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NestingSummary {
    /// Total instances queued.
    pub total_requested: usize,
    /// Instances placed.
    pub total_placed: usize,
    /// Sheets used.
    pub sheets_used: usize,
    /// Total efficiency as a percentage.
    pub efficiency_percent: f64,
    /// Total billed cost (0 before the cost pass).
    pub total_cost: f64,
    /// Computation time in milliseconds.
    pub time_ms: u64,
}

impl From<&NestingResult> for NestingSummary {
    fn from(result: &NestingResult) -> Self {
        Self {
            total_requested: result.placed_count() + result.unplaced_count(),
            total_placed: result.placed_count(),
            sheets_used: result.sheets_used(),
            efficiency_percent: result.total_efficiency() * 100.0,
            total_cost: result.total_cost,
            time_ms: result.computation_time_ms,
        }
    }
}

/// Division that yields 0.0 for a non-positive denominator.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rotation;
    use crate::part::{PartGeometry, PartRecord};
    use approx::assert_relative_eq;

    fn placed(x: f64, y: f64, sheet: usize) -> NestedPart {
        let geom = PartGeometry::new("P", 200.0, 100.0);
        let part = PartRecord::from_geometry(&geom, 0.0, 0, 0, 1).unwrap();
        NestedPart::new(part, x, y, Rotation::None, sheet)
    }

    #[test]
    fn test_result_new() {
        let result = NestingResult::new();
        assert_eq!(result.sheets_used(), 0);
        assert_eq!(result.placed_count(), 0);
        assert_eq!(result.total_efficiency(), 0.0);
        assert_eq!(result.used_height(), 0.0);
        assert!(result.all_placed());
    }

    #[test]
    fn test_sheet_metrics() {
        let sheet = SheetResult::from_placements(
            0,
            1000.0,
            1000.0,
            vec![placed(0.0, 0.0, 0), placed(200.0, 0.0, 0), placed(0.0, 100.0, 0)],
        );

        assert_relative_eq!(sheet.used_width, 400.0);
        assert_relative_eq!(sheet.used_height, 200.0);
        assert_relative_eq!(sheet.total_parts_area, 60000.0);
        assert_relative_eq!(sheet.used_sheet_area, 200000.0);
        assert_relative_eq!(sheet.efficiency, 0.3);
    }

    #[test]
    fn test_empty_sheet_has_zero_efficiency() {
        let mut sheet = SheetResult::new(0, 1000.0, 1000.0);
        sheet.recompute_metrics();
        assert_eq!(sheet.efficiency, 0.0);
        assert!(sheet.efficiency.is_finite());
    }

    #[test]
    fn test_first_sheet_projection_and_totals() {
        let mut result = NestingResult::new();
        result
            .sheets
            .push(SheetResult::from_placements(0, 1000.0, 1000.0, vec![placed(0.0, 0.0, 0)]));
        result.sheets.push(SheetResult::from_placements(
            1,
            1000.0,
            1000.0,
            vec![placed(0.0, 0.0, 1), placed(0.0, 100.0, 1)],
        ));

        assert_eq!(result.sheets_used(), 2);
        assert_eq!(result.placed_count(), 3);
        assert_eq!(result.placed_parts().count(), 3);
        assert_relative_eq!(result.used_height(), 100.0);
        assert_relative_eq!(result.efficiency(), 0.2);
        // 60000 / (100000 + 200000)
        assert_relative_eq!(result.total_efficiency(), 0.2);

        let summary = result.summary();
        assert_eq!(summary.total_placed, 3);
        assert_eq!(summary.sheets_used, 2);
        assert_relative_eq!(summary.efficiency_percent, 20.0);
    }
}
