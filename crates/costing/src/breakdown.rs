//! Per-part cost breakdown for quote review.

use sheetnest_core::result::ratio;
use sheetnest_core::{NestingResult, PartCostBreakdown};
use std::collections::BTreeMap;

#[derive(Default)]
struct GroupTotals {
    quantity: usize,
    weight_kg: f64,
    contour_area: f64,
    material_cost: f64,
}

/// Groups placed parts by source name.
///
/// Rows are sorted by descending share of the job's placed contour area;
/// equal shares keep alphabetical order.
pub fn build_cost_breakdown(result: &NestingResult) -> Vec<PartCostBreakdown> {
    let mut groups: BTreeMap<&str, GroupTotals> = BTreeMap::new();
    for placed in result.placed_parts() {
        let totals = groups.entry(placed.source_name()).or_default();
        totals.quantity += 1;
        totals.weight_kg += placed.part.weight_kg;
        totals.contour_area += placed.contour_area();
        totals.material_cost += placed.material_cost;
    }

    let job_area: f64 = groups.values().map(|g| g.contour_area).sum();

    let mut rows: Vec<PartCostBreakdown> = groups
        .into_iter()
        .map(|(name, totals)| {
            let quantity = totals.quantity as f64;
            PartCostBreakdown {
                source_name: name.to_string(),
                quantity: totals.quantity,
                unit_weight_kg: ratio(totals.weight_kg, quantity),
                total_weight_kg: totals.weight_kg,
                unit_contour_area: ratio(totals.contour_area, quantity),
                total_contour_area: totals.contour_area,
                area_share: ratio(totals.contour_area, job_area),
                unit_material_cost: ratio(totals.material_cost, quantity),
                total_material_cost: totals.material_cost,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.area_share.total_cmp(&a.area_share));
    rows
}
