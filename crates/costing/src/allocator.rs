//! Sheet cost and its allocation to placed parts.
//!
//! Per sheet:
//!
//! 1. Parts without a known weight get one from `contour_area`.
//! 2. The billed area is `sheet_width * used_height` (cut-to-length) or the
//!    nominal area (full sheet).
//! 3. The billed area is priced by mass when `price_per_kg > 0`, otherwise
//!    as a share of the nominal sheet price.
//! 4. Each part receives `used_sheet_cost * contour_area / sheet_contour_area`,
//!    so the part costs of a sheet add up to its `used_sheet_cost`.

use crate::breakdown::build_cost_breakdown;
use crate::config::{BillingMode, CostParams};
use sheetnest_core::result::ratio;
use sheetnest_core::{NestingResult, SheetResult};

/// Mass in kilograms of a plate of `area_mm2` at `thickness_mm`.
///
/// `mass_g = area_cm2 * thickness_cm * density_g_cm3`.
pub fn mass_kg(area_mm2: f64, thickness_mm: f64, density_g_cm3: f64) -> f64 {
    let area_cm2 = area_mm2 / 100.0;
    let thickness_cm = thickness_mm / 10.0;
    area_cm2 * thickness_cm * density_g_cm3 / 1000.0
}

/// Fills the cost fields of a finished [`NestingResult`].
#[derive(Debug, Clone)]
pub struct CostAllocator {
    params: CostParams,
}

impl CostAllocator {
    /// Creates an allocator.
    pub fn new(params: CostParams) -> Self {
        Self { params }
    }

    /// Returns the pricing parameters.
    pub fn params(&self) -> &CostParams {
        &self.params
    }

    fn mass_kg(&self, area_mm2: f64) -> f64 {
        mass_kg(area_mm2, self.params.thickness_mm, self.params.density_g_cm3)
    }

    fn billed_area(&self, sheet: &SheetResult) -> f64 {
        match self.params.billing {
            BillingMode::CutToLength => sheet.used_sheet_area,
            BillingMode::FullSheet => sheet.nominal_area(),
        }
    }

    /// Computes sheet, part and job costs in place.
    ///
    /// Must run after nesting is complete. Running it again with the same
    /// parameters yields the same numbers. Parameters that fail
    /// [`CostParams::validate`] are logged and price everything at zero.
    pub fn calculate_costs(&self, result: &mut NestingResult) {
        let priced = match self.params.validate() {
            Ok(()) => true,
            Err(e) => {
                log::error!("Invalid cost parameters, costs set to zero: {}", e);
                false
            }
        };

        let mut total_cost = 0.0;
        let mut total_parts_area = 0.0;
        let mut total_billed_area = 0.0;

        for sheet in &mut result.sheets {
            self.cost_sheet(sheet, priced);
            total_cost += sheet.used_sheet_cost;
            total_parts_area += sheet.total_parts_area;
            total_billed_area += self.billed_area(sheet);
        }

        result.total_cost = total_cost;
        result.effective_utilization = ratio(total_parts_area, total_billed_area);
        result.cost_breakdown = build_cost_breakdown(result);

        log::info!(
            "Costed {} sheets: total {:.2}, utilization {:.1}%",
            result.sheets.len(),
            result.total_cost,
            result.effective_utilization * 100.0
        );
    }

    fn cost_sheet(&self, sheet: &mut SheetResult, priced: bool) {
        for placed in &mut sheet.placed_parts {
            let part = &mut placed.part;
            if priced && part.weight_kg <= 0.0 && part.contour_area > 0.0 {
                part.weight_kg = self.mass_kg(part.contour_area);
            }
        }

        sheet.recompute_metrics();

        let nominal_area = sheet.nominal_area();
        let billed_area = self.billed_area(sheet);
        if !priced {
            sheet.sheet_cost = 0.0;
            sheet.used_sheet_cost = 0.0;
        } else if self.params.is_mass_based() {
            sheet.sheet_cost = self.mass_kg(nominal_area) * self.params.price_per_kg;
            sheet.used_sheet_cost = self.mass_kg(billed_area) * self.params.price_per_kg;
        } else {
            sheet.sheet_cost = self.params.full_sheet_cost;
            sheet.used_sheet_cost =
                self.params.full_sheet_cost * ratio(billed_area, nominal_area);
        }

        let contour_total: f64 = sheet.placed_parts.iter().map(|p| p.contour_area()).sum();
        let count = sheet.placed_parts.len();
        if contour_total <= 0.0 && count > 0 {
            log::warn!(
                "Sheet {} has no contour area; splitting its cost evenly",
                sheet.sheet_index + 1
            );
        }

        let used_sheet_cost = sheet.used_sheet_cost;
        for placed in &mut sheet.placed_parts {
            placed.material_cost = if contour_total > 0.0 {
                used_sheet_cost * placed.contour_area() / contour_total
            } else {
                used_sheet_cost / count as f64
            };
        }

        log::debug!(
            "Sheet {}: billed {:.0} of {:.0} mm², cost {:.2} of {:.2}",
            sheet.sheet_index + 1,
            billed_area,
            nominal_area,
            sheet.used_sheet_cost,
            sheet.sheet_cost
        );
    }
}

/// Runs the cost pass once with `params`.
pub fn calculate_costs(result: &mut NestingResult, params: &CostParams) {
    CostAllocator::new(params.clone()).calculate_costs(result);
}
