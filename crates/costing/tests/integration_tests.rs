//! Integration tests for sheetnest-costing.

use approx::assert_relative_eq;
use sheetnest_core::{NestedPart, NestingResult, PartGeometry, PartRecord, Rotation, SheetResult};
use sheetnest_costing::{
    calculate_costs, BillingMode, CostAllocator, CostParams, MaterialRate, RateTable,
};
use sheetnest_nesting::{NestingConfig, SearchMode, SheetNester};

fn nested_job(mode: SearchMode) -> NestingResult {
    let config = NestingConfig::new()
        .with_sheet(1500.0, 1000.0)
        .with_spacing(4.0)
        .with_seed(11);
    let mut nester = SheetNester::new(config).unwrap();

    let flange = PartGeometry::new("flange", 300.0, 300.0)
        .with_contour(vec![(0.0, 0.0), (300.0, 0.0), (300.0, 300.0), (0.0, 300.0)])
        .with_hole(vec![(100.0, 100.0), (200.0, 100.0), (200.0, 200.0), (100.0, 200.0)]);
    nester.add_part(&flange, 9).unwrap();
    nester
        .add_part(&PartGeometry::new("strip", 700.0, 80.0).with_weight(2.2), 14)
        .unwrap();
    nester
        .add_part(&PartGeometry::new("gusset", 150.0, 150.0).with_contour_area(11250.0), 20)
        .unwrap();

    nester.run_nesting(mode, None)
}

mod allocation_tests {
    use super::*;

    #[test]
    fn test_half_used_sheet_area_pricing() {
        let geom = PartGeometry::new("panel", 400.0, 500.0);
        let parts: Vec<NestedPart> = [0.0, 400.0]
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let part = PartRecord::from_geometry(&geom, 0.0, i, i, 2).unwrap();
                NestedPart::new(part, x, 0.0, Rotation::None, 0)
            })
            .collect();
        let mut result = NestingResult {
            sheets: vec![SheetResult::from_placements(0, 1000.0, 1000.0, parts)],
            ..Default::default()
        };

        let params = CostParams::new().with_sheet_cost(100.0);
        calculate_costs(&mut result, &params);

        let sheet = &result.sheets[0];
        assert_relative_eq!(sheet.used_height, 500.0);
        assert_relative_eq!(sheet.sheet_cost, 100.0);
        assert_relative_eq!(sheet.used_sheet_cost, 50.0);
        for part in &sheet.placed_parts {
            assert_relative_eq!(part.material_cost, 25.0);
        }
        assert_relative_eq!(result.total_cost, 50.0);
        assert_relative_eq!(result.effective_utilization, 0.8);

        assert_eq!(result.cost_breakdown.len(), 1);
        assert_eq!(result.cost_breakdown[0].quantity, 2);
        assert_relative_eq!(result.cost_breakdown[0].total_material_cost, 50.0);
    }

    #[test]
    fn test_cost_conserved_per_sheet() {
        for mode in [SearchMode::Fast, SearchMode::Deep] {
            let mut result = nested_job(mode);
            assert!(result.sheets_used() >= 1);

            calculate_costs(&mut result, &CostParams::new().with_sheet_cost(480.0));

            for sheet in &result.sheets {
                let allocated: f64 = sheet.placed_parts.iter().map(|p| p.material_cost).sum();
                assert_relative_eq!(allocated, sheet.used_sheet_cost, max_relative = 1e-6);
                assert!(sheet.used_sheet_cost <= sheet.sheet_cost + 1e-9);
            }

            let sheet_total: f64 = result.sheets.iter().map(|s| s.used_sheet_cost).sum();
            assert_relative_eq!(result.total_cost, sheet_total);

            let breakdown_total: f64 = result
                .cost_breakdown
                .iter()
                .map(|r| r.total_material_cost)
                .sum();
            assert_relative_eq!(breakdown_total, result.total_cost, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_breakdown_sorted_and_complete() {
        let mut result = nested_job(SearchMode::Fast);
        calculate_costs(&mut result, &CostParams::new().with_sheet_cost(480.0));

        let rows = &result.cost_breakdown;
        assert!(rows.windows(2).all(|w| w[0].area_share >= w[1].area_share));

        let quantity: usize = rows.iter().map(|r| r.quantity).sum();
        assert_eq!(quantity, result.placed_count());

        let flange = rows.iter().find(|r| r.source_name == "flange").unwrap();
        assert_relative_eq!(flange.unit_contour_area, 80000.0, max_relative = 1e-9);

        let strip = rows.iter().find(|r| r.source_name == "strip").unwrap();
        assert_relative_eq!(strip.unit_weight_kg, 2.2);
    }

    #[test]
    fn test_rerun_is_stable() {
        let mut result = nested_job(SearchMode::Fast);
        let allocator = CostAllocator::new(
            CostParams::new()
                .with_price_per_kg(3.1)
                .with_thickness(3.0),
        );

        allocator.calculate_costs(&mut result);
        let first = result.total_cost;
        allocator.calculate_costs(&mut result);

        assert!(first > 0.0);
        assert_relative_eq!(result.total_cost, first);
    }

    #[test]
    fn test_full_sheet_billing_costs_more() {
        let base = nested_job(SearchMode::Fast);

        let mut cut = base.clone();
        calculate_costs(&mut cut, &CostParams::new().with_sheet_cost(480.0));

        let mut full = base;
        calculate_costs(
            &mut full,
            &CostParams::new()
                .with_sheet_cost(480.0)
                .with_billing(BillingMode::FullSheet),
        );

        assert_relative_eq!(full.total_cost, 480.0 * full.sheets_used() as f64);
        assert!(full.total_cost >= cut.total_cost);
        assert!(full.effective_utilization <= cut.effective_utilization + 1e-12);
    }
}

mod rate_tests {
    use super::*;

    #[test]
    fn test_costing_from_rate_table() {
        let table = RateTable::new()
            .with_rate("S235", 3.0, MaterialRate::new(0.0, 4.5, 7.85))
            .with_rate("AW-5754", 3.0, MaterialRate::new(900.0, 0.0, 2.66));

        let steel = CostParams::from_rates(&table, "S235", 3.0).unwrap();
        assert!(steel.is_mass_based());

        let mut result = nested_job(SearchMode::Fast);
        calculate_costs(&mut result, &steel);

        for sheet in &result.sheets {
            // 7.85 g/cm³ * 0.3 cm * area_cm2 / 1000 * 4.5
            let expected = sheet.used_sheet_area / 100.0 * 0.3 * 7.85 / 1000.0 * 4.5;
            assert_relative_eq!(sheet.used_sheet_cost, expected, max_relative = 1e-9);
        }

        assert!(CostParams::from_rates(&table, "S355", 3.0).is_err());
    }
}
