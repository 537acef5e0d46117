//! Console and JSON output.

use anyhow::{Context, Result};
use sheetnest_core::NestingResult;
use std::fs;
use std::path::Path;

/// Prints the per-sheet table and totals.
pub fn print_summary(result: &NestingResult, costed: bool) {
    println!("\n{:=<84}", "");
    println!("NESTING RESULTS");
    println!("{:=<84}", "");
    println!(
        "{:<7} {:>7} {:>12} {:>12} {:>10} {:>14} {:>14}",
        "Sheet", "Parts", "Used W", "Used H", "Eff%", "Sheet cost", "Used cost"
    );
    println!("{:-<84}", "");

    for sheet in &result.sheets {
        println!(
            "{:<7} {:>7} {:>12.1} {:>12.1} {:>10.1} {:>14} {:>14}",
            sheet.sheet_index + 1,
            sheet.part_count(),
            sheet.used_width,
            sheet.used_height,
            sheet.efficiency * 100.0,
            money(sheet.sheet_cost, costed),
            money(sheet.used_sheet_cost, costed),
        );
    }

    println!("{:-<84}", "");
    let summary = result.summary();
    println!(
        "Placed {}/{} parts on {} sheets, efficiency {:.1}%, {} attempts in {} ms (seed {})",
        summary.total_placed,
        summary.total_requested,
        summary.sheets_used,
        summary.efficiency_percent,
        result.attempts,
        summary.time_ms,
        result
            .seed
            .map_or_else(|| "-".to_string(), |s| s.to_string()),
    );
    if costed {
        println!(
            "Total cost {:.2}, effective utilization {:.1}%",
            result.total_cost,
            result.effective_utilization * 100.0
        );
    }
    if result.cancelled {
        println!("Run was cancelled before completion");
    }
    println!("{:=<84}\n", "");
}

/// Prints unplaced parts with their reasons.
pub fn print_unplaced(result: &NestingResult) {
    if result.unplaced_parts.is_empty() {
        return;
    }

    println!("Unplaced parts:");
    for unplaced in &result.unplaced_parts {
        println!("  - {}: {}", unplaced.part.name, unplaced.reason_text());
    }
    println!();
}

/// Prints the per-part cost breakdown.
pub fn print_breakdown(result: &NestingResult) {
    if result.cost_breakdown.is_empty() {
        return;
    }

    println!(
        "{:<24} {:>5} {:>10} {:>12} {:>8} {:>12} {:>12}",
        "Part", "Qty", "Unit kg", "Unit mm²", "Share%", "Unit cost", "Total cost"
    );
    println!("{:-<89}", "");
    for row in &result.cost_breakdown {
        println!(
            "{:<24} {:>5} {:>10.3} {:>12.0} {:>8.1} {:>12.2} {:>12.2}",
            row.source_name,
            row.quantity,
            row.unit_weight_kg,
            row.unit_contour_area,
            row.area_share * 100.0,
            row.unit_material_cost,
            row.total_material_cost,
        );
    }
    println!();
}

/// Writes the full result as pretty JSON.
pub fn save_json(result: &NestingResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn money(value: f64, costed: bool) -> String {
    if costed {
        format!("{:.2}", value)
    } else {
        "-".to_string()
    }
}
