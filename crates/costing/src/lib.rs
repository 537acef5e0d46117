//! # sheetnest costing
//!
//! Material cost allocation for nested sheets.
//!
//! Runs after nesting and fills the cost fields of a
//! [`NestingResult`](sheetnest_core::NestingResult) in place: sheet and
//! billed-portion costs, per-part material costs, missing part weights, job
//! totals and a per-part breakdown. Rates come from an injected
//! [`RateProvider`].
//!
//! ## Example
//!
//! ```rust
//! use sheetnest_costing::{calculate_costs, CostParams};
//! use sheetnest_core::NestingResult;
//!
//! let mut result = NestingResult::new();
//! let params = CostParams::new().with_sheet_cost(250.0).with_thickness(2.0);
//! calculate_costs(&mut result, &params);
//! assert_eq!(result.total_cost, 0.0);
//! ```

pub mod allocator;
pub mod breakdown;
pub mod config;
pub mod rates;

// Re-exports
pub use allocator::{calculate_costs, mass_kg, CostAllocator};
pub use breakdown::build_cost_breakdown;
pub use config::{BillingMode, CostParams, STEEL_DENSITY};
pub use rates::{MaterialRate, RateProvider, RateTable};
