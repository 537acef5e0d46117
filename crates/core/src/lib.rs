//! # sheetnest core
//!
//! Shared data model for the sheetnest laser-cutting nesting engine.
//!
//! This crate holds the types that flow between part ingestion, the packing
//! engine and the cost pass:
//!
//! - **Ingestion**: [`PartGeometry`] (as delivered by CAD parsers) and the
//!   validated, spacing-inflated [`PartRecord`]
//! - **Placement**: [`NestedPart`], [`UnplacedPart`] and [`UnplacedReason`]
//! - **Results**: [`SheetResult`], [`NestingResult`], [`PartCostBreakdown`]
//! - **Configuration**: [`NestingConfig`], [`SearchMode`], [`ProgressInfo`]
//! - **Geometry**: the 90 degree contour transform and polygon helpers
//!
//! ## Configuration
//!
//! ```rust
//! use sheetnest_core::NestingConfig;
//!
//! let config = NestingConfig::new()
//!     .with_sheet(3000.0, 1500.0)
//!     .with_spacing(5.0)
//!     .with_margin(10.0)
//!     .with_seed(42);
//!
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Units
//!
//! Lengths are millimeters, areas mm², masses kilograms. Costs are in
//! whatever currency the caller's rates use.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod geometry;
pub mod part;
pub mod placement;
pub mod result;
pub mod solver;

// Re-exports
pub use error::{Error, Result};
pub use geometry::{Aabb, Point, Rotation};
pub use part::{PartGeometry, PartRecord};
pub use placement::{NestedPart, UnplacedPart, UnplacedReason};
pub use result::{NestingResult, NestingSummary, PartCostBreakdown, SheetResult};
pub use solver::{NestingConfig, ProgressCallback, ProgressInfo, SearchMode};
