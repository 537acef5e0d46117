//! # sheetnest nesting
//!
//! Multi-sheet nesting of laser-cut parts onto rectangular stock.
//!
//! Parts are packed by their spacing-inflated bounding boxes; the true
//! contours ride along and are recovered in sheet coordinates through
//! [`NestedPart::placed_contour`](sheetnest_core::NestedPart::placed_contour).
//!
//! ## Features
//!
//! - MaxRects packing with four placement heuristics and seven sort keys
//! - Fast (interactive) and deep (quote) search per sheet
//! - Seedable, reproducible shuffles; parallel attempt evaluation with rayon
//! - Cooperative cancellation and per-sheet progress callbacks
//! - R*-tree layout validation of every finished sheet
//!
//! ## Quick Start
//!
//! ```rust
//! use sheetnest_nesting::{NestingConfig, PartGeometry, SearchMode, SheetNester};
//!
//! let config = NestingConfig::new()
//!     .with_sheet(1000.0, 1000.0)
//!     .with_spacing(5.0)
//!     .with_seed(42);
//!
//! let mut nester = SheetNester::new(config).unwrap();
//! nester.add_part(&PartGeometry::new("bracket", 200.0, 100.0), 3).unwrap();
//!
//! let result = nester.run_nesting(SearchMode::Fast, None);
//! assert_eq!(result.sheets_used(), 1);
//! assert_eq!(result.placed_count(), 3);
//! ```

pub mod layout;
pub mod nester;
pub mod optimizer;
pub mod packer;

// Re-exports
pub use layout::{find_overlaps, validate_sheet, LayoutReport};
pub use nester::{SheetNester, StopHandle};
pub use optimizer::{SheetSearch, SingleSheetOptimizer};
pub use packer::{PackAttempt, PackedItem, PackingAlgorithm, SheetPacker, SortKey};
pub use sheetnest_core::{
    Error, NestedPart, NestingConfig, NestingResult, PartGeometry, PartRecord, ProgressCallback,
    ProgressInfo, Result, SearchMode, SheetResult, UnplacedPart, UnplacedReason,
};
