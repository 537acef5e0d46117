//! Layout checks for finished sheets using an R*-tree.
//!
//! Every placed part occupies its spacing-inflated box. A valid sheet has
//! no two boxes overlapping (shared edges are allowed) and every box inside
//! `[0, sheet_width] x [0, used_height]`.

use rstar::{RTree, RTreeObject, AABB};
use sheetnest_core::{Aabb, NestedPart, SheetResult};

/// Tolerance for touching edges produced by float accumulation.
const LAYOUT_TOLERANCE: f64 = 1e-6;

/// A placed box in the spatial index.
#[derive(Debug, Clone)]
struct PlacedBox {
    index: usize,
    bounds: Aabb,
}

impl RTreeObject for PlacedBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.min_x, self.bounds.min_y],
            [self.bounds.max_x, self.bounds.max_y],
        )
    }
}

/// Violations found on one sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutReport {
    /// Pairs of overlapping placements (`i < j`, indices into `placed_parts`).
    pub overlaps: Vec<(usize, usize)>,
    /// Placements reaching outside the used sheet area.
    pub out_of_bounds: Vec<usize>,
}

impl LayoutReport {
    /// Returns true if no violation was found.
    pub fn is_valid(&self) -> bool {
        self.overlaps.is_empty() && self.out_of_bounds.is_empty()
    }
}

/// Returns every pair of placements whose inflated boxes overlap.
pub fn find_overlaps(parts: &[NestedPart]) -> Vec<(usize, usize)> {
    let boxes: Vec<PlacedBox> = parts
        .iter()
        .enumerate()
        .map(|(index, part)| PlacedBox {
            index,
            bounds: part.bounds(),
        })
        .collect();
    let tree = RTree::bulk_load(boxes.clone());

    let mut overlaps = Vec::new();
    for entry in &boxes {
        for other in tree.locate_in_envelope_intersecting(&entry.envelope()) {
            if other.index > entry.index
                && entry.bounds.intersects(&other.bounds, LAYOUT_TOLERANCE)
            {
                overlaps.push((entry.index, other.index));
            }
        }
    }

    overlaps.sort_unstable();
    overlaps
}

/// Checks a finished sheet for overlaps and containment.
pub fn validate_sheet(sheet: &SheetResult) -> LayoutReport {
    let used = Aabb::new(0.0, 0.0, sheet.sheet_width, sheet.used_height);
    let out_of_bounds = sheet
        .placed_parts
        .iter()
        .enumerate()
        .filter(|(_, part)| !used.contains(&part.bounds(), LAYOUT_TOLERANCE))
        .map(|(index, _)| index)
        .collect();

    LayoutReport {
        overlaps: find_overlaps(&sheet.placed_parts),
        out_of_bounds,
    }
}
