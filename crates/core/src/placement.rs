//! Placed and unplaced part instances.

use crate::geometry::{self, Aabb, Point, Rotation};
use crate::part::PartRecord;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A part instance after packing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NestedPart {
    /// The packed record.
    pub part: PartRecord,

    /// Sheet-local x of the bounding box (origin bottom-left).
    pub x: f64,

    /// Sheet-local y of the bounding box.
    pub y: f64,

    /// Axis-aligned orientation.
    pub rotation: Rotation,

    /// Un-inflated width, needed to reconstruct the rotated contour.
    pub orig_width: f64,

    /// Un-inflated height.
    pub orig_height: f64,

    /// Material cost share, filled by the cost pass.
    pub material_cost: f64,

    /// Sheet (0-based) this instance landed on.
    pub sheet_index: usize,
}

impl NestedPart {
    /// Creates a placement of `part` at `(x, y)` on sheet `sheet_index`.
    pub fn new(part: PartRecord, x: f64, y: f64, rotation: Rotation, sheet_index: usize) -> Self {
        let orig_width = part.true_width;
        let orig_height = part.true_height;
        Self {
            part,
            x,
            y,
            rotation,
            orig_width,
            orig_height,
            material_cost: 0.0,
            sheet_index,
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.part.name
    }

    /// Returns the grouping name used by the cost breakdown.
    pub fn source_name(&self) -> &str {
        &self.part.source_name
    }

    /// Returns the true polygon area.
    pub fn contour_area(&self) -> f64 {
        self.part.contour_area
    }

    /// Returns the spacing-inflated width as placed.
    pub fn placed_width(&self) -> f64 {
        match self.rotation {
            Rotation::None => self.part.width,
            Rotation::Quarter => self.part.height,
        }
    }

    /// Returns the spacing-inflated height as placed.
    pub fn placed_height(&self) -> f64 {
        match self.rotation {
            Rotation::None => self.part.height,
            Rotation::Quarter => self.part.width,
        }
    }

    /// Returns the spacing-inflated box occupied on the sheet.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_origin_size(self.x, self.y, self.placed_width(), self.placed_height())
    }

    /// Returns the true (un-inflated) box occupied on the sheet.
    pub fn true_bounds(&self) -> Aabb {
        let (w, h) = match self.rotation {
            Rotation::None => (self.orig_width, self.orig_height),
            Rotation::Quarter => (self.orig_height, self.orig_width),
        };
        Aabb::from_origin_size(self.x, self.y, w, h)
    }

    /// Returns the outer contour in sheet coordinates.
    pub fn placed_contour(&self) -> Vec<Point> {
        geometry::place_points(
            &self.part.contour,
            self.rotation,
            self.orig_width,
            self.x,
            self.y,
        )
    }

    /// Returns the inner cutouts in sheet coordinates.
    pub fn placed_holes(&self) -> Vec<Vec<Point>> {
        self.part
            .holes
            .iter()
            .map(|hole| {
                geometry::place_points(hole, self.rotation, self.orig_width, self.x, self.y)
            })
            .collect()
    }
}

/// Why a part instance ended up unplaced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnplacedReason {
    /// The inflated part exceeds the usable sheet in every allowed orientation.
    TooLarge {
        /// Inflated part width.
        part_width: f64,
        /// Inflated part height.
        part_height: f64,
        /// Usable sheet width.
        sheet_width: f64,
        /// Usable sheet height.
        sheet_height: f64,
    },
    /// The part fits a sheet, but the run stopped before it could be placed.
    NoRoom {
        /// Sheets filled when the run stopped.
        sheets_used: usize,
    },
    /// The run was stopped through the cancellation flag.
    Cancelled,
}

impl fmt::Display for UnplacedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge {
                part_width,
                part_height,
                sheet_width,
                sheet_height,
            } => write!(
                f,
                "too large for any sheet orientation: {:.1} x {:.1} mm on a {:.1} x {:.1} mm sheet",
                part_width, part_height, sheet_width, sheet_height
            ),
            Self::NoRoom { sheets_used } => {
                write!(f, "no room left after all sheets ({} used)", sheets_used)
            }
            Self::Cancelled => write!(f, "nesting cancelled before placement"),
        }
    }
}

/// A part instance that could not be placed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnplacedPart {
    /// The unplaced record.
    pub part: PartRecord,
    /// Why it was not placed.
    pub reason: UnplacedReason,
}

impl UnplacedPart {
    /// Creates a new unplaced entry.
    pub fn new(part: PartRecord, reason: UnplacedReason) -> Self {
        Self { part, reason }
    }

    /// Returns true if the part needs a different sheet size.
    pub fn is_size_mismatch(&self) -> bool {
        matches!(self.reason, UnplacedReason::TooLarge { .. })
    }

    /// Returns the human-readable reason.
    pub fn reason_text(&self) -> String {
        self.reason.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::PartGeometry;

    fn l_part() -> PartRecord {
        let geom = PartGeometry::new("L", 40.0, 30.0)
            .with_contour(vec![
                (0.0, 0.0),
                (40.0, 0.0),
                (40.0, 10.0),
                (10.0, 10.0),
                (10.0, 30.0),
                (0.0, 30.0),
            ])
            .with_hole(vec![(2.0, 2.0), (6.0, 2.0), (6.0, 6.0)]);
        PartRecord::from_geometry(&geom, 4.0, 0, 0, 1).unwrap()
    }

    #[test]
    fn test_unrotated_placement() {
        let placed = NestedPart::new(l_part(), 100.0, 50.0, Rotation::None, 0);

        assert_eq!(placed.placed_width(), 44.0);
        assert_eq!(placed.placed_height(), 34.0);
        assert_eq!(placed.placed_contour()[1], (140.0, 50.0));
        assert_eq!(placed.placed_holes()[0][0], (102.0, 52.0));
    }

    #[test]
    fn test_rotated_placement_uses_quarter_transform() {
        let placed = NestedPart::new(l_part(), 100.0, 50.0, Rotation::Quarter, 1);

        assert_eq!(placed.placed_width(), 34.0);
        assert_eq!(placed.placed_height(), 44.0);
        // (40, 0) -> (x + 0, y + (40 - 40))
        assert_eq!(placed.placed_contour()[1], (100.0, 50.0));
        // (0, 30) -> (x + 30, y + 40)
        assert_eq!(placed.placed_contour()[5], (130.0, 90.0));
        assert_eq!(placed.placed_holes()[0][0], (102.0, 88.0));

        let bounds = Aabb::from_points(&placed.placed_contour()).unwrap();
        let true_bounds = placed.true_bounds();
        assert_eq!(bounds, true_bounds);
        assert!(placed.bounds().contains(&true_bounds, 1e-9));
    }

    #[test]
    fn test_unplaced_reason_text() {
        let too_large = UnplacedPart::new(
            l_part(),
            UnplacedReason::TooLarge {
                part_width: 2005.0,
                part_height: 2005.0,
                sheet_width: 1000.0,
                sheet_height: 1000.0,
            },
        );
        assert!(too_large.is_size_mismatch());
        assert!(too_large.reason_text().contains("too large"));
        assert!(too_large.reason_text().contains("2005.0"));

        let no_room = UnplacedPart::new(l_part(), UnplacedReason::NoRoom { sheets_used: 100 });
        assert!(!no_room.is_size_mismatch());
        assert!(no_room.reason_text().contains("no room"));
    }
}
