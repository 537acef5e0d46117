//! Part ingestion: loosely-specified CAD geometry in, strict [`PartRecord`] out.

use crate::geometry::{self, Aabb, Point, EPSILON};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Part geometry as produced by the external DXF/STEP parsers.
///
/// Only `name`, `width` and `height` are required. A missing contour is
/// treated as a plain rectangle and a missing area is derived from the
/// contour.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartGeometry {
    /// Display name of the part.
    pub name: String,
    /// True bounding-box width in millimeters.
    pub width: f64,
    /// True bounding-box height in millimeters.
    pub height: f64,
    /// True polygon area in mm², if already known.
    pub contour_area: Option<f64>,
    /// Part weight in kilograms, if already known.
    pub weight_kg: Option<f64>,
    /// Outer contour; any frame, normalized on ingestion.
    pub contour: Vec<Point>,
    /// Inner cutouts, in the same frame as `contour`.
    pub holes: Vec<Vec<Point>>,
}

impl PartGeometry {
    /// Creates a rectangular part with the given true dimensions.
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            ..Default::default()
        }
    }

    /// Sets the outer contour.
    pub fn with_contour(mut self, contour: Vec<Point>) -> Self {
        self.contour = contour;
        self
    }

    /// Adds an inner cutout.
    pub fn with_hole(mut self, hole: Vec<Point>) -> Self {
        self.holes.push(hole);
        self
    }

    /// Sets the known true area in mm².
    pub fn with_contour_area(mut self, area: f64) -> Self {
        self.contour_area = Some(area);
        self
    }

    /// Sets the known weight in kilograms.
    pub fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    /// Validates the geometry and returns an error if it cannot be nested.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(Error::InvalidGeometry(format!(
                "Part '{}' must have positive dimensions, got {} x {}",
                self.name, self.width, self.height
            )));
        }

        if !self.contour.is_empty() && self.contour.len() < 3 {
            return Err(Error::InvalidGeometry(format!(
                "Contour of '{}' must have at least 3 vertices",
                self.name
            )));
        }

        if let Some(aabb) = Aabb::from_points(&self.contour) {
            let tolerance = 1e-6 * self.width.max(self.height).max(1.0);
            if !(aabb.width() <= self.width + tolerance && aabb.height() <= self.height + tolerance)
            {
                return Err(Error::InvalidGeometry(format!(
                    "Contour of '{}' ({:.3} x {:.3}) exceeds declared size {:.3} x {:.3}",
                    self.name,
                    aabb.width(),
                    aabb.height(),
                    self.width,
                    self.height
                )));
            }
        }

        if let Some(area) = self.contour_area {
            if !area.is_finite() || area < 0.0 {
                return Err(Error::InvalidGeometry(format!(
                    "Part '{}' has invalid contour area {}",
                    self.name, area
                )));
            }
        }

        if let Some(weight) = self.weight_kg {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidGeometry(format!(
                    "Part '{}' has invalid weight {}",
                    self.name, weight
                )));
            }
        }

        Ok(())
    }
}

/// One physical part instance queued for nesting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartRecord {
    /// Display name, unique per copy when the quantity is above one.
    pub name: String,
    /// Name of the originating part before per-copy indexing.
    pub source_name: String,
    /// Position of this instance in the ingestion order.
    pub part_index: usize,
    /// Spacing-inflated width fed to the packer.
    pub width: f64,
    /// Spacing-inflated height fed to the packer.
    pub height: f64,
    /// Un-inflated bounding-box width.
    pub true_width: f64,
    /// Un-inflated bounding-box height.
    pub true_height: f64,
    /// Outer contour in the local frame (min corner at the origin).
    pub contour: Vec<Point>,
    /// Inner cutouts in the local frame.
    pub holes: Vec<Vec<Point>>,
    /// Packing area: inflated width times inflated height.
    pub area: f64,
    /// True polygon area, used for cost allocation.
    pub contour_area: f64,
    /// Weight in kilograms, zero when unknown.
    pub weight_kg: f64,
}

impl PartRecord {
    /// Builds a record for one copy of `geometry`.
    ///
    /// `copy` and `quantity` only affect the display name.
    pub fn from_geometry(
        geometry: &PartGeometry,
        spacing: f64,
        part_index: usize,
        copy: usize,
        quantity: usize,
    ) -> Result<Self> {
        geometry.validate()?;

        let (contour, holes) = if geometry.contour.is_empty() {
            (geometry::rectangle(geometry.width, geometry.height), Vec::new())
        } else {
            geometry::normalize(&geometry.contour, &geometry.holes)
        };

        let bbox_area = geometry.width * geometry.height;
        let resolved_area = match geometry.contour_area {
            Some(area) if area > 0.0 => area,
            _ if !geometry.contour.is_empty() => geometry::polygon_area(&contour, &holes),
            _ => bbox_area,
        };
        let contour_area = if resolved_area > bbox_area {
            log::warn!(
                "Contour area {:.3} of '{}' exceeds its bounding box {:.3}; clamping",
                resolved_area,
                geometry.name,
                bbox_area
            );
            bbox_area
        } else {
            resolved_area
        };

        let width = geometry.width + spacing;
        let height = geometry.height + spacing;
        let name = if quantity > 1 {
            format!("{}#{}", geometry.name, copy + 1)
        } else {
            geometry.name.clone()
        };

        Ok(Self {
            name,
            source_name: geometry.name.clone(),
            part_index,
            width,
            height,
            true_width: geometry.width,
            true_height: geometry.height,
            contour,
            holes,
            area: width * height,
            contour_area,
            weight_kg: geometry.weight_kg.unwrap_or(0.0),
        })
    }

    /// Returns the inflated perimeter used by the perimeter sort key.
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width + self.height)
    }

    /// Returns true if the inflated box fits a `bin_width` x `bin_height` bin
    /// in at least one allowed orientation.
    pub fn fits_within(&self, bin_width: f64, bin_height: f64, allow_rotation: bool) -> bool {
        let upright = self.width <= bin_width + EPSILON && self.height <= bin_height + EPSILON;
        let rotated = self.height <= bin_width + EPSILON && self.width <= bin_height + EPSILON;
        upright || (allow_rotation && rotated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_fallback() {
        let geom = PartGeometry::new("bracket", 200.0, 100.0);
        let record = PartRecord::from_geometry(&geom, 5.0, 0, 0, 1).unwrap();

        assert_eq!(record.name, "bracket");
        assert_eq!(record.contour.len(), 4);
        assert_relative_eq!(record.width, 205.0);
        assert_relative_eq!(record.height, 105.0);
        assert_relative_eq!(record.area, 205.0 * 105.0);
        assert_relative_eq!(record.contour_area, 20000.0);
        assert!(record.contour_area <= record.area);
    }

    #[test]
    fn test_contour_area_from_polygon() {
        let geom = PartGeometry::new("frame", 100.0, 100.0)
            .with_contour(vec![
                (50.0, 50.0),
                (150.0, 50.0),
                (150.0, 150.0),
                (50.0, 150.0),
            ])
            .with_hole(vec![(75.0, 75.0), (125.0, 75.0), (125.0, 125.0), (75.0, 125.0)]);
        let record = PartRecord::from_geometry(&geom, 0.0, 3, 1, 2).unwrap();

        assert_eq!(record.name, "frame#2");
        assert_eq!(record.source_name, "frame");
        assert_eq!(record.part_index, 3);
        assert_eq!(record.contour[0], (0.0, 0.0));
        assert_eq!(record.holes[0][0], (25.0, 25.0));
        assert_relative_eq!(record.contour_area, 7500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_contour_area_clamped_to_bbox() {
        let geom = PartGeometry::new("odd", 10.0, 10.0).with_contour_area(500.0);
        let record = PartRecord::from_geometry(&geom, 2.0, 0, 0, 1).unwrap();
        assert_relative_eq!(record.contour_area, 100.0);
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        assert!(PartGeometry::new("zero", 0.0, 10.0).validate().is_err());
        assert!(PartGeometry::new("nan", f64::NAN, 10.0).validate().is_err());
        assert!(PartGeometry::new("line", 10.0, 10.0)
            .with_contour(vec![(0.0, 0.0), (10.0, 10.0)])
            .validate()
            .is_err());
        assert!(PartGeometry::new("neg", 10.0, 10.0)
            .with_weight(-1.0)
            .validate()
            .is_err());
        assert!(PartGeometry::new("ok", 10.0, 10.0).validate().is_ok());
    }

    #[test]
    fn test_contour_larger_than_declared_size_rejected() {
        let geom = PartGeometry::new("plate", 100.0, 100.0).with_contour(vec![
            (0.0, 0.0),
            (400.0, 0.0),
            (400.0, 400.0),
            (0.0, 400.0),
        ]);
        assert!(matches!(geom.validate(), Err(Error::InvalidGeometry(_))));
        assert!(PartRecord::from_geometry(&geom, 0.0, 0, 0, 1).is_err());

        let shifted = PartGeometry::new("plate", 100.0, 100.0).with_contour(vec![
            (500.0, 500.0),
            (600.0, 500.0),
            (600.0, 600.0),
            (500.0, 600.0),
        ]);
        assert!(shifted.validate().is_ok());
    }

    #[test]
    fn test_fits_within_orientations() {
        let geom = PartGeometry::new("long", 900.0, 100.0);
        let record = PartRecord::from_geometry(&geom, 0.0, 0, 0, 1).unwrap();

        assert!(record.fits_within(1000.0, 500.0, false));
        assert!(!record.fits_within(500.0, 1000.0, false));
        assert!(record.fits_within(500.0, 1000.0, true));
        assert!(!record.fits_within(500.0, 500.0, true));
    }
}
