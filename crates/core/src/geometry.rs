//! Geometry helpers shared by the packer, the data model and exporters.
//!
//! Parts are described in a local frame whose origin is the bounding-box
//! min corner. Placement only ever uses axis-aligned rotations, so the
//! transforms here are exact coordinate swaps rather than trigonometry.

use geo::{Area, Coord, LineString, Polygon as GeoPolygon};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D point in millimeters.
pub type Point = (f64, f64);

/// Tolerance used for geometric comparisons (millimeters).
pub const EPSILON: f64 = 1e-9;

/// Orientation of a placed part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rotation {
    /// Placed as modelled.
    #[default]
    None,
    /// Rotated by 90 degrees about its own bounding box.
    Quarter,
}

impl Rotation {
    /// Returns the rotation angle in degrees (0 or 90).
    pub fn degrees(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Quarter => 90.0,
        }
    }

    /// Returns true for the 90 degree orientation.
    pub fn is_rotated(self) -> bool {
        matches!(self, Self::Quarter)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum x coordinate.
    pub min_x: f64,
    /// Minimum y coordinate.
    pub min_y: f64,
    /// Maximum x coordinate.
    pub max_x: f64,
    /// Maximum y coordinate.
    pub max_y: f64,
}

impl Aabb {
    /// Creates a new AABB from min/max coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates an AABB from an origin and a size.
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Creates an AABB enclosing a set of points.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (&(x0, y0), rest) = points.split_first()?;
        let mut aabb = Self::new(x0, y0, x0, y0);
        for &(x, y) in rest {
            aabb.min_x = aabb.min_x.min(x);
            aabb.min_y = aabb.min_y.min(y);
            aabb.max_x = aabb.max_x.max(x);
            aabb.max_y = aabb.max_y.max(y);
        }
        Some(aabb)
    }

    /// Returns the width of the AABB.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns the height of the AABB.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the area of the AABB.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns true if the interiors of the two boxes overlap by more than `tolerance`.
    ///
    /// Boxes that merely touch along an edge do not intersect.
    pub fn intersects(&self, other: &Aabb, tolerance: f64) -> bool {
        self.min_x < other.max_x - tolerance
            && other.min_x < self.max_x - tolerance
            && self.min_y < other.max_y - tolerance
            && other.min_y < self.max_y - tolerance
    }

    /// Returns true if `other` lies inside this box, allowing `tolerance` of slack.
    pub fn contains(&self, other: &Aabb, tolerance: f64) -> bool {
        other.min_x >= self.min_x - tolerance
            && other.min_y >= self.min_y - tolerance
            && other.max_x <= self.max_x + tolerance
            && other.max_y <= self.max_y + tolerance
    }
}

/// Returns a rectangle outline of the given size in the local frame.
pub fn rectangle(width: f64, height: f64) -> Vec<Point> {
    vec![(0.0, 0.0), (width, 0.0), (width, height), (0.0, height)]
}

/// Shifts `points` by `(dx, dy)`.
pub fn translate(points: &[Point], dx: f64, dy: f64) -> Vec<Point> {
    points.iter().map(|&(x, y)| (x + dx, y + dy)).collect()
}

/// Rotates a local contour by 90 degrees about its own bounding box.
///
/// `(px, py) -> (py, orig_width - px)`; the result stays in the positive
/// quadrant with the former height along x.
pub fn rotate_quarter(points: &[Point], orig_width: f64) -> Vec<Point> {
    points
        .iter()
        .map(|&(px, py)| (py, orig_width - px))
        .collect()
}

/// Inverse of [`rotate_quarter`].
pub fn unrotate_quarter(points: &[Point], orig_width: f64) -> Vec<Point> {
    points
        .iter()
        .map(|&(qx, qy)| (orig_width - qy, qx))
        .collect()
}

/// Maps a local contour into sheet space: optional quarter turn, then translation.
pub fn place_points(
    points: &[Point],
    rotation: Rotation,
    orig_width: f64,
    x: f64,
    y: f64,
) -> Vec<Point> {
    match rotation {
        Rotation::None => translate(points, x, y),
        Rotation::Quarter => points
            .iter()
            .map(|&(px, py)| (x + py, y + (orig_width - px)))
            .collect(),
    }
}

/// Shifts a contour and its holes so the contour's bounding-box min corner is the origin.
pub fn normalize(contour: &[Point], holes: &[Vec<Point>]) -> (Vec<Point>, Vec<Vec<Point>>) {
    let Some(aabb) = Aabb::from_points(contour) else {
        return (Vec::new(), holes.to_vec());
    };
    let (dx, dy) = (-aabb.min_x, -aabb.min_y);
    let contour = translate(contour, dx, dy);
    let holes = holes.iter().map(|h| translate(h, dx, dy)).collect();
    (contour, holes)
}

fn to_line_string(points: &[Point]) -> LineString<f64> {
    LineString::from(
        points
            .iter()
            .map(|&(x, y)| Coord { x, y })
            .collect::<Vec<_>>(),
    )
}

/// Computes the true area of a polygon with holes.
pub fn polygon_area(exterior: &[Point], holes: &[Vec<Point>]) -> f64 {
    if exterior.len() < 3 {
        return 0.0;
    }
    let interiors = holes
        .iter()
        .filter(|h| h.len() >= 3)
        .map(|h| to_line_string(h))
        .collect();
    GeoPolygon::new(to_line_string(exterior), interiors).unsigned_area()
}
