//! Data models for sample points, positions and program extents
//!
//! This module provides:
//! - `Point3D`, a measured or derived point in machine space
//! - `Position` tracking with per-axis carry-over from `PartialPosition` updates
//! - `Bounds`, the axis-aligned extent of every coordinate mentioned in a program
//! - `CorrectionMode`, how leveled output is written

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used for empty minimums; any real coordinate is smaller.
pub const BOUNDS_MIN_SENTINEL: f64 = 1e9;

/// Sentinel used for empty maximums; any real coordinate is larger.
pub const BOUNDS_MAX_SENTINEL: f64 = -1e9;

/// A point in machine space.
///
/// For height samples `x`/`y` are the horizontal probe position and `z` the
/// measured surface height. Serialized with upper-case field names so exported
/// height maps read as `{"X":..,"Y":..,"Z":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    /// X-axis position
    #[serde(rename = "X")]
    pub x: f64,
    /// Y-axis position
    #[serde(rename = "Y")]
    pub y: f64,
    /// Z-axis position (surface height for samples)
    #[serde(rename = "Z")]
    pub z: f64,
}

impl Point3D {
    /// Create a new point
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise difference `self - other`
    pub fn sub(&self, other: &Point3D) -> Point3D {
        Point3D::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Cross product `self × other`
    pub fn cross(&self, other: &Point3D) -> Point3D {
        Point3D::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Horizontal (XY) distance to a query position, Z is ignored
    pub fn planar_distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when every component is within `epsilon` of zero
    pub fn is_near_zero(&self, epsilon: f64) -> bool {
        self.x.abs() < epsilon && self.y.abs() < epsilon && self.z.abs() < epsilon
    }
}

impl fmt::Display for Point3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X: {:.3}, Y: {:.3}, Z: {:.3}", self.x, self.y, self.z)
    }
}

/// Absolute tool position tracked while walking a program
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Position {
    /// Create a new position with X, Y, Z coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Overwrite the axes present in `update`, keeping the others
    pub fn apply(&mut self, update: &PartialPosition) {
        *self = update.apply_to(self);
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{:.3} Y:{:.3} Z:{:.3}", self.x, self.y, self.z)
    }
}

/// Partial position for updating only specific axes
///
/// Each axis is an `Option` where `None` means "don't change this axis" and
/// `Some(value)` means "set to value". This is what a single program line
/// contributes to the running position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialPosition {
    /// X-axis position (if Some, update this axis)
    pub x: Option<f64>,
    /// Y-axis position (if Some, update this axis)
    pub y: Option<f64>,
    /// Z-axis position (if Some, update this axis)
    pub z: Option<f64>,
}

impl PartialPosition {
    /// Create a new empty partial position (all axes None)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a partial position with XYZ axes set
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Apply this partial position to an existing position, updating only specified axes
    pub fn apply_to(&self, pos: &Position) -> Position {
        Position {
            x: self.x.unwrap_or(pos.x),
            y: self.y.unwrap_or(pos.y),
            z: self.z.unwrap_or(pos.z),
        }
    }

    /// Check if no axis is set
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

/// Axis-aligned extent of every coordinate mentioned in a program
///
/// A freshly created `Bounds` holds sentinels (`min > max` on every axis) until a
/// coordinate is included, so a coordinate-free program is detectable via
/// [`Bounds::is_empty`] instead of collapsing to a zero-size box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Bounds {
    /// Create bounds in the empty sentinel state
    pub fn new() -> Self {
        Self {
            min_x: BOUNDS_MIN_SENTINEL,
            max_x: BOUNDS_MAX_SENTINEL,
            min_y: BOUNDS_MIN_SENTINEL,
            max_y: BOUNDS_MAX_SENTINEL,
            min_z: BOUNDS_MIN_SENTINEL,
            max_z: BOUNDS_MAX_SENTINEL,
        }
    }

    /// Widen the X range to contain `x`
    pub fn include_x(&mut self, x: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
    }

    /// Widen the Y range to contain `y`
    pub fn include_y(&mut self, y: f64) {
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Widen the Z range to contain `z`
    pub fn include_z(&mut self, z: f64) {
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
    }

    /// Widen every axis present in `coords`
    pub fn include(&mut self, coords: &PartialPosition) {
        if let Some(x) = coords.x {
            self.include_x(x);
        }
        if let Some(y) = coords.y {
            self.include_y(y);
        }
        if let Some(z) = coords.z {
            self.include_z(z);
        }
    }

    /// True when no coordinate at all has been included
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x && self.min_y > self.max_y && self.min_z > self.max_z
    }

    /// True when both horizontal axes have at least one value
    pub fn has_xy_extent(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// Extent along X (negative while empty)
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along Y (negative while empty)
    pub fn depth(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tXmin: {:.3}, XMax: {:.3}", self.min_x, self.max_x)?;
        writeln!(f, "\tYmin: {:.3}, YMax: {:.3}", self.min_y, self.max_y)?;
        write!(f, "\tZmin: {:.3}, ZMax: {:.3}", self.min_z, self.max_z)
    }
}

/// How leveled output is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionMode {
    /// Keep the line as-is and append a `; z + offset -> corrected` comment
    #[default]
    Annotate,
    /// Replace (or add) the Z word with the corrected height
    Rewrite,
}

impl fmt::Display for CorrectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annotate => write!(f, "annotate"),
            Self::Rewrite => write!(f, "rewrite"),
        }
    }
}

impl std::str::FromStr for CorrectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "annotate" => Ok(Self::Annotate),
            "rewrite" => Ok(Self::Rewrite),
            _ => Err(format!("Unknown correction mode: {}", s)),
        }
    }
}
