//! Probed height samples and nearest-plane interpolation
//!
//! A [`HeightMap`] keeps samples in acquisition order. Heights between samples
//! are estimated by fitting a plane through the three nearest samples that are
//! not collinear, then solving that plane at the query position.
//!
//! Lookups that land exactly on a sample return that sample's measured height
//! without any fitting. Callers add the result of [`HeightMap::height_at`] to
//! the programmed Z, so an exact hit contributes the raw measured height while a
//! plane fit contributes the fitted surface height at that spot. Both are the
//! probed surface height in the probe's coordinate frame; they only differ in
//! how they are obtained.

use std::fmt::Write as _;

use cnctools_core::{LevelingError, Point3D, Result};
use serde::{Deserialize, Serialize};

/// Tolerance on each cross-product component below which three points count as collinear
pub const COLLINEAR_EPSILON: f64 = 1e-9;

/// Plane normals with a smaller |Z| are treated as vertical
pub const VERTICAL_PLANE_EPSILON: f64 = 1e-9;

/// Number of samples a plane fit needs
pub const PLANE_POINTS: usize = 3;

/// Where an estimated height came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightSource {
    /// The query hit a sample exactly
    Exact,
    /// The height was solved from a plane through three samples
    Interpolated,
}

/// A height estimate at a query position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightEstimate {
    pub z: f64,
    pub source: HeightSource,
}

/// An ordered set of probed surface samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeightMap {
    points: Vec<Point3D>,
}

impl HeightMap {
    /// Create an empty height map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a height map from samples in acquisition order
    pub fn from_points(points: Vec<Point3D>) -> Self {
        Self { points }
    }

    /// Append a sample
    pub fn push(&mut self, point: Point3D) {
        self.points.push(point);
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no samples have been recorded
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Samples in acquisition order
    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    /// Iterate over samples in acquisition order
    pub fn iter(&self) -> std::slice::Iter<'_, Point3D> {
        self.points.iter()
    }

    /// Height of the first sample at exactly `(x, y)`, if any
    pub fn exact_match(&self, x: f64, y: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.x == x && p.y == y)
            .map(|p| p.z)
    }

    /// Select the nearest samples usable for a plane fit around `(x, y)`
    ///
    /// The two nearest samples are always taken; the third is the nearest
    /// remaining sample that is not collinear with them. Fewer than three are
    /// returned when no such sample exists. Equal distances keep acquisition
    /// order.
    pub fn nearest_plane_points(&self, x: f64, y: f64) -> Vec<Point3D> {
        let mut by_distance: Vec<(f64, Point3D)> = self
            .points
            .iter()
            .map(|p| (p.planar_distance_to(x, y), *p))
            .collect();
        // Vec::sort_by is stable
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut selected: Vec<Point3D> = Vec::with_capacity(PLANE_POINTS);
        for (_, point) in by_distance {
            if selected.len() == PLANE_POINTS {
                break;
            }
            if selected.len() < 2 || !is_collinear(&selected[0], &selected[1], &point) {
                selected.push(point);
            }
        }
        selected
    }

    /// Estimate the surface height at `(x, y)` and report how it was found
    ///
    /// # Errors
    /// - [`LevelingError::InsufficientPoints`] when no three non-collinear samples exist
    /// - [`LevelingError::InvalidPlane`] when the fitted plane is vertical
    pub fn estimate(&self, x: f64, y: f64) -> std::result::Result<HeightEstimate, LevelingError> {
        if let Some(z) = self.exact_match(x, y) {
            return Ok(HeightEstimate {
                z,
                source: HeightSource::Exact,
            });
        }

        let points = self.nearest_plane_points(x, y);
        let [p1, p2, p3] = points.as_slice() else {
            return Err(LevelingError::InsufficientPoints {
                found: points.len(),
                required: PLANE_POINTS,
            });
        };

        Ok(HeightEstimate {
            z: plane_height_at(p1, p2, p3, x, y)?,
            source: HeightSource::Interpolated,
        })
    }

    /// Surface height at `(x, y)`
    ///
    /// # Errors
    /// See [`HeightMap::estimate`]
    pub fn height_at(&self, x: f64, y: f64) -> std::result::Result<f64, LevelingError> {
        self.estimate(x, y).map(|estimate| estimate.z)
    }

    /// Serialize as a JSON array of `{"X","Y","Z"}` records
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load samples from the JSON produced by [`HeightMap::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// One `x,y,z` line per sample, three decimals each
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for p in &self.points {
            let _ = writeln!(out, "{:.3},{:.3},{:.3}", p.x, p.y, p.z);
        }
        out
    }

    /// Human-readable listing of all samples
    pub fn to_pretty(&self) -> String {
        let mut out = String::from("Height Map:\n");
        for p in &self.points {
            let _ = writeln!(out, "   {}", p);
        }
        out
    }
}

impl FromIterator<Point3D> for HeightMap {
    fn from_iter<I: IntoIterator<Item = Point3D>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

impl IntoIterator for HeightMap {
    type Item = Point3D;
    type IntoIter = std::vec::IntoIter<Point3D>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a HeightMap {
    type Item = &'a Point3D;
    type IntoIter = std::slice::Iter<'a, Point3D>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// True when three points lie on one line in 3-D space
pub fn is_collinear(p1: &Point3D, p2: &Point3D, p3: &Point3D) -> bool {
    let u = p2.sub(p1);
    let v = p3.sub(p1);
    u.cross(&v).is_near_zero(COLLINEAR_EPSILON)
}

/// Height at `(x, y)` on the plane through three points
///
/// # Errors
/// Returns [`LevelingError::InvalidPlane`] when the plane is (near-)vertical
pub fn plane_height_at(
    p1: &Point3D,
    p2: &Point3D,
    p3: &Point3D,
    x: f64,
    y: f64,
) -> std::result::Result<f64, LevelingError> {
    let u = p2.sub(p1);
    let v = p3.sub(p1);
    let normal = u.cross(&v);

    if normal.z.abs() < VERTICAL_PLANE_EPSILON {
        return Err(LevelingError::InvalidPlane { normal_z: normal.z });
    }

    Ok(p1.z - (normal.x * (x - p1.x) + normal.y * (y - p1.y)) / normal.z)
}
