//! Surface probing
//!
//! Lays out a rectangular probe grid over a program's extent, collects one
//! height sample per grid position from a [`SurfaceProbe`], and generates the
//! G-code an operator runs to probe the same grid on a real machine.

use std::fmt::Write as _;

use cnctools_core::{Bounds, Point3D, ProbeError, Result};
use serde::{Deserialize, Serialize};

use crate::heightmap::HeightMap;

/// Rectangular lattice of probe positions
///
/// `rows` positions are spread along X and `cols` along Y, both including the
/// end points. A single row or column sits at the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeGrid {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub rows: usize,
    pub cols: usize,
}

impl ProbeGrid {
    /// Create a grid, validating its layout
    ///
    /// # Errors
    /// Returns [`ProbeError::InvalidGrid`] for zero rows/columns, non-finite
    /// limits, or a minimum above its maximum
    pub fn new(
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        rows: usize,
        cols: usize,
    ) -> std::result::Result<Self, ProbeError> {
        let invalid = |reason: &str| ProbeError::InvalidGrid {
            reason: reason.to_string(),
        };

        if rows == 0 || cols == 0 {
            return Err(invalid("rows and columns must be at least 1"));
        }
        if ![x_min, x_max, y_min, y_max].iter().all(|v| v.is_finite()) {
            return Err(invalid("grid limits must be finite"));
        }
        if x_min > x_max || y_min > y_max {
            return Err(invalid("grid minimum exceeds maximum"));
        }

        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
            rows,
            cols,
        })
    }

    /// Cover the horizontal extent of a program
    ///
    /// # Errors
    /// Returns [`ProbeError::InvalidGrid`] when the bounds have no X/Y extent
    pub fn from_bounds(
        bounds: &Bounds,
        rows: usize,
        cols: usize,
    ) -> std::result::Result<Self, ProbeError> {
        if !bounds.has_xy_extent() {
            return Err(ProbeError::InvalidGrid {
                reason: "program has no X/Y coordinates".to_string(),
            });
        }
        tracing::debug!(
            width = bounds.width(),
            depth = bounds.depth(),
            rows,
            cols,
            "Laying out probe grid over program extent"
        );
        Self::new(
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y,
            rows,
            cols,
        )
    }

    /// Distance between neighbouring positions along X
    pub fn step_x(&self) -> f64 {
        step(self.x_min, self.x_max, self.rows)
    }

    /// Distance between neighbouring positions along Y
    pub fn step_y(&self) -> f64 {
        step(self.y_min, self.y_max, self.cols)
    }

    /// Total number of probe positions
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always false for a validated grid
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Probe positions in acquisition order (X outer, Y inner)
    pub fn positions(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let (step_x, step_y) = (self.step_x(), self.step_y());
        (0..self.rows).flat_map(move |i| {
            (0..self.cols).map(move |j| {
                (
                    self.x_min + i as f64 * step_x,
                    self.y_min + j as f64 * step_y,
                )
            })
        })
    }
}

fn step(min: f64, max: f64, count: usize) -> f64 {
    if count > 1 {
        (max - min) / (count - 1) as f64
    } else {
        0.0
    }
}

/// Something that can measure the surface height at a position
pub trait SurfaceProbe {
    /// Move to `(x, y)` and return the measured surface height
    fn probe_at(&mut self, x: f64, y: f64) -> Result<f64>;
}

/// Probe every grid position and collect the samples in acquisition order
///
/// # Errors
/// Stops at the first failed probe
pub fn probe_grid<P: SurfaceProbe + ?Sized>(probe: &mut P, grid: &ProbeGrid) -> Result<HeightMap> {
    tracing::info!(
        rows = grid.rows,
        cols = grid.cols,
        "Probing {} positions",
        grid.len()
    );

    let mut map = HeightMap::new();
    for (x, y) in grid.positions() {
        let z = probe.probe_at(x, y)?;
        tracing::debug!("Probed X{:.3} Y{:.3} -> Z{:.3}", x, y, z);
        map.push(Point3D::new(x, y, z));
    }
    Ok(map)
}

/// Analytic surface used by [`SimulatedProbe`]
///
/// `z = offset + tilt_x * x + tilt_y * y + bow * ((x - cx)^2 + (y - cy)^2)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceModel {
    pub offset: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
    pub bow: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl SurfaceModel {
    /// A perfectly flat surface at `height`
    pub fn flat(height: f64) -> Self {
        Self {
            offset: height,
            ..Self::default()
        }
    }

    /// Surface height at `(x, y)`
    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        self.offset + self.tilt_x * x + self.tilt_y * y + self.bow * (dx * dx + dy * dy)
    }
}

impl Default for SurfaceModel {
    fn default() -> Self {
        Self {
            offset: 0.0,
            tilt_x: 0.0,
            tilt_y: 0.0,
            bow: 0.0,
            center_x: 0.0,
            center_y: 0.0,
        }
    }
}

/// Stand-in probe reading heights from a [`SurfaceModel`]
///
/// Records the commands a controller would have received so dry runs can be
/// inspected. Heights are rounded to three decimals like a real probe report.
#[derive(Debug, Clone, Default)]
pub struct SimulatedProbe {
    surface: SurfaceModel,
    transcript: Vec<String>,
}

impl SimulatedProbe {
    /// Create a simulated probe over `surface`
    pub fn new(surface: SurfaceModel) -> Self {
        Self {
            surface,
            transcript: Vec::new(),
        }
    }

    /// Commands "sent" so far
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }
}

impl SurfaceProbe for SimulatedProbe {
    fn probe_at(&mut self, x: f64, y: f64) -> Result<f64> {
        self.transcript.push(format!("G0 X{:.3} Y{:.3}", x, y));
        self.transcript.push("G38.2 Z-10 F50".to_string());

        let z = self.surface.height_at(x, y);
        if !z.is_finite() {
            return Err(ProbeError::ProbeFailed {
                x,
                y,
                reason: "no contact".to_string(),
            }
            .into());
        }
        Ok(round_to(z, 3))
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let multiplier = 10f64.powi(places);
    (value * multiplier).round() / multiplier
}

/// Settings for a generated probing program
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeProgramParameters {
    /// Positions to probe
    pub grid: ProbeGrid,
    /// Lowest Z the probe may travel to
    pub probe_depth: f64,
    /// Clearance height between probes
    pub safe_height: f64,
    /// Probing feed rate
    pub probe_feed: u32,
}

/// Generate the G-code that probes every grid position
pub fn generate_probe_program(params: &ProbeProgramParameters) -> String {
    let mut gcode = String::new();

    gcode.push_str("G21\nG90\n");
    let _ = writeln!(gcode, "G0 Z{:.1}", params.safe_height);

    for (x, y) in params.grid.positions() {
        let _ = writeln!(gcode, "\nG90 G0 X{:.3} Y{:.3}", x, y);
        let _ = writeln!(
            gcode,
            "G38.2 Z{:.1} F{}",
            params.probe_depth, params.probe_feed
        );
        let _ = writeln!(gcode, "G0 Z{:.1}", params.safe_height);
    }

    gcode
}
