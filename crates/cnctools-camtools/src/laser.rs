//! Laser test patterns
//!
//! All patterns are written in relative mode (`G91`) so they can be run from
//! wherever the head is parked:
//! - [`SpiralFillGenerator`] fills a small square to judge power and speed
//! - [`triangle_pattern`] outlines a right triangle
//! - [`FocusRampGenerator`] draws a line while sweeping Z, with tick marks to
//!   read the best focus height off a chart

use serde::{Deserialize, Serialize};

use crate::error::{require_positive, CamToolResult, ParameterError};
use crate::program::GcodeProgram;

/// Spiral sides at or below this length are not drawn
const MIN_SIDE: f64 = 1e-9;

/// X travel of the focus ramp (mm)
pub const FOCUS_TRAVEL: f64 = 50.0;

/// Tick marks after the one at the start of the ramp
pub const FOCUS_TICKS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiralFillParameters {
    /// Outer edge length of the filled square (mm)
    pub box_size: f64,
    /// Laser power (S word)
    pub power: f64,
    /// Width of the burned line (mm)
    pub beam_diameter: f64,
    /// Fraction of the beam width shared by neighbouring passes, in `[0, 1)`
    pub overlap: f64,
    pub feed_rate: f64,
}

impl Default for SpiralFillParameters {
    fn default() -> Self {
        Self {
            box_size: 5.0,
            power: 1000.0,
            beam_diameter: 0.2,
            overlap: 0.5,
            feed_rate: 500.0,
        }
    }
}

impl SpiralFillParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        require_positive("box_size", self.box_size)?;
        require_positive("power", self.power)?;
        require_positive("beam_diameter", self.beam_diameter)?;
        require_positive("feed_rate", self.feed_rate)?;
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(ParameterError::OutOfRange {
                name: "overlap".to_string(),
                value: self.overlap,
                min: 0.0,
                max: 1.0,
            });
        }
        if self.box_size <= self.beam_diameter {
            return Err(ParameterError::InvalidDimensions(format!(
                "box size {} must exceed the beam diameter {}",
                self.box_size, self.beam_diameter
            )));
        }
        Ok(())
    }

    /// Distance between neighbouring passes
    pub fn step(&self) -> f64 {
        self.beam_diameter * (1.0 - self.overlap)
    }
}

/// Square spiral fill for power and speed tests
pub struct SpiralFillGenerator {
    params: SpiralFillParameters,
}

impl SpiralFillGenerator {
    pub fn new(params: SpiralFillParameters) -> Self {
        Self { params }
    }

    /// Full program including the relative-mode preamble
    pub fn generate(&self) -> CamToolResult<String> {
        let mut gcode = GcodeProgram::new();
        gcode.g91_preamble();
        gcode.extend(&self.fill()?);
        Ok(gcode.into_string())
    }

    /// Only the fill moves, for embedding in a larger relative-mode program
    pub fn fill(&self) -> CamToolResult<GcodeProgram> {
        let p = &self.params;
        p.validate()?;

        let mut gcode = GcodeProgram::new();
        gcode.push(format!("M3 S{:.0} ; Set spindle", p.power));

        // The beam burns half its width past the path, so the path runs inside
        // the box edge by that much on every side.
        let step = p.step();
        let mut side = p.box_size - p.beam_diameter;
        let (mut total_x, mut total_y) = (0.0, 0.0);

        while side > MIN_SIDE {
            gcode.push(format!("G1 X{:.2} F{:.0} ; Right", side, p.feed_rate));
            gcode.push(format!("G1 Y{:.2} ; Up", side));
            total_x += side;
            total_y += side;

            side -= step;
            if side <= MIN_SIDE {
                break;
            }

            gcode.push(format!("G1 X{:.2} ; Left", -side));
            gcode.push(format!("G1 Y{:.2} ; Down", -side));
            total_x -= side;
            total_y -= side;

            side -= step;
        }

        gcode.push(format!(
            "G0 X{:.2} Y{:.2} ; Return to start position",
            -total_x, -total_y
        ));
        gcode.push("M5 ; Turn off spindle");
        Ok(gcode)
    }
}

/// Relative-mode right triangle with legs of `size`
pub fn triangle_pattern(size: f64, power: f64, feed_rate: f64) -> CamToolResult<String> {
    require_positive("size", size)?;
    require_positive("power", power)?;
    require_positive("feed_rate", feed_rate)?;

    let mut gcode = GcodeProgram::new();
    gcode.g91_preamble();
    gcode.push(format!("M3 S{:.0} ; Set spindle", power));
    gcode.push(format!("G1 Y{:.2} F{:.0} ; Up", size, feed_rate));
    gcode.push(format!("G1 X{:.2} F{:.0} ; Right", size, feed_rate));
    gcode.push(format!(
        "G1 X{:.2} Y{:.2} F{:.0} ; Back to start",
        -size, -size, feed_rate
    ));
    gcode.push("M5 ; Turn off spindle");
    Ok(gcode.into_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusRampParameters {
    /// Laser power, should be as low as still marks the material
    pub power: u32,
    pub feed_rate: u32,
    /// Rough focal length, the ramp is centred on it
    pub focal_length: f64,
    /// Lowest Z relative to the focal length
    pub z_min: f64,
    /// Highest Z relative to the focal length
    pub z_max: f64,
}

impl Default for FocusRampParameters {
    fn default() -> Self {
        Self {
            power: 75,
            feed_rate: 100,
            focal_length: 40.0,
            z_min: -5.0,
            z_max: 5.0,
        }
    }
}

impl FocusRampParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.power == 0 {
            return Err(ParameterError::not_positive("power", 0.0));
        }
        if self.feed_rate == 0 {
            return Err(ParameterError::not_positive("feed_rate", 0.0));
        }
        if !(self.focal_length.is_finite() && self.z_min.is_finite() && self.z_max.is_finite()) {
            return Err(ParameterError::InvalidValue {
                name: "z range".to_string(),
                reason: "heights must be finite".to_string(),
            });
        }
        if self.z_max <= self.z_min {
            return Err(ParameterError::InvalidDimensions(format!(
                "z_max {} must be above z_min {}",
                self.z_max, self.z_min
            )));
        }
        Ok(())
    }
}

/// Focus test: a ramped line with tick marks
///
/// Run it after touching off and zeroing the laser. The line is drawn while Z
/// rises from `focal_length + z_min` to `focal_length + z_max`; find the
/// thinnest part of the line and read its height off the nearest tick in
/// [`FocusRampGenerator::chart`].
pub struct FocusRampGenerator {
    params: FocusRampParameters,
}

impl FocusRampGenerator {
    pub fn new(params: FocusRampParameters) -> Self {
        Self { params }
    }

    /// Absolute Z for each tick, the first tick at the start of the ramp
    pub fn chart(&self) -> Vec<(usize, f64)> {
        let p = &self.params;
        let rise = (p.z_max - p.z_min) / FOCUS_TICKS as f64;
        (0..=FOCUS_TICKS)
            .map(|i| (i, p.focal_length + p.z_min + rise * i as f64))
            .collect()
    }

    /// Program followed by the tick chart as comment lines
    pub fn generate(&self) -> CamToolResult<String> {
        let p = &self.params;
        p.validate()?;

        let rise = p.z_max - p.z_min;
        let mut gcode = GcodeProgram::new();
        gcode.g91_preamble();
        gcode.push(format!("G0 Z{:.2} ; Move to focal", p.focal_length));
        gcode.push(format!("G0 Z{:.2} ; Move down", p.z_min));

        gcode.push(format!("M3 S{} ; Set spindle", p.power));
        gcode.push(format!(
            "G1 X{:.2} Z{:.2} F{} ; Move right and up",
            FOCUS_TRAVEL, rise, p.feed_rate
        ));
        gcode.push("M5 ; Turn off spindle");
        gcode.push(format!(
            "G0 X{:.2} Y-1.00 Z{:.2} ; Return to start",
            -FOCUS_TRAVEL, -rise
        ));
        self.push_tick(&mut gcode);

        for _ in 0..FOCUS_TICKS {
            gcode.push(format!(
                "G0 X{:.2} Y-1.00 Z{:.2} ; Next tick",
                FOCUS_TRAVEL / FOCUS_TICKS as f64,
                rise / FOCUS_TICKS as f64
            ));
            self.push_tick(&mut gcode);
        }

        for (tick, z) in self.chart() {
            gcode.push(format!("; {}: {:.2}", tick, z));
        }

        tracing::debug!(
            from = p.focal_length + p.z_min,
            to = p.focal_length + p.z_max,
            "Generated focus ramp"
        );
        Ok(gcode.into_string())
    }

    /// Short mark across the line, ending where it started
    fn push_tick(&self, gcode: &mut GcodeProgram) {
        gcode.push(format!("M3 S{} ; Set spindle", self.params.power));
        gcode.push(format!("G1 Y2.00 F{} ; Draw tick", self.params.feed_rate));
        gcode.push("M5 ; Turn off spindle");
        gcode.push("G0 Y-1.00");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spiral_step() {
        assert!((SpiralFillParameters::default().step() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_spiral_overlap_range() {
        let params = SpiralFillParameters {
            overlap: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParameterError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_focus_chart_spans_range() {
        let chart = FocusRampGenerator::new(FocusRampParameters::default()).chart();
        assert_eq!(chart.len(), FOCUS_TICKS + 1);
        assert_eq!(chart[0], (0, 35.0));
        assert!((chart[10].1 - 45.0).abs() < 1e-9);
    }
}
