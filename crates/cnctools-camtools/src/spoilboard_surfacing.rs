use serde::{Deserialize, Serialize};

use crate::error::{require_positive, CamToolResult, ParameterError};
use crate::program::GcodeProgram;

/// Size of the uncut alignment corner left at the origin (mm)
pub const CORNER_SIZE: f64 = 10.0;

/// Feed rate used for the plunge to cutting depth (mm/min)
pub const PLUNGE_FEED: f64 = 25.0;

/// Direction the spiral is traversed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CuttingMode {
    /// Along X first, counter-clockwise seen from above
    #[default]
    Conventional,
    /// Along Y first, clockwise seen from above
    Climb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoilboardSurfacingParameters {
    /// Far X limit, the origin is the near corner (mm)
    pub x_max: f64,
    /// Far Y limit (mm)
    pub y_max: f64,
    /// Depth of cut below the zeroed surface (mm)
    pub cut_depth: f64,
    /// Distance between successive loops, roughly half the tool diameter (mm)
    pub stepover: f64,
    pub feed_rate: f64,
    pub spindle_speed: u32,
    /// Leave a square alignment corner at the origin
    pub corner: bool,
    pub mode: CuttingMode,
}

impl Default for SpoilboardSurfacingParameters {
    fn default() -> Self {
        Self {
            x_max: 200.0,
            y_max: 150.0,
            cut_depth: 2.0,
            stepover: 8.0,
            feed_rate: 100.0,
            spindle_speed: 10000,
            corner: false,
            mode: CuttingMode::Conventional,
        }
    }
}

impl SpoilboardSurfacingParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        require_positive("x_max", self.x_max)?;
        require_positive("y_max", self.y_max)?;
        require_positive("cut_depth", self.cut_depth)?;
        require_positive("stepover", self.stepover)?;
        require_positive("feed_rate", self.feed_rate)?;
        if self.corner && (self.x_max <= CORNER_SIZE || self.y_max <= CORNER_SIZE) {
            return Err(ParameterError::InvalidDimensions(format!(
                "an alignment corner needs both limits above {:.0} mm",
                CORNER_SIZE
            )));
        }
        Ok(())
    }
}

/// Rectangular spiral surfacing, from the outside in
pub struct SpoilboardSurfacingGenerator {
    params: SpoilboardSurfacingParameters,
}

impl SpoilboardSurfacingGenerator {
    pub fn new(params: SpoilboardSurfacingParameters) -> Self {
        Self { params }
    }

    pub fn generate(&self) -> CamToolResult<String> {
        let p = &self.params;
        p.validate()?;

        let mut gcode = GcodeProgram::new();

        // Header
        gcode.push("G21 ; Set units to mm");
        gcode.push("G90 ; Absolute positioning");
        gcode.push("G0 X0.00 Y0.00 ; Move to starting corner");
        gcode.push(format!("M3 S{} ; Start spindle", p.spindle_speed));
        gcode.push(format!(
            "G1 Z{:.2} F{:.0} ; Move down to fixed cutting depth",
            -p.cut_depth, PLUNGE_FEED
        ));

        let (mut x_min, mut y_min) = (0.0, 0.0);
        if p.corner {
            gcode.push(format!(
                "G1 X{:.2} Y{:.2} F{:.2}",
                CORNER_SIZE, CORNER_SIZE, p.feed_rate
            ));
            gcode.push(format!("G1 Y{:.2} F{:.2}", p.y_max, p.feed_rate));
            gcode.push(format!("G1 Y{:.2} F{:.2}", CORNER_SIZE, p.feed_rate));
            x_min = CORNER_SIZE;
            y_min = CORNER_SIZE;
        }

        gcode.push(format!("G1 F{:.2} ; Set feed rate", p.feed_rate));

        let (mut x_max, mut y_max) = (p.x_max, p.y_max);
        let mut loops = 0usize;
        while x_min < x_max && y_min < y_max {
            let corners = match p.mode {
                CuttingMode::Conventional => [
                    (x_max, y_min),
                    (x_max, y_max),
                    (x_min, y_max),
                    (x_min, y_min + p.stepover),
                ],
                CuttingMode::Climb => [
                    (x_min, y_max),
                    (x_max, y_max),
                    (x_max, y_min),
                    (x_min + p.stepover, y_min),
                ],
            };
            for (x, y) in corners {
                gcode.push(format!("G1 X{:.2} Y{:.2}", x, y));
            }

            x_min += p.stepover;
            y_min += p.stepover;
            x_max -= p.stepover;
            y_max -= p.stepover;
            loops += 1;
        }

        gcode.push("G0 Z5.00 ; Retract tool");
        gcode.push("M5 ; Stop spindle");
        gcode.push("M30 ; End program");

        tracing::debug!(loops, mode = ?p.mode, "Generated spoilboard surfacing");
        Ok(gcode.into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_count() {
        let params = SpoilboardSurfacingParameters {
            x_max: 40.0,
            y_max: 20.0,
            stepover: 8.0,
            ..Default::default()
        };
        let gcode = SpoilboardSurfacingGenerator::new(params)
            .generate()
            .unwrap();
        // y range closes after two loops: 0..20, 8..12
        let moves = gcode
            .lines()
            .filter(|l| l.starts_with("G1 X") && !l.contains('F'))
            .count();
        assert_eq!(moves, 8);
    }

    #[test]
    fn test_corner_needs_room() {
        let params = SpoilboardSurfacingParameters {
            x_max: 8.0,
            corner: true,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
