//! # cnctools CAM Tools
//!
//! Template G-code generators for jobs that don't start from a design file.
//!
//! - **Spoilboard Surfacing**: rectangular spiral facing pass over the bed
//! - **Laser Tests**: power/speed fill, triangle outline and focus ramp
//! - **Calibration**: steps-per-mm correction from a measured move

pub mod calibration;
pub mod error;
pub mod laser;
pub mod program;
pub mod spoilboard_surfacing;

pub use calibration::calibrate_steps_per_mm;
pub use error::{CamToolError, CamToolResult, ParameterError, ParameterResult};
pub use laser::{
    triangle_pattern, FocusRampGenerator, FocusRampParameters, SpiralFillGenerator,
    SpiralFillParameters,
};
pub use program::GcodeProgram;
pub use spoilboard_surfacing::{
    CuttingMode, SpoilboardSurfacingGenerator, SpoilboardSurfacingParameters,
};
