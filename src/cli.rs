//! Command-line definitions

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use cnctools_core::CorrectionMode;

#[derive(Parser, Debug)]
#[command(name = "cnctools")]
#[command(about = "G-code utilities: auto-leveling, probing, surfacing and laser tests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (.toml or .json), defaults to the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output on stderr, repeat for more detail
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the bounding box of a G-code program
    Bounds {
        /// G-code file to analyze
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Correct a G-code program for an uneven surface
    Autolevel(AutolevelArgs),
    /// Generate a probing program for a rectangular grid
    Probe(ProbeArgs),
    /// Generate spoilboard surfacing G-code
    #[command(alias = "spoil")]
    Spoilboard(SpoilboardArgs),
    /// Laser test patterns
    Laser {
        #[command(subcommand)]
        pattern: LaserCommand,
    },
    /// Calibrate steps per millimeter
    Steps {
        /// Current steps per mm
        #[arg(short, long)]
        current: f64,
        /// Commanded distance
        #[arg(short, long, default_value_t = 25.0)]
        target: f64,
        /// Distance actually travelled
        #[arg(short, long)]
        actual: f64,
    },
}

/// Height map output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Json,
    Csv,
    #[default]
    Pretty,
}

/// How leveled lines are written
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelingMode {
    /// Append a `; z + offset -> corrected` comment
    Annotate,
    /// Replace the Z word with the corrected height
    Rewrite,
}

impl From<LevelingMode> for CorrectionMode {
    fn from(mode: LevelingMode) -> Self {
        match mode {
            LevelingMode::Annotate => CorrectionMode::Annotate,
            LevelingMode::Rewrite => CorrectionMode::Rewrite,
        }
    }
}

#[derive(Args, Debug)]
pub struct AutolevelArgs {
    /// G-code file to level
    #[arg(short, long)]
    pub file: PathBuf,

    /// Height map captured earlier (JSON list of X/Y/Z records)
    #[arg(long)]
    pub heightmap: Option<PathBuf>,

    /// Probe positions along X when simulating
    #[arg(long)]
    pub rows: Option<usize>,

    /// Probe positions along Y when simulating
    #[arg(long)]
    pub cols: Option<usize>,

    /// Simulated surface height at the origin
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset: f64,

    /// Simulated surface slope along X (mm per mm)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub tilt_x: f64,

    /// Simulated surface slope along Y (mm per mm)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub tilt_y: f64,

    /// Output mode, defaults to the configured one
    #[arg(long, value_enum)]
    pub mode: Option<LevelingMode>,

    /// Height map report format
    #[arg(long, value_enum, default_value_t = ExportFormat::Pretty)]
    pub export: ExportFormat,

    /// Write the height map report here instead of stderr
    #[arg(long)]
    pub export_to: Option<PathBuf>,

    /// Write the leveled program here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[arg(short = 'x', long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x_start: f64,
    #[arg(short = 'X', long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x_end: f64,
    #[arg(short = 'y', long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub y_start: f64,
    #[arg(short = 'Y', long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub y_end: f64,

    /// Rows and columns, e.g. `5,4`; a single value is used for both
    #[arg(short, long, value_delimiter = ',', num_args = 1..=2)]
    pub grid: Vec<usize>,

    /// Lowest Z the probe may reach
    #[arg(short, long, allow_negative_numbers = true)]
    pub depth: Option<f64>,

    /// Clearance height between probes
    #[arg(short, long, allow_negative_numbers = true)]
    pub safe_height: Option<f64>,

    /// Probing feed rate
    #[arg(short = 'F', long)]
    pub feed: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SpoilboardArgs {
    #[arg(short, long)]
    pub x_max: Option<f64>,
    #[arg(short, long)]
    pub y_max: Option<f64>,
    /// Depth of cut
    #[arg(short, long)]
    pub depth: Option<f64>,
    /// Stepover, roughly half the tool diameter
    #[arg(short, long)]
    pub step_over: Option<f64>,
    #[arg(short, long)]
    pub feed_rate: Option<f64>,
    /// Leave an alignment corner at the origin
    #[arg(short, long)]
    pub corner: bool,
    /// Climb instead of conventional cutting
    #[arg(long)]
    pub climb: bool,
}

#[derive(Subcommand, Debug)]
pub enum LaserCommand {
    /// Filled square for judging power and speed
    Power {
        #[arg(short, long)]
        power: Option<f64>,
        #[arg(short, long)]
        feed: Option<f64>,
        /// Edge length of the square
        #[arg(short, long)]
        size: Option<f64>,
        #[arg(long)]
        beam_diameter: Option<f64>,
        /// Fraction of the beam shared by neighbouring passes
        #[arg(long)]
        overlap: Option<f64>,
    },
    /// Ramped line with tick marks for finding the focus height
    Focus {
        #[arg(short, long)]
        power: Option<u32>,
        #[arg(short, long)]
        feed: Option<u32>,
        /// Rough focal length
        #[arg(short = 'F', long)]
        focal_length: Option<f64>,
        #[arg(short = 'z', long, allow_negative_numbers = true)]
        z_min: Option<f64>,
        #[arg(short = 'Z', long, allow_negative_numbers = true)]
        z_max: Option<f64>,
    },
    /// Right triangle outline
    Triangle {
        /// Leg length
        #[arg(short, long, default_value_t = 10.0)]
        size: f64,
        #[arg(short, long)]
        power: Option<f64>,
        #[arg(short, long)]
        feed: Option<f64>,
    },
}
