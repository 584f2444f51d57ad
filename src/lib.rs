//! # cnctools
//!
//! Command-line utilities for preparing G-code for a hobby CNC router or laser:
//! - Auto-leveling a program against a probed height map
//! - Generating probing programs for a rectangular grid
//! - Spoilboard surfacing and laser test patterns
//! - Steps-per-mm calibration
//!
//! ## Architecture
//!
//! 1. **cnctools-core** - Shared geometry types and the error hierarchy
//! 2. **cnctools-autolevel** - Bounds scanning, height maps, probing, leveling
//! 3. **cnctools-camtools** - Template program generators
//! 4. **cnctools-settings** - TOML/JSON configuration
//! 5. **cnctools** - This binary, wiring the crates to the command line

pub mod cli;
pub mod commands;

pub use cnctools_autolevel as autolevel;
pub use cnctools_camtools as camtools;
pub use cnctools_settings as settings;

pub use cnctools_core::{
    Bounds, CorrectionMode, Error, GcodeError, LevelingError, PartialPosition, Point3D, Position,
    ProbeError, Result,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, stdout is reserved for program text
/// - RUST_LOG environment variable support
/// - A default level raised by each `-v`: warn, info, debug, trace
pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .with_level(true)
        .with_line_number(verbosity > 2);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
