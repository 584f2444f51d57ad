//! Error handling for cnctools
//!
//! Provides error types for every layer of the leveling pipeline:
//! - Leveling errors (height map interpolation)
//! - G-Code errors (coordinate tokens, line context)
//! - Probe errors (grid layout, probe failures)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Height map interpolation error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelingError {
    /// Fewer than three usable (non-collinear) samples around the query
    #[error("Not enough valid points for plane fitting: found {found}, need {required}")]
    InsufficientPoints {
        /// Number of usable points that could be selected.
        found: usize,
        /// Number of points a plane fit needs.
        required: usize,
    },

    /// The fitted plane is (near-)vertical so height is undefined
    #[error("Plane is invalid; normal vector Z component is {normal_z:e}")]
    InvalidPlane {
        /// Z component of the plane normal.
        normal_z: f64,
    },
}

/// G-Code error type
///
/// Represents errors related to reading coordinates out of program lines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// A coordinate word was present but did not yield a finite number
    #[error("Malformed {axis} coordinate: {token}")]
    MalformedToken {
        /// The axis letter.
        axis: char,
        /// The offending numeric text.
        token: String,
    },

    /// A line could not be leveled
    #[error("Line {line_number}: {source}")]
    InvalidLine {
        /// 1-based line number in the input program.
        line_number: usize,
        /// What went wrong on that line.
        #[source]
        source: LevelingError,
    },
}

/// Probing error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// The requested probe grid cannot be laid out
    #[error("Invalid probe grid: {reason}")]
    InvalidGrid {
        /// Why the grid was rejected.
        reason: String,
    },

    /// The probe did not report a height
    #[error("Probe failed at X{x:.3} Y{y:.3}: {reason}")]
    ProbeFailed {
        /// X position of the failed probe.
        x: f64,
        /// Y position of the failed probe.
        y: f64,
        /// The reason the probe failed.
        reason: String,
    },
}

/// Main error type for cnctools
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Probe error
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Height map (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Check if this error came from height interpolation on a program line
    pub fn is_leveling_error(&self) -> bool {
        matches!(self, Error::Gcode(GcodeError::InvalidLine { .. }))
    }

    /// The interpolation failure behind this error, if any
    pub fn leveling_error(&self) -> Option<&LevelingError> {
        match self {
            Error::Gcode(GcodeError::InvalidLine { source, .. }) => Some(source),
            _ => None,
        }
    }

    /// Check if this is a probe error
    pub fn is_probe_error(&self) -> bool {
        matches!(self, Error::Probe(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
