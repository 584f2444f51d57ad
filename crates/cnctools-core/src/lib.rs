//! # cnctools Core
//!
//! Core types and error handling shared by the cnctools crates.
//! Provides the data model for height samples, tool positions and program
//! extents, plus the unified error hierarchy.

pub mod data;
pub mod error;

pub use data::{
    Bounds, CorrectionMode, PartialPosition, Point3D, Position, BOUNDS_MAX_SENTINEL,
    BOUNDS_MIN_SENTINEL,
};

pub use error::{Error, GcodeError, LevelingError, ProbeError, Result};
