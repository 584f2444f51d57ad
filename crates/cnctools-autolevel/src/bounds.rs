//! Program extent scanning
//!
//! Measures the full range of every X, Y and Z coordinate mentioned anywhere in
//! a program. No lines are skipped, so the box covers non-motion commands too.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use cnctools_core::{Bounds, Result};

use crate::coords::{extract_position, program_lines};

/// Scan a program for the bounding box of its coordinates
///
/// A program without any coordinate word yields [`Bounds::new`] (the empty
/// sentinel box), not an error.
///
/// Lines are not required to be UTF-8.
///
/// # Errors
/// Returns an I/O error if a line cannot be read
pub fn scan_boundaries<R: BufRead>(reader: R) -> Result<Bounds> {
    let mut bounds = Bounds::new();
    let mut lines_read = 0usize;

    for line in program_lines(reader) {
        let line = line?;
        bounds.include(&extract_position(&line));
        lines_read += 1;
    }

    tracing::debug!(
        lines_read,
        empty = bounds.is_empty(),
        "Scanned program boundaries"
    );
    Ok(bounds)
}

/// Scan an in-memory program
pub fn scan_boundaries_str(program: &str) -> Bounds {
    let mut bounds = Bounds::new();
    for line in program.lines() {
        bounds.include(&extract_position(line));
    }
    bounds
}

/// Scan a program file
///
/// # Errors
/// Returns an I/O error if the file cannot be opened or read
pub fn scan_boundaries_file(path: impl AsRef<Path>) -> Result<Bounds> {
    let path = path.as_ref();
    tracing::info!("Scanning boundaries of {}", path.display());
    let file = File::open(path)?;
    scan_boundaries(BufReader::new(file))
}
