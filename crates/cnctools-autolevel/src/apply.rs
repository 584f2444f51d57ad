//! Height map application
//!
//! Walks a program line by line, tracking the absolute tool position (axis
//! words are optional and carry over from earlier lines) and correcting every
//! motion line for the probed surface height under it.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use cnctools_core::{CorrectionMode, GcodeError, Position, Result};

use crate::coords::{
    extract_position, find_axis_word, is_passthrough_line, program_lines, Axis,
};
use crate::heightmap::{HeightMap, HeightSource};

/// Counters from one leveling pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelingStats {
    /// Total lines read
    pub lines_read: usize,
    /// Lines that received a height correction
    pub lines_leveled: usize,
    /// Blank and non-motion lines copied unchanged
    pub lines_passed_through: usize,
}

/// Per-pass leveling state
///
/// Holds the running tool position for one pass over one program. Feed it lines
/// in order with [`Leveler::process_line`]; a fresh `Leveler` starts at the
/// origin.
#[derive(Debug, Clone)]
pub struct Leveler<'a> {
    map: &'a HeightMap,
    mode: CorrectionMode,
    position: Position,
    stats: LevelingStats,
}

impl<'a> Leveler<'a> {
    /// Start a pass at the origin
    pub fn new(map: &'a HeightMap, mode: CorrectionMode) -> Self {
        Self::with_position(map, mode, Position::default())
    }

    /// Start a pass from a known position
    pub fn with_position(map: &'a HeightMap, mode: CorrectionMode, position: Position) -> Self {
        Self {
            map,
            mode,
            position,
            stats: LevelingStats::default(),
        }
    }

    /// Current running position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Counters so far
    pub fn stats(&self) -> LevelingStats {
        self.stats
    }

    /// Level one line and return the output line
    ///
    /// # Errors
    /// Returns [`GcodeError::InvalidLine`] when the height under the tool cannot
    /// be determined. The position has already been updated from the line.
    pub fn process_line(&mut self, line: &str) -> Result<String> {
        let output = self.process_bytes(line.as_bytes())?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    /// Level one raw line
    ///
    /// Bytes outside the coordinate words are copied through unchanged, whatever
    /// their encoding.
    ///
    /// # Errors
    /// Same as [`Leveler::process_line`]
    pub fn process_bytes(&mut self, line: &[u8]) -> Result<Vec<u8>> {
        self.stats.lines_read += 1;

        if is_passthrough_line(line) {
            self.stats.lines_passed_through += 1;
            return Ok(line.to_vec());
        }

        let coords = extract_position(line);
        self.position.apply(&coords);

        let estimate = self
            .map
            .estimate(self.position.x, self.position.y)
            .map_err(|source| GcodeError::InvalidLine {
                line_number: self.stats.lines_read,
                source,
            })?;

        if estimate.source == HeightSource::Exact {
            tracing::trace!(
                x = self.position.x,
                y = self.position.y,
                "Height taken from probed sample"
            );
        }

        let offset = estimate.z;
        let corrected = self.position.z + offset;

        let output = match self.mode {
            CorrectionMode::Annotate => {
                let mut output = line.to_vec();
                output.extend_from_slice(
                    format!(
                        " ; {:.3} + {:.3} -> {:.3}",
                        self.position.z, offset, corrected
                    )
                    .as_bytes(),
                );
                output
            }
            CorrectionMode::Rewrite => {
                if coords.is_empty() {
                    self.stats.lines_passed_through += 1;
                    return Ok(line.to_vec());
                }
                rewrite_z(line, corrected)
            }
        };

        self.stats.lines_leveled += 1;
        Ok(output)
    }
}

/// Replace the Z word's value with `z`, or append a Z word when there is none
///
/// A malformed Z word counts as absent, matching how the position was tracked.
fn rewrite_z(line: &[u8], z: f64) -> Vec<u8> {
    let value = format!("{:.3}", z);
    let mut output = Vec::with_capacity(line.len() + value.len() + 2);

    match find_axis_word(line, Axis::Z).filter(|word| word.value.is_ok()) {
        Some(word) => {
            output.extend_from_slice(&line[..word.span.start]);
            output.extend_from_slice(value.as_bytes());
            output.extend_from_slice(&line[word.span.end..]);
        }
        None => match line.iter().position(|&b| b == b';') {
            Some(comment) => {
                output.extend_from_slice(line[..comment].trim_ascii_end());
                output.extend_from_slice(format!(" Z{} ", value).as_bytes());
                output.extend_from_slice(&line[comment..]);
            }
            None => {
                output.extend_from_slice(line.trim_ascii_end());
                output.extend_from_slice(format!(" Z{}", value).as_bytes());
            }
        },
    }
    output
}

/// Level an in-memory program, annotating each motion line
///
/// # Errors
/// Fails on the first line whose height cannot be determined
pub fn apply_height_map(program: &str, map: &HeightMap) -> Result<Vec<String>> {
    apply_height_map_with_mode(program, map, CorrectionMode::Annotate)
}

/// Level an in-memory program in the given mode
///
/// # Errors
/// Fails on the first line whose height cannot be determined
pub fn apply_height_map_with_mode(
    program: &str,
    map: &HeightMap,
    mode: CorrectionMode,
) -> Result<Vec<String>> {
    let mut leveler = Leveler::new(map, mode);
    program
        .lines()
        .map(|line| leveler.process_line(line))
        .collect()
}

/// Level a program read line by line
///
/// Lines that are not valid UTF-8 are converted lossily. Use
/// [`apply_height_map_to_writer`] to keep their bytes intact.
///
/// # Errors
/// Fails on read errors and on the first line whose height cannot be determined
pub fn apply_height_map_reader<R: BufRead>(
    reader: R,
    map: &HeightMap,
    mode: CorrectionMode,
) -> Result<Vec<String>> {
    let mut leveler = Leveler::new(map, mode);
    let mut output = Vec::new();
    for line in program_lines(reader) {
        let leveled = leveler.process_bytes(&line?)?;
        output.push(String::from_utf8_lossy(&leveled).into_owned());
    }
    Ok(output)
}

/// Level a program file
///
/// # Errors
/// Fails when the file cannot be read or a line cannot be leveled
pub fn apply_height_map_file(
    path: impl AsRef<Path>,
    map: &HeightMap,
    mode: CorrectionMode,
) -> Result<Vec<String>> {
    let file = File::open(path.as_ref())?;
    apply_height_map_reader(BufReader::new(file), map, mode)
}

/// Level a program, writing each output line as soon as it is produced
///
/// Each line's original bytes are written back, so comments in any encoding
/// survive. On failure every line before the failing one has already been
/// written, so the output is a valid but truncated program.
///
/// # Errors
/// Fails on read/write errors and on the first line that cannot be leveled
pub fn apply_height_map_to_writer<R: BufRead, W: Write>(
    reader: R,
    map: &HeightMap,
    mode: CorrectionMode,
    mut writer: W,
) -> Result<LevelingStats> {
    let mut leveler = Leveler::new(map, mode);

    for line in program_lines(reader) {
        let output = match leveler.process_bytes(&line?) {
            Ok(output) => output,
            Err(e) => {
                writer.flush()?;
                tracing::error!(
                    lines_written = leveler.stats().lines_read - 1,
                    "Leveling stopped: {}",
                    e
                );
                return Err(e);
            }
        };
        writer.write_all(&output)?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    let stats = leveler.stats();
    tracing::info!(
        lines_read = stats.lines_read,
        lines_leveled = stats.lines_leveled,
        lines_passed_through = stats.lines_passed_through,
        %mode,
        "Height map applied"
    );
    Ok(stats)
}
