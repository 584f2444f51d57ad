//! Coordinate word extraction
//!
//! A coordinate word is an upper-case axis letter immediately followed by an
//! optional `-`, digits and an optional fractional part (`X-12.5`). Only the
//! first word per axis on a line is used; everything else on the line is
//! ignored, comments included.
//!
//! Lines are handled as raw bytes. Programs from CAM posts often carry Latin-1
//! comments, and those bytes must survive untouched.

use std::io::{self, BufRead};
use std::ops::Range;
use std::sync::OnceLock;

use cnctools_core::{GcodeError, PartialPosition};
use regex::bytes::Regex;

/// Leading commands that carry axis words without moving the tool
pub const IGNORED_PREFIXES: [&str; 4] = ["G21", "G22", "G38", "G10"];

/// A machine axis that can appear in a coordinate word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// The axis letter as written in a program
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }

    fn pattern(self) -> &'static Regex {
        static X_WORD: OnceLock<Regex> = OnceLock::new();
        static Y_WORD: OnceLock<Regex> = OnceLock::new();
        static Z_WORD: OnceLock<Regex> = OnceLock::new();

        match self {
            Axis::X => X_WORD
                .get_or_init(|| Regex::new(r"X(-?\d+(\.\d+)?)").expect("invalid regex pattern")),
            Axis::Y => Y_WORD
                .get_or_init(|| Regex::new(r"Y(-?\d+(\.\d+)?)").expect("invalid regex pattern")),
            Axis::Z => Z_WORD
                .get_or_init(|| Regex::new(r"Z(-?\d+(\.\d+)?)").expect("invalid regex pattern")),
        }
    }
}

/// The first coordinate word for one axis on a line
#[derive(Debug, Clone, PartialEq)]
pub struct AxisWord {
    /// Byte range of the numeric part within the line
    pub span: Range<usize>,
    /// Parsed value, or why the number was rejected
    pub value: Result<f64, GcodeError>,
}

/// Parse the numeric part of a coordinate word
///
/// Values that overflow to infinity are rejected as malformed.
pub fn parse_axis_value(axis: Axis, token: &[u8]) -> Result<f64, GcodeError> {
    let parsed = std::str::from_utf8(token)
        .ok()
        .and_then(|text| text.parse::<f64>().ok());
    match parsed {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(GcodeError::MalformedToken {
            axis: axis.letter(),
            token: String::from_utf8_lossy(token).into_owned(),
        }),
    }
}

/// Locate the first coordinate word for `axis` on `line`
pub fn find_axis_word(line: impl AsRef<[u8]>, axis: Axis) -> Option<AxisWord> {
    let line = line.as_ref();
    let number = axis.pattern().captures(line)?.get(1)?;
    Some(AxisWord {
        span: number.range(),
        value: parse_axis_value(axis, number.as_bytes()),
    })
}

/// Read the value of the first coordinate word for `axis`
///
/// A malformed word is logged and treated as absent.
pub fn axis_value(line: impl AsRef<[u8]>, axis: Axis) -> Option<f64> {
    match find_axis_word(line, axis)?.value {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Ignoring coordinate word: {}", e);
            None
        }
    }
}

/// Extract the X, Y and Z coordinates present on a line
pub fn extract_position(line: impl AsRef<[u8]>) -> PartialPosition {
    let line = line.as_ref();
    PartialPosition {
        x: axis_value(line, Axis::X),
        y: axis_value(line, Axis::Y),
        z: axis_value(line, Axis::Z),
    }
}

/// True for lines the leveler must pass through untouched
///
/// Blank lines and lines starting (case-insensitively) with one of
/// [`IGNORED_PREFIXES`] never update the position or get a height query.
pub fn is_passthrough_line(line: impl AsRef<[u8]>) -> bool {
    let line = line.as_ref();
    if line.iter().all(u8::is_ascii_whitespace) {
        return true;
    }

    line.get(..3).is_some_and(|head| {
        IGNORED_PREFIXES
            .iter()
            .any(|prefix| head.eq_ignore_ascii_case(prefix.as_bytes()))
    })
}

/// Split a program into raw lines
///
/// Like [`BufRead::lines`] the `\n` or `\r\n` terminator is removed, but no
/// UTF-8 decoding takes place, so only genuine read failures are errors.
pub fn program_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<Vec<u8>>> {
    reader.split(b'\n').map(|line| {
        line.map(|mut line| {
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            line
        })
    })
}
