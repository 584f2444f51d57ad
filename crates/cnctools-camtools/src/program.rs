//! Line-oriented G-code program builder

use std::fmt;

/// Accumulates program text one line at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcodeProgram {
    text: String,
}

impl GcodeProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, adding the trailing newline when it is missing
    ///
    /// A line may already end in a newline; that produces a blank line after it.
    pub fn push(&mut self, line: impl AsRef<str>) -> &mut Self {
        let line = line.as_ref();
        self.text.push_str(line);
        if !line.ends_with('\n') {
            self.text.push('\n');
        }
        self
    }

    /// Metric units, absolute positioning
    pub fn g90_preamble(&mut self) -> &mut Self {
        self.text.push_str("G21\nG90\n");
        self
    }

    /// Metric units, relative positioning
    pub fn g91_preamble(&mut self) -> &mut Self {
        self.text.push_str("G21\nG91\n");
        self
    }

    /// Append another program verbatim
    pub fn extend(&mut self, other: &GcodeProgram) -> &mut Self {
        self.text.push_str(&other.text);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for GcodeProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<GcodeProgram> for String {
    fn from(program: GcodeProgram) -> Self {
        program.text
    }
}
