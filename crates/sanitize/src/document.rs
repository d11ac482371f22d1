// ABOUTME: Line-sequence document model used by the sanitizer.
// ABOUTME: Lines keep their original terminators so joining them reproduces the input exactly.

use std::fs;
use std::path::Path;

use crate::error::SanitizeError;

/// A text document held as an ordered sequence of lines.
///
/// Each line carries its own terminator (`\n`, `\r\n`, or nothing for a final
/// unterminated line), so `Document::parse(text).to_text() == text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// Splits text into lines, keeping terminators attached.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    /// Builds a document from already-split lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Joins the lines back into a single string.
    pub fn to_text(&self) -> String {
        self.lines.concat()
    }
}

/// Returns the terminator a line ends with: `"\r\n"`, `"\n"`, or `""`.
pub fn line_terminator(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Reads a document from disk, requiring valid UTF-8.
pub fn read_document(path: &Path) -> Result<String, SanitizeError> {
    let bytes = fs::read(path).map_err(|e| SanitizeError::io(path, e))?;
    String::from_utf8(bytes).map_err(|e| SanitizeError::decode(path, e.utf8_error()))
}

/// Replaces the document at `path` with `text`.
pub fn write_document(path: &Path, text: &str) -> Result<(), SanitizeError> {
    fs::write(path, text).map_err(|e| SanitizeError::io(path, e))
}
