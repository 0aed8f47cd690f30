use somon_common::Position;
use std::fmt;

/// A recoverable parse failure: `spec.md` §4.2's `ParseError{position,
/// expected, found}`. The parser synchronizes after recording one of these
/// and keeps going, so a single `parse()` call can surface several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub position: Position,
    pub expected: String,
    pub found: String,
}

impl ParseError {
    pub fn new(position: Position, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            position,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {}, found {} at {}",
            self.expected, self.found, self.position
        )
    }
}

impl std::error::Error for ParseError {}
