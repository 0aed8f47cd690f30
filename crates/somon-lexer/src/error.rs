use somon_common::Position;
use std::fmt;

/// Failure mode of `tokenize`: an unterminated string/template, an invalid
/// number literal, or an unknown character. Tokenization halts on the first
/// one (`spec.md` §7: lex errors "halt further tokens").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub position: Position,
    pub message: String,
}

impl LexError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

impl std::error::Error for LexError {}
