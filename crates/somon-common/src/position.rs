use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based line/column location attached to every token and AST node.
///
/// Unlike a byte-offset span, `Position` is tracked directly as we scan —
/// a tab counts as one column, matching the source's visual layout rather
/// than its byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        debug_assert!(line >= 1 && column >= 1, "position is 1-based");
        Self { line, column }
    }

    pub const fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Advance by one column.
    pub fn advance_column(&mut self) {
        self.column += 1;
    }

    /// Advance to the start of the next line.
    pub fn advance_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one_one() {
        assert_eq!(Position::start(), Position::new(1, 1));
    }

    #[test]
    fn advance_column_increments() {
        let mut p = Position::start();
        p.advance_column();
        p.advance_column();
        assert_eq!(p, Position::new(1, 3));
    }

    #[test]
    fn advance_line_resets_column() {
        let mut p = Position::new(2, 7);
        p.advance_line();
        assert_eq!(p, Position::new(3, 1));
    }

    #[test]
    fn display_format() {
        assert_eq!(Position::new(4, 9).to_string(), "4:9");
    }

    #[test]
    fn ordering_is_line_major() {
        assert!(Position::new(1, 99) < Position::new(2, 1));
    }
}
