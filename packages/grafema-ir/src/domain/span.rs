//! Source location types.

use serde::{Deserialize, Serialize};

/// A single position in source text (0-indexed -- files are 0-indexed in
/// AST positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A source span (start/end location pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: Location::new(start_line, start_col),
            end: Location::new(end_line, end_col),
        }
    }

    pub fn point(line: u32, column: u32) -> Self {
        Self::new(line, column, line, column)
    }

    pub fn contains_line(&self, line: u32) -> bool {
        self.start.line <= line && line <= self.end.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_line_is_inclusive() {
        let span = Span::new(10, 0, 20, 0);
        assert!(span.contains_line(10));
        assert!(span.contains_line(20));
        assert!(!span.contains_line(9));
        assert!(!span.contains_line(21));
    }
}
