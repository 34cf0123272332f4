//! Common types and utilities used throughout the checker

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Line index over trace text
#[derive(Debug, Clone)]
pub struct SourceText {
    /// File path (or "<input>")
    pub path: String,
    /// Line start byte offsets
    line_starts: Vec<usize>,
}

impl SourceText {
    pub fn new(path: impl Into<String>, content: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            path: path.into(),
            line_starts,
        }
    }

    /// Get line and column for a byte offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts.get(line).copied().unwrap_or(0);
        (line + 1, col + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len_saturates() {
        assert_eq!(Span::new(4, 2).len(), 0);
        assert!(Span::dummy().is_empty());
    }

    #[test]
    fn test_source_line_col() {
        let src = SourceText::new("t.trace", "bind(s)\nuse(s)\nend_scope");
        assert_eq!(src.line_col(0), (1, 1));
        assert_eq!(src.line_col(5), (1, 6));
        assert_eq!(src.line_col(8), (2, 1));
        assert_eq!(src.line_col(15), (3, 1));
        assert_eq!(src.line_col(24), (3, 10));
    }
}
