//! Source location tracking
//!
//! Positions are snapshots copied into every character, token and AST node.
//! Offsets are UTF-8 byte offsets into the normalized source; lines and
//! columns are 1-based, with columns counted in visible width.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance past a line break.
    pub fn newline(self, ch: char) -> Self {
        Self {
            offset: self.offset + ch.len_utf8(),
            line: self.line + 1,
            column: 1,
        }
    }

    /// Advance past a character occupying `width` columns.
    pub fn advance(self, ch: char, width: u32) -> Self {
        Self {
            offset: self.offset + ch.len_utf8(),
            line: self.line,
            column: self.column + width,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Zero-width span at a position, used for the END token.
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };

        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };

        Self { start, end }
    }

    /// Get the byte length of this span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Check if this span contains a position
    pub fn contains(&self, pos: Position) -> bool {
        pos.offset >= self.start.offset && pos.offset < self.end.offset
    }

    /// Get the source text for this span, if the offsets fall on the input.
    pub fn slice<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.get(self.start.offset..self.end.offset)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A source map that tracks line starts for error rendering
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// The normalized source text
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Lines end at `\n`, `\r\n` or a lone `\r`, the same breaks the
    /// character stream counts
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];
        let mut chars = source.char_indices().peekable();
        while let Some((offset, ch)) = chars.next() {
            let lone_cr = ch == '\r' && !matches!(chars.peek(), Some((_, '\n')));
            if ch == '\n' || lone_cr {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get a line of text by line number (1-based), without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let line_idx = (line_num as usize).checked_sub(1)?;
        let start = *self.line_starts.get(line_idx)?;
        let end = match self.line_starts.get(line_idx + 1) {
            Some(next) => next - 1,
            None => self.source.len(),
        };

        self.source
            .get(start..end)
            .map(|line| line.trim_end_matches('\r'))
    }

    /// Format an error message with the offending line and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("error: {}\n", message));
        result.push_str(&format!(
            "  --> {}:{}\n",
            span.start.line, span.start.column
        ));

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = span.start.line.to_string();
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("{} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let indent = " ".repeat(span.start.column.saturating_sub(1) as usize);
            let caret_len = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column) as usize
            } else {
                line.chars().count().saturating_sub(indent.len())
            };

            result.push_str(&format!(
                "{} | {}{}\n",
                padding,
                indent,
                "^".repeat(caret_len.max(1))
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let pos = Position::start().advance('a', 1);
        assert_eq!(pos, Position::new(1, 1, 2));

        let pos = pos.advance('é', 1);
        assert_eq!(pos.offset, 3);
        assert_eq!(pos.column, 3);

        let pos = pos.newline('\n');
        assert_eq!(pos, Position::new(4, 2, 1));
    }

    #[test]
    fn test_span_merge_and_slice() {
        let a = Span::new(Position::new(0, 1, 1), Position::new(3, 1, 4));
        let b = Span::new(Position::new(4, 1, 5), Position::new(7, 1, 8));
        let merged = a.merge(b);

        assert_eq!(merged.start, a.start);
        assert_eq!(merged.end, b.end);
        assert_eq!(merged.len(), 7);
        assert_eq!(merged.slice("rgb(255)"), Some("rgb(255"));
        assert!(Span::point(Position::start()).is_empty());
    }

    #[test]
    fn test_source_map_lines() {
        let map = SourceMap::new("let a = 1\r\nlet b = 2".to_string());
        assert_eq!(map.line_count(), 2);
        assert_eq!(map.get_line(1), Some("let a = 1"));
        assert_eq!(map.get_line(2), Some("let b = 2"));
        assert_eq!(map.get_line(0), None);
        assert_eq!(map.get_line(3), None);

        let map = SourceMap::new("a\rb\r\nc\n".to_string());
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.get_line(2), Some("b"));
        assert_eq!(map.get_line(3), Some("c"));
        assert_eq!(map.get_line(4), Some(""));
    }

    #[test]
    fn test_format_error_underlines_span() {
        let map = SourceMap::new("1 + foo".to_string());
        let span = Span::new(Position::new(4, 1, 5), Position::new(7, 1, 8));
        let rendered = map.format_error(&span, "unexpected identifier");

        assert!(rendered.contains("error: unexpected identifier"));
        assert!(rendered.contains("--> 1:5"));
        assert!(rendered.contains("1 | 1 + foo"));
        assert!(rendered.contains("  |     ^^^"));
    }
}
