//! Position-tracking character stream with backtracking
//!
//! The stream owns the NFC-normalized source and an append-only history of
//! consumed characters. The cursor always sits at `history.len()` code points
//! into the source, so rewinding is a truncation of the history followed by
//! recomputing the cursor position from the new tail. Marks are saved history
//! lengths on a LIFO stack.

use super::classifier::{classify_char, visible_width, CharKind};
use crate::logging::codes;
use crate::utils::{Position, SourceMap};
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("Invalid argument to {operation}: {value} must not be negative (at {position})")]
    InvalidArgument {
        operation: &'static str,
        value: isize,
        position: Position,
    },

    #[error("Cannot rewind {requested} characters, only {available} consumed (at {position})")]
    RewindUnderflow {
        requested: usize,
        available: usize,
        position: Position,
    },

    #[error("{operation} called with no active mark (at {position})")]
    NoActiveMark {
        operation: &'static str,
        position: Position,
    },
}

impl StreamError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            StreamError::InvalidArgument { .. } => codes::stream::INVALID_ARGUMENT,
            StreamError::RewindUnderflow { .. } => codes::stream::REWIND_UNDERFLOW,
            StreamError::NoActiveMark { .. } => codes::stream::NO_ACTIVE_MARK,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            StreamError::InvalidArgument { position, .. }
            | StreamError::RewindUnderflow { position, .. }
            | StreamError::NoActiveMark { position, .. } => *position,
        }
    }
}

/// One classified character and where it starts. `value` is `None` only for
/// the end-of-stream marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    pub value: Option<char>,
    pub kind: CharKind,
    pub position: Position,
}

impl Character {
    pub fn new(value: char, position: Position) -> Self {
        Self {
            value: Some(value),
            kind: classify_char(value),
            position,
        }
    }

    pub fn end_of_stream(position: Position) -> Self {
        Self {
            value: None,
            kind: CharKind::EndOfStream,
            position,
        }
    }

    pub fn is_end(&self) -> bool {
        self.value.is_none()
    }

    /// Raw value as a string, empty at end of stream
    pub fn text(&self) -> String {
        self.value.map(String::from).unwrap_or_default()
    }
}

/// Concatenate the values of a run of characters
pub fn text_of(chars: &[Character]) -> String {
    chars.iter().filter_map(|c| c.value).collect()
}

/// Position after `ch`, given the character that follows it. A CR directly
/// followed by LF does not start a new line on its own.
fn step(position: Position, ch: char, next: Option<char>) -> Position {
    match ch {
        '\n' => position.newline(ch),
        '\r' if next == Some('\n') => position.advance(ch, 0),
        '\r' => position.newline(ch),
        _ => position.advance(ch, visible_width(ch)),
    }
}

#[derive(Debug, Clone)]
pub struct CharacterStream {
    source: String,
    chars: Vec<char>,
    history: Vec<Character>,
    marks: Vec<usize>,
    position: Position,
}

impl CharacterStream {
    pub fn new(text: &str) -> Self {
        let source: String = text.nfc().collect();
        let chars = source.chars().collect();

        Self {
            source,
            chars,
            history: Vec::new(),
            marks: Vec::new(),
            position: Position::start(),
        }
    }

    /// Replace the source and rewind to its start. Marks are discarded.
    pub fn reload(&mut self, text: &str) {
        *self = Self::new(text);
    }

    /// Normalized source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Line map over the normalized text, which is what positions refer to
    pub fn source_map(&self) -> SourceMap {
        SourceMap::new(self.source.clone())
    }

    /// Position of the next character to be consumed
    pub fn position(&self) -> Position {
        self.position
    }

    /// Code point index of the cursor
    pub fn index(&self) -> usize {
        self.history.len()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn history(&self) -> &[Character] {
        &self.history
    }

    pub fn mark_depth(&self) -> usize {
        self.marks.len()
    }

    /// True when `index` (or the cursor) is at or past the end of the source
    pub fn is_end_of_stream(&self, index: Option<usize>) -> bool {
        index.unwrap_or(self.history.len()) >= self.chars.len()
    }

    /// Consume and return the current character. Once exhausted, every call
    /// returns an end-of-stream marker at the end position.
    pub fn next_char(&mut self) -> Character {
        let index = self.history.len();
        let Some(&ch) = self.chars.get(index) else {
            return Character::end_of_stream(self.position);
        };

        let character = Character::new(ch, self.position);
        self.position = step(self.position, ch, self.chars.get(index + 1).copied());
        self.history.push(character.clone());
        character
    }

    /// Character `n` steps ahead of the cursor without consuming anything.
    /// `peek(0)` is the character the next `next_char` would return.
    pub fn peek(&self, n: isize) -> Result<Character, StreamError> {
        let n = usize::try_from(n).map_err(|_| StreamError::InvalidArgument {
            operation: "peek",
            value: n,
            position: self.position,
        })?;

        let start = self.history.len();
        let mut position = self.position;

        for offset in 0..n {
            let Some(&ch) = self.chars.get(start + offset) else {
                return Ok(Character::end_of_stream(position));
            };
            position = step(position, ch, self.chars.get(start + offset + 1).copied());
        }

        Ok(match self.chars.get(start + n) {
            Some(&ch) => Character::new(ch, position),
            None => Character::end_of_stream(position),
        })
    }

    /// Raw value `n` steps ahead, empty at end of stream
    pub fn lookahead(&self, n: isize) -> Result<String, StreamError> {
        self.peek(n).map(|c| c.text())
    }

    /// Maximal trailing run of consumed characters matching `pred`, in
    /// forward order. Does not change the stream.
    pub fn lookback_while<F>(&self, pred: F) -> Vec<Character>
    where
        F: Fn(&Character) -> bool,
    {
        let run = self
            .history
            .iter()
            .rev()
            .take_while(|c| pred(c))
            .count();

        self.history[self.history.len() - run..].to_vec()
    }

    /// Consume characters while `pred` holds and return them
    pub fn consume_while<F>(&mut self, pred: F) -> Vec<Character>
    where
        F: Fn(&Character) -> bool,
    {
        let mut consumed = Vec::new();

        while let Some(&ch) = self.chars.get(self.history.len()) {
            if !pred(&Character::new(ch, self.position)) {
                break;
            }
            consumed.push(self.next_char());
        }

        consumed
    }

    /// Un-consume `steps` characters. Zero or negative is a no-op.
    pub fn back(&mut self, steps: isize) -> Result<(), StreamError> {
        if steps <= 0 {
            return Ok(());
        }

        let steps = steps.unsigned_abs();
        let available = self.history.len();
        if steps > available {
            return Err(StreamError::RewindUnderflow {
                requested: steps,
                available,
                position: self.position,
            });
        }

        self.truncate_history(available - steps);
        Ok(())
    }

    /// Save the current history length
    pub fn mark(&mut self) {
        self.marks.push(self.history.len());
    }

    /// Drop the innermost mark, keeping all progress made since
    pub fn commit(&mut self) -> Result<(), StreamError> {
        self.marks
            .pop()
            .map(|_| ())
            .ok_or(StreamError::NoActiveMark {
                operation: "commit",
                position: self.position,
            })
    }

    /// Rewind to the innermost mark and drop it
    pub fn reset(&mut self) -> Result<(), StreamError> {
        let length = self.marks.pop().ok_or(StreamError::NoActiveMark {
            operation: "reset",
            position: self.position,
        })?;

        self.truncate_history(length);
        Ok(())
    }

    /// Run `attempt` speculatively: progress is kept when it returns `Some`
    /// and rolled back when it returns `None`.
    ///
    /// Marks the attempt sets or releases are confined to it. Releasing a mark
    /// the caller set before the attempt is an error.
    pub fn speculate<T, F>(&mut self, attempt: F) -> Result<Option<T>, StreamError>
    where
        F: FnOnce(&mut Self) -> Option<T>,
    {
        let outer = self.marks.len();
        let start = self.history.len();
        self.mark();

        let result = attempt(self);

        if self.marks.len() < outer {
            return Err(StreamError::NoActiveMark {
                operation: "speculate",
                position: self.position,
            });
        }
        self.marks.truncate(outer);

        if result.is_none() {
            self.truncate_history(start);
        }
        Ok(result)
    }

    fn truncate_history(&mut self, length: usize) {
        self.history.truncate(length);
        self.position = match self.history.last() {
            Some(tail) => match tail.value {
                Some(ch) => step(tail.position, ch, self.chars.get(length).copied()),
                None => tail.position,
            },
            None => Position::start(),
        };
    }
}

impl Iterator for CharacterStream {
    type Item = Character;

    fn next(&mut self) -> Option<Character> {
        let character = self.next_char();
        (!character.is_end()).then_some(character)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn drain(stream: &mut CharacterStream) -> String {
        let mut out = String::new();
        loop {
            let c = stream.next_char();
            if c.is_end() {
                return out;
            }
            out.push_str(&c.text());
        }
    }

    #[test]
    fn test_next_reproduces_source() {
        let mut stream = CharacterStream::new("rgb(255, 0, 0)\n/* é 😀 */");
        assert_eq!(drain(&mut stream), "rgb(255, 0, 0)\n/* é 😀 */");
        assert!(stream.next_char().is_end());
        assert!(stream.next_char().is_end());
    }

    #[test]
    fn test_source_is_nfc_normalized() {
        let mut stream = CharacterStream::new("e\u{0301}");
        assert_eq!(stream.source(), "é");
        assert_eq!(stream.len(), 1);
        assert_eq!(drain(&mut stream), "é");
    }

    #[test]
    fn test_position_tracking() {
        let mut stream = CharacterStream::new("a😀b\nc\r\nd");

        assert_eq!(stream.next_char().position, Position::new(0, 1, 1));
        assert_eq!(stream.next_char().position, Position::new(1, 1, 2));
        // emoji occupies two columns and four bytes
        assert_eq!(stream.next_char().position, Position::new(5, 1, 4));
        assert_eq!(stream.next_char().kind, CharKind::NewLine);
        assert_eq!(stream.next_char().position, Position::new(7, 2, 1));

        // CRLF counts as a single line break
        stream.next_char();
        stream.next_char();
        let d = stream.next_char();
        assert_eq!(d.value, Some('d'));
        assert_eq!(d.position, Position::new(10, 3, 1));
        assert_eq!(stream.next_char().position, Position::new(11, 3, 2));
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let mut stream = CharacterStream::new("abc");
        stream.next_char();
        stream.mark();
        let before = (stream.position(), stream.index(), stream.mark_depth());

        assert_eq!(stream.peek(0).unwrap().value, Some('b'));
        assert_eq!(stream.peek(1).unwrap().value, Some('c'));
        assert_eq!(stream.peek(1).unwrap().position, Position::new(2, 1, 3));
        let end = stream.peek(5).unwrap();
        assert!(end.is_end());
        assert_eq!(end.position, Position::new(3, 1, 4));

        assert_eq!(
            (stream.position(), stream.index(), stream.mark_depth()),
            before
        );
        assert_eq!(stream.history().len(), 1);
    }

    #[test]
    fn test_peek_negative_is_invalid_argument() {
        let stream = CharacterStream::new("abc");
        assert_matches!(
            stream.peek(-1),
            Err(StreamError::InvalidArgument { value: -1, .. })
        );
        assert_matches!(stream.lookahead(-3), Err(StreamError::InvalidArgument { .. }));
    }

    #[test]
    fn test_lookahead_returns_raw_values() {
        let stream = CharacterStream::new("#f0");
        assert_eq!(stream.lookahead(0).unwrap(), "#");
        assert_eq!(stream.lookahead(2).unwrap(), "0");
        assert_eq!(stream.lookahead(3).unwrap(), "");
    }

    #[test]
    fn test_lookback_while_collects_trailing_run() {
        let mut stream = CharacterStream::new("ab12");
        drain(&mut stream);

        let run = stream.lookback_while(|c| c.kind == CharKind::Number);
        assert_eq!(text_of(&run), "12");
        assert_eq!(run[0].position.column, 3);

        let none = stream.lookback_while(|c| c.kind == CharKind::Whitespace);
        assert!(none.is_empty());
        assert_eq!(stream.history().len(), 4);
    }

    #[test]
    fn test_consume_while() {
        let mut stream = CharacterStream::new("abc123");
        let letters = stream.consume_while(|c| c.kind == CharKind::Letter);
        assert_eq!(text_of(&letters), "abc");
        assert_eq!(stream.peek(0).unwrap().value, Some('1'));

        let rest = stream.consume_while(|_| true);
        assert_eq!(text_of(&rest), "123");
        assert!(stream.is_end_of_stream(None));
    }

    #[test]
    fn test_back_restores_position() {
        let mut stream = CharacterStream::new("ab\ncd");
        stream.next_char();
        let before = stream.position();

        for _ in 0..3 {
            stream.next_char();
        }
        stream.back(3).unwrap();

        assert_eq!(stream.position(), before);
        assert_eq!(stream.index(), 1);
        assert_eq!(stream.next_char().value, Some('b'));
    }

    #[test]
    fn test_back_edge_cases() {
        let mut stream = CharacterStream::new("ab");
        stream.next_char();

        stream.back(0).unwrap();
        stream.back(-2).unwrap();
        assert_eq!(stream.index(), 1);

        assert_matches!(
            stream.back(2),
            Err(StreamError::RewindUnderflow {
                requested: 2,
                available: 1,
                ..
            })
        );

        stream.back(1).unwrap();
        assert_eq!(stream.position(), Position::start());
    }

    #[test]
    fn test_mark_commit_keeps_progress() {
        let mut stream = CharacterStream::new("abcdef");
        stream.mark();
        stream.next_char();
        stream.next_char();
        let after = stream.position();

        stream.commit().unwrap();
        assert_eq!(stream.position(), after);
        assert_eq!(stream.mark_depth(), 0);
    }

    #[test]
    fn test_mark_reset_replays_identically() {
        let mut stream = CharacterStream::new("x😀\ny");
        stream.next_char();
        let before = stream.position();

        stream.mark();
        let first: Vec<_> = (0..3).map(|_| stream.next_char()).collect();
        stream.reset().unwrap();

        assert_eq!(stream.position(), before);
        let second: Vec<_> = (0..3).map(|_| stream.next_char()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nested_marks_reset_innermost() {
        let mut stream = CharacterStream::new("abcdef");
        stream.mark();
        stream.next_char();
        stream.mark();
        stream.next_char();
        stream.next_char();

        stream.reset().unwrap();
        assert_eq!(stream.index(), 1);
        stream.reset().unwrap();
        assert_eq!(stream.index(), 0);

        assert_matches!(stream.reset(), Err(StreamError::NoActiveMark { .. }));
        assert_matches!(
            stream.commit(),
            Err(StreamError::NoActiveMark {
                operation: "commit",
                ..
            })
        );
    }

    #[test]
    fn test_speculate() {
        let mut stream = CharacterStream::new("u{41}x");

        let miss = stream
            .speculate(|s| {
                s.next_char();
                None::<()>
            })
            .unwrap();
        assert!(miss.is_none());
        assert_eq!(stream.index(), 0);

        let hit = stream
            .speculate(|s| {
                let run = s.consume_while(|c| c.value != Some('x'));
                Some(text_of(&run))
            })
            .unwrap();
        assert_eq!(hit.as_deref(), Some("u{41}"));
        assert_eq!(stream.mark_depth(), 0);
        assert_eq!(stream.peek(0).unwrap().value, Some('x'));
    }

    #[test]
    fn test_speculate_keeps_outer_marks() {
        let mut stream = CharacterStream::new("abcd");
        stream.mark();

        // the attempt releases its own mark
        let hit = stream
            .speculate(|s| {
                s.next_char();
                s.commit().ok()?;
                Some(())
            })
            .unwrap();
        assert!(hit.is_some());
        assert_eq!(stream.mark_depth(), 1);
        assert_eq!(stream.index(), 1);

        let miss = stream
            .speculate(|s| {
                s.next_char();
                s.mark();
                s.next_char();
                None::<()>
            })
            .unwrap();
        assert!(miss.is_none());
        assert_eq!(stream.mark_depth(), 1);
        assert_eq!(stream.index(), 1);

        stream.reset().unwrap();
        assert_eq!(stream.index(), 0);
        assert_eq!(stream.mark_depth(), 0);
    }

    #[test]
    fn test_speculate_cannot_release_caller_mark() {
        let mut stream = CharacterStream::new("ab");
        stream.mark();

        let result = stream.speculate(|s| {
            s.commit().ok()?;
            s.commit().ok()?;
            Some(())
        });
        assert_matches!(
            result,
            Err(StreamError::NoActiveMark {
                operation: "speculate",
                ..
            })
        );
    }

    #[test]
    fn test_reload_and_end_checks() {
        let mut stream = CharacterStream::new("ab");
        stream.next_char();
        stream.mark();
        stream.reload("xyz");

        assert_eq!(stream.index(), 0);
        assert_eq!(stream.mark_depth(), 0);
        assert!(!stream.is_end_of_stream(None));
        assert!(stream.is_end_of_stream(Some(3)));
        assert!(!stream.is_end_of_stream(Some(2)));
        assert_eq!(stream.by_ref().count(), 3);
    }
}
