//! Character classification
//!
//! Maps one character to a closed [`CharKind`]. Rules are applied in a fixed
//! order and the first match wins:
//!
//! 1. empty input is `EndOfStream`, missing input is `Error`
//! 2. CR and LF are `NewLine`, other whitespace is `Whitespace`
//! 3. Unicode letters, then numbers, then emoji presentation, then currency
//! 4. a fixed table of ASCII punctuation, each with its own kind
//! 5. remaining Unicode punctuation and symbols
//! 6. any other non-ASCII code point is `Unicode`, anything else `Other`
//!
//! Classification never fails and is deterministic. Because currency is
//! checked before the ASCII table, `$` classifies as `Currency`.

use regex::{RegexSet, SetMatches};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharKind {
    EndOfStream,
    Error,
    Whitespace,
    NewLine,
    Letter,
    Number,
    Emoji,
    Currency,

    Hash,
    Percent,
    Slash,
    Comma,
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Asterisk,
    Dot,
    Backtick,
    SingleQuote,
    DoubleQuote,
    Backslash,
    Tilde,
    Exclamation,
    At,
    Dollar,
    Question,
    Caret,
    Ampersand,
    LessThan,
    GreaterThan,
    Underscore,
    Equals,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Semicolon,
    Colon,
    Pipe,

    Punctuation,
    Symbol,
    Unicode,
    Other,
}

impl CharKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CharKind::EndOfStream => "EndOfStream",
            CharKind::Error => "Error",
            CharKind::Whitespace => "Whitespace",
            CharKind::NewLine => "NewLine",
            CharKind::Letter => "Letter",
            CharKind::Number => "Number",
            CharKind::Emoji => "Emoji",
            CharKind::Currency => "Currency",
            CharKind::Hash => "Hash",
            CharKind::Percent => "Percent",
            CharKind::Slash => "Slash",
            CharKind::Comma => "Comma",
            CharKind::LeftParen => "LeftParen",
            CharKind::RightParen => "RightParen",
            CharKind::Plus => "Plus",
            CharKind::Minus => "Minus",
            CharKind::Asterisk => "Asterisk",
            CharKind::Dot => "Dot",
            CharKind::Backtick => "Backtick",
            CharKind::SingleQuote => "SingleQuote",
            CharKind::DoubleQuote => "DoubleQuote",
            CharKind::Backslash => "Backslash",
            CharKind::Tilde => "Tilde",
            CharKind::Exclamation => "Exclamation",
            CharKind::At => "At",
            CharKind::Dollar => "Dollar",
            CharKind::Question => "Question",
            CharKind::Caret => "Caret",
            CharKind::Ampersand => "Ampersand",
            CharKind::LessThan => "LessThan",
            CharKind::GreaterThan => "GreaterThan",
            CharKind::Underscore => "Underscore",
            CharKind::Equals => "Equals",
            CharKind::LeftBracket => "LeftBracket",
            CharKind::RightBracket => "RightBracket",
            CharKind::LeftBrace => "LeftBrace",
            CharKind::RightBrace => "RightBrace",
            CharKind::Semicolon => "Semicolon",
            CharKind::Colon => "Colon",
            CharKind::Pipe => "Pipe",
            CharKind::Punctuation => "Punctuation",
            CharKind::Symbol => "Symbol",
            CharKind::Unicode => "Unicode",
            CharKind::Other => "Other",
        }
    }

    /// Whitespace other than line breaks
    pub fn is_whitespace(&self) -> bool {
        *self == CharKind::Whitespace
    }

    pub fn is_end(&self) -> bool {
        *self == CharKind::EndOfStream
    }

    /// Kinds that come from the fixed ASCII punctuation table
    pub fn is_named_punctuation(&self) -> bool {
        ascii_table().iter().any(|(_, kind)| kind == self)
    }
}

impl fmt::Display for CharKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed ASCII punctuation table
fn ascii_table() -> &'static [(char, CharKind)] {
    &[
        ('#', CharKind::Hash),
        ('%', CharKind::Percent),
        ('/', CharKind::Slash),
        (',', CharKind::Comma),
        ('(', CharKind::LeftParen),
        (')', CharKind::RightParen),
        ('+', CharKind::Plus),
        ('-', CharKind::Minus),
        ('*', CharKind::Asterisk),
        ('.', CharKind::Dot),
        ('`', CharKind::Backtick),
        ('\'', CharKind::SingleQuote),
        ('"', CharKind::DoubleQuote),
        ('\\', CharKind::Backslash),
        ('~', CharKind::Tilde),
        ('!', CharKind::Exclamation),
        ('@', CharKind::At),
        ('$', CharKind::Dollar),
        ('?', CharKind::Question),
        ('^', CharKind::Caret),
        ('&', CharKind::Ampersand),
        ('<', CharKind::LessThan),
        ('>', CharKind::GreaterThan),
        ('_', CharKind::Underscore),
        ('=', CharKind::Equals),
        ('[', CharKind::LeftBracket),
        (']', CharKind::RightBracket),
        ('{', CharKind::LeftBrace),
        ('}', CharKind::RightBrace),
        (';', CharKind::Semicolon),
        (':', CharKind::Colon),
        ('|', CharKind::Pipe),
    ]
}

fn ascii_kind(c: char) -> Option<CharKind> {
    ascii_table()
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, kind)| *kind)
}

// Indices into the property set
const LETTER: usize = 0;
const NUMBER: usize = 1;
const EMOJI: usize = 2;
const CURRENCY: usize = 3;
const PUNCTUATION: usize = 4;
const SYMBOL: usize = 5;
const ZERO_WIDTH: usize = 6;

static PROPERTIES: OnceLock<Option<RegexSet>> = OnceLock::new();

/// Unicode property tests, compiled once. `None` only if the patterns fail
/// to compile, in which case the property rules are skipped.
fn properties() -> Option<&'static RegexSet> {
    PROPERTIES
        .get_or_init(|| {
            RegexSet::new([
                r"^\p{L}$",
                r"^\p{N}$",
                r"^\p{Emoji_Presentation}$",
                r"^\p{Sc}$",
                r"^\p{P}$",
                r"^\p{S}$",
                r"^[\p{Mn}\p{Me}\p{Cf}]$",
            ])
            .ok()
        })
        .as_ref()
}

fn property_matches(c: char) -> Option<SetMatches> {
    let mut buf = [0u8; 4];
    properties().map(|set| set.matches(c.encode_utf8(&mut buf)))
}

/// Classify a single character
pub fn classify_char(c: char) -> CharKind {
    if c == '\r' || c == '\n' {
        return CharKind::NewLine;
    }
    if c.is_whitespace() {
        return CharKind::Whitespace;
    }

    let matches = property_matches(c);
    let has = |index: usize| matches.as_ref().is_some_and(|m| m.matched(index));

    if has(LETTER) {
        CharKind::Letter
    } else if has(NUMBER) {
        CharKind::Number
    } else if has(EMOJI) {
        CharKind::Emoji
    } else if has(CURRENCY) {
        CharKind::Currency
    } else if let Some(kind) = ascii_kind(c) {
        kind
    } else if has(PUNCTUATION) {
        CharKind::Punctuation
    } else if has(SYMBOL) {
        CharKind::Symbol
    } else if !c.is_ascii() {
        CharKind::Unicode
    } else {
        CharKind::Other
    }
}

/// Classify a one-character string. `None` is `Error`, the empty string is
/// `EndOfStream` and input longer than one code point is `Error`.
pub fn classify(input: Option<&str>) -> CharKind {
    let Some(text) = input else {
        return CharKind::Error;
    };

    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (None, _) => CharKind::EndOfStream,
        (Some(c), None) => classify_char(c),
        (Some(_), Some(_)) => CharKind::Error,
    }
}

/// Columns a character occupies: 2 for emoji presentation, 0 for combining
/// marks and format controls, 1 otherwise.
pub fn visible_width(c: char) -> u32 {
    if c.is_ascii() {
        return 1;
    }

    match property_matches(c) {
        Some(m) if m.matched(EMOJI) => 2,
        Some(m) if m.matched(ZERO_WIDTH) => 0,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_inputs() {
        assert_eq!(classify(None), CharKind::Error);
        assert_eq!(classify(Some("")), CharKind::EndOfStream);
        assert_eq!(classify(Some("ab")), CharKind::Error);
    }

    #[test]
    fn test_whitespace_and_newlines() {
        assert_eq!(classify(Some("\n")), CharKind::NewLine);
        assert_eq!(classify(Some("\r")), CharKind::NewLine);
        assert_eq!(classify(Some(" ")), CharKind::Whitespace);
        assert_eq!(classify(Some("\t")), CharKind::Whitespace);
        assert_eq!(classify_char('\u{00A0}'), CharKind::Whitespace);
    }

    #[test]
    fn test_unicode_categories() {
        assert_eq!(classify_char('a'), CharKind::Letter);
        assert_eq!(classify_char('Ж'), CharKind::Letter);
        assert_eq!(classify_char('漢'), CharKind::Letter);
        assert_eq!(classify_char('7'), CharKind::Number);
        assert_eq!(classify_char('½'), CharKind::Number);
        assert_eq!(classify_char('😀'), CharKind::Emoji);
        assert_eq!(classify_char('€'), CharKind::Currency);
        assert_eq!(classify_char('«'), CharKind::Punctuation);
        assert_eq!(classify_char('©'), CharKind::Symbol);
        assert_eq!(classify_char('\u{0301}'), CharKind::Unicode);
        assert_eq!(classify_char('\u{0007}'), CharKind::Other);
    }

    #[test]
    fn test_ascii_table() {
        assert_eq!(classify_char('#'), CharKind::Hash);
        assert_eq!(classify_char('%'), CharKind::Percent);
        assert_eq!(classify_char('('), CharKind::LeftParen);
        assert_eq!(classify_char('"'), CharKind::DoubleQuote);
        assert_eq!(classify_char('\\'), CharKind::Backslash);
        assert_eq!(classify_char('_'), CharKind::Underscore);
        assert_eq!(classify_char('^'), CharKind::Caret);
        assert_eq!(classify_char('|'), CharKind::Pipe);
        assert!(CharKind::Semicolon.is_named_punctuation());
        assert!(!CharKind::Letter.is_named_punctuation());
    }

    #[test]
    fn test_currency_precedes_ascii_table() {
        assert_eq!(classify_char('$'), CharKind::Currency);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let sample = "rgb(255, 0, 0) /* é 😀 */ $€«©\u{0301}";
        for c in sample.chars() {
            let text = c.to_string();
            let first = classify(Some(&text));
            assert_eq!(first, classify(Some(&text)));
            assert_eq!(first, classify_char(c));
        }
    }

    #[test]
    fn test_visible_width() {
        assert_eq!(visible_width('a'), 1);
        assert_eq!(visible_width('é'), 1);
        assert_eq!(visible_width('😀'), 2);
        assert_eq!(visible_width('\u{0301}'), 0);
        assert_eq!(visible_width('\u{200D}'), 0);
    }
}
