//! Token kinds and the positioned token value
//!
//! Tokens are produced once by the tokenizer and never mutated. The kind is
//! decided by the lexical state that accepted the run, then refined by the
//! keyword table (identifiers) or the operator table (single-character
//! symbols).
use crate::utils::{Position, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    // === WORDS ===
    Identifier,
    /// Declaration keywords and named colors
    Keyword,
    /// Color function names
    Function,

    // === LITERALS ===
    Number,
    Percent,
    Dimension,
    HexValue,
    String,

    // === TRIVIA ===
    Comment,
    Whitespace,
    NewLine,

    // === SYMBOLS ===
    /// Any single-character symbol without a dedicated kind
    Symbol,
    Equals,    // =
    Plus,      // +
    Minus,     // -
    Star,      // *
    Dot,       // .
    Comma,     // ,
    Slash,     // /
    LParen,    // (
    RParen,    // )
    Modulo,    // %

    /// Sentinel appended after the last real token
    End,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identifier => "IDENTIFIER",
            Self::Keyword => "KEYWORD",
            Self::Function => "FUNCTION",
            Self::Number => "NUMBER",
            Self::Percent => "PERCENT",
            Self::Dimension => "DIMENSION",
            Self::HexValue => "HEXVALUE",
            Self::String => "STRING",
            Self::Comment => "COMMENT",
            Self::Whitespace => "WHITESPACE",
            Self::NewLine => "NEWLINE",
            Self::Symbol => "SYMBOL",
            Self::Equals => "EQUALS",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Star => "STAR",
            Self::Dot => "DOT",
            Self::Comma => "COMMA",
            Self::Slash => "SLASH",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::Modulo => "MODULO",
            Self::End => "END",
        }
    }

    /// Whitespace, newlines and comments carry no meaning for the parser
    pub fn is_trivia(&self) -> bool {
        matches!(self, Self::Whitespace | Self::NewLine | Self::Comment)
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Number | Self::Percent | Self::Dimension | Self::HexValue | Self::String
        )
    }

    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::Keyword | Self::Function => TokenClass::Word,
            Self::Identifier => TokenClass::Identifier,
            Self::Number | Self::Percent | Self::Dimension | Self::HexValue | Self::String => {
                TokenClass::Literal
            }
            Self::Equals
            | Self::Plus
            | Self::Minus
            | Self::Star
            | Self::Slash
            | Self::Comma
            | Self::Modulo => TokenClass::Operation,
            Self::Dot | Self::LParen | Self::RParen | Self::Symbol => TokenClass::Punctuation,
            Self::Whitespace | Self::NewLine => TokenClass::Whitespace,
            Self::Comment | Self::End => TokenClass::Special,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse token grouping used for metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    /// Keywords and function names
    Word,
    Identifier,
    Literal,
    Operation,
    Punctuation,
    Whitespace,
    /// Comments and the end sentinel
    Special,
}

/// A typed, positioned run of source characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            value: value.into(),
            span,
        }
    }

    /// Empty-valued sentinel placed at the end of input
    pub fn end(position: Position) -> Self {
        Self::new(TokenKind::End, String::new(), Span::point(position))
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::End
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// Value as it would appear in an error message
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::End => "end of input".to_string(),
            TokenKind::NewLine => "newline".to_string(),
            _ => format!("'{}'", self.value),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} at {}", self.kind, self.value, self.span.start)
    }
}

/// Map a single-character symbol to its dedicated operator kind
pub fn classify_symbol(symbol: &str) -> Option<TokenKind> {
    match symbol {
        "=" => Some(TokenKind::Equals),
        "+" => Some(TokenKind::Plus),
        "-" => Some(TokenKind::Minus),
        "*" => Some(TokenKind::Star),
        "." => Some(TokenKind::Dot),
        "," => Some(TokenKind::Comma),
        "/" => Some(TokenKind::Slash),
        "(" => Some(TokenKind::LParen),
        ")" => Some(TokenKind::RParen),
        "%" => Some(TokenKind::Modulo),
        _ => None,
    }
}
