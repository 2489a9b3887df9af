//! Shared primitive types used by the character stream, tokenizer and parser.

pub mod span;

pub use span::{Position, SourceMap, Span};
