//! Token system
//!
//! - **[`Token`]**: a kind, the accepted text and its source span
//! - **[`TokenKind`]**: closed set of kinds produced by the tokenizer
//! - **[`TokenStream`]**: trivia-skipping navigation with checkpoints
//!
//! String tokens hold their unescaped content without quotes. Comment tokens
//! hold their text verbatim, delimiters included. Every token sequence ends
//! with exactly one END token whose value is empty.

pub mod token;
pub mod token_stream;

pub use token::{classify_symbol, Token, TokenClass, TokenKind};
pub use token_stream::TokenStream;

pub use crate::utils::{Position, SourceMap, Span};
