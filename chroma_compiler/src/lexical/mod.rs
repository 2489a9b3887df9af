//! Lexical analysis
//!
//! Four layers, leaf to root: the character classifier, the backtracking
//! character stream, the lexical state machine and the tokenizer that drives
//! them.

pub mod classifier;
pub mod context;
pub mod escape;
pub mod stream;
pub mod tokenizer;

use crate::config::runtime::LexicalPreferences;
use crate::tokens::Token;

pub use classifier::{classify, classify_char, visible_width, CharKind};
pub use context::{Action, LexicalContext, LexicalState};
pub use escape::unescape;
pub use stream::{Character, CharacterStream, StreamError};
pub use tokenizer::{build_token, LexerError, LexicalMetrics, Tokenizer};

/// Tokenize source text with the configured preferences
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    Tokenizer::new().tokenize(source)
}

pub fn tokenize_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> Result<Vec<Token>, LexerError> {
    Tokenizer::with_preferences(preferences).tokenize(source)
}
