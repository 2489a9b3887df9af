//! Lexer and parser front end for color-function expressions
//!
//! Source text flows through the character stream and lexical state machine
//! into a token sequence, then through a recursive-descent parser into a
//! [`Program`]. [`pipeline::process_source`] runs both stages in one call.

#[macro_use]
pub mod logging;
pub mod batch;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod utils;

pub use batch::{BatchConfig, BatchError, BatchResults};
pub use grammar::ast::{Expression, ExprKind, Program, Statement};
pub use lexical::{tokenize, LexerError, LexicalMetrics};
pub use pipeline::{process_file, process_source, PipelineError, PipelineResult};
pub use syntax::{parse_tokens, SyntaxError};
pub use tokens::{Token, TokenKind, TokenStream};
