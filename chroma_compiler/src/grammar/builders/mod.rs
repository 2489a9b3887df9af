//! Builder functions for grammar productions
//!
//! Builders are free functions over `&mut dyn Parser`, one per production.
//! Dependency order: literals → expressions → statements.

pub mod expressions;
pub mod literals;
pub mod statements;

use crate::syntax::{SyntaxError, SyntaxResult};
use crate::tokens::{Token, TokenKind};
use crate::utils::Span;

pub use expressions::{
    parse_addition, parse_arguments, parse_assignment, parse_call, parse_expression,
    parse_multiplication, parse_series, parse_unary,
};
pub use literals::{parse_primary, split_dimension};
pub use statements::{parse_declaration, parse_program, parse_statement};

/// Parser interface the builders drive
pub trait Parser {
    // === NAVIGATION ===

    /// Current significant token; the END sentinel once input is exhausted
    fn current(&self) -> &Token;
    /// Consume and return the current token
    fn advance(&mut self) -> Token;
    fn current_span(&self) -> Span {
        self.current().span
    }

    // === NESTING ===

    /// Enter a named production, failing when the nesting limit is reached
    fn enter(&mut self, context: &'static str) -> SyntaxResult<()>;
    fn leave(&mut self);

    // === DEFAULTED HELPERS ===

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn consume_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of `kind` or fail naming `expected`
    fn expect(&mut self, kind: TokenKind, expected: &str) -> SyntaxResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(unexpected_token_error(self.current(), expected))
        }
    }
}

pub fn unexpected_token_error(found: &Token, expected: &str) -> SyntaxError {
    SyntaxError::unexpected_token(expected, &found.describe(), found.span)
}

/// Run `build` inside a named production, leaving it on every path
pub fn nested<T, F>(parser: &mut dyn Parser, context: &'static str, build: F) -> SyntaxResult<T>
where
    F: FnOnce(&mut dyn Parser) -> SyntaxResult<T>,
{
    parser.enter(context)?;
    let result = build(parser);
    parser.leave();
    result
}
