//! Syntax analysis: token stream to AST
//!
//! The grammar productions live in `grammar::builders`; this module owns the
//! parser state and the public entry points.

mod error;
mod parser;

pub use crate::grammar::ast::Program;
pub use error::{ContextualSyntaxError, ErrorContext, SyntaxError, SyntaxResult};
pub use parser::{create_parser, ChromaParser, ParserCheckpoint};

use crate::tokens::{Token, TokenStream};
use crate::log_debug;

/// Parse a token stream into a program
pub fn parse_token_stream(token_stream: TokenStream) -> SyntaxResult<Program> {
    log_debug!("Starting syntax analysis", "tokens" => token_stream.len());

    let mut parser = create_parser(token_stream);
    let result = parser.parse_program();

    log_debug!("Syntax analysis finished",
        "success" => result.is_ok(),
        "position" => parser.tokens().position()
    );
    result
}

/// Parse a token sequence that ends with an END token
pub fn parse_tokens(tokens: Vec<Token>) -> SyntaxResult<Program> {
    parse_token_stream(TokenStream::new(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_tokens() {
        let tokens = tokenize("let c = mix(red, #00f)").unwrap();
        let program = parse_tokens(tokens).unwrap();
        assert_eq!(program.statements[0].to_string(), "(let c mix(red, #00f))");
    }

    #[test]
    fn test_empty_token_sequence_has_no_end() {
        assert_matches!(parse_tokens(Vec::new()), Err(SyntaxError::MissingEnd));
    }

    #[test]
    fn test_error_codes_are_registered() {
        let error = parse_tokens(tokenize("rgb(").unwrap()).unwrap_err();
        let code = error.error_code();
        assert_eq!(code.as_str(), "E050");
        assert_ne!(
            crate::logging::codes::get_description(code.as_str()),
            "Unknown error"
        );
    }
}
