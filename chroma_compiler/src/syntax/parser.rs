//! Recursive-descent parser over a token stream
//!
//! The grammar lives in `grammar::builders`; this type supplies navigation,
//! nesting limits, the context stack used in error reports and checkpoints
//! for speculative parsing.

use crate::config::constants::compile_time::syntax::*;
use crate::config::runtime::SyntaxPreferences;
use crate::grammar::ast::Program;
use crate::grammar::builders::{self, Parser};
use crate::logging::codes;
use crate::syntax::error::{ContextualSyntaxError, ErrorContext, SyntaxError, SyntaxResult};
use crate::tokens::{Token, TokenKind, TokenStream};
use crate::utils::Position;
use crate::{log_debug, log_error, log_success, log_warning};

/// Saved parser state for backtracking
#[derive(Debug, Clone)]
pub struct ParserCheckpoint {
    pub position: usize,
    pub context_stack: Vec<&'static str>,
    pub depth: usize,
}

pub struct ChromaParser {
    tokens: TokenStream,
    context_stack: Vec<&'static str>,
    depth: usize,
    max_depth: usize,
    trace: bool,
    /// Returned by `current` when the stream holds no END token
    sentinel: Token,
}

impl ChromaParser {
    pub fn new(tokens: TokenStream) -> Self {
        Self::with_preferences(tokens, crate::config::runtime_config().syntax.clone())
    }

    pub fn with_preferences(tokens: TokenStream, preferences: SyntaxPreferences) -> Self {
        log_debug!("Creating parser",
            "tokens" => tokens.len(),
            "max_depth" => preferences.max_parse_depth
        );

        let end = tokens
            .all_tokens()
            .last()
            .map_or(Position::start(), |t| t.span.end);

        Self {
            tokens,
            context_stack: Vec::new(),
            depth: 0,
            max_depth: preferences.max_parse_depth.min(MAX_PARSE_DEPTH),
            trace: preferences.trace_contexts,
            sentinel: Token::end(end),
        }
    }

    /// Parse the whole stream into a program
    pub fn parse_program(&mut self) -> SyntaxResult<Program> {
        if !self.tokens.has_end() {
            let error = SyntaxError::MissingEnd;
            log_error!(error.error_code(), &error.to_string());
            return Err(error);
        }

        match builders::parse_program(self) {
            Ok(program) => {
                log_success!(codes::success::AST_CONSTRUCTION_COMPLETE,
                    "Program parsed",
                    "statements" => program.len(),
                    "nodes" => program.node_count()
                );
                Ok(program)
            }
            Err(error) => {
                let span = error.span().unwrap_or(self.sentinel.span);
                log_error!(error.error_code(), &error.to_string(),
                    span = span,
                    "context" => self.current_context(),
                    "position" => self.tokens.position()
                );
                Err(error)
            }
        }
    }

    // === LOOKAHEAD ===

    pub fn peek(&self, n: usize) -> Option<&Token> {
        self.tokens.peek_ahead(n)
    }

    pub fn lookahead(&self, count: usize) -> Vec<&Token> {
        self.tokens.lookahead_tokens(count)
    }

    /// True when the upcoming token kinds match `expected` in order
    pub fn matches_sequence(&self, expected: &[TokenKind]) -> bool {
        let tokens = self.lookahead(expected.len());
        tokens.len() == expected.len()
            && tokens
                .iter()
                .zip(expected)
                .all(|(token, kind)| token.kind == *kind)
    }

    // === BACKTRACKING ===

    pub fn save_checkpoint(&self) -> ParserCheckpoint {
        ParserCheckpoint {
            position: self.tokens.save_position(),
            context_stack: self.context_stack.clone(),
            depth: self.depth,
        }
    }

    pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
        log_debug!("Restoring parser checkpoint",
            "position" => checkpoint.position,
            "context" => checkpoint.context_stack.join(" -> ")
        );

        self.tokens.restore_position(checkpoint.position);
        self.context_stack = checkpoint.context_stack;
        self.depth = checkpoint.depth;
    }

    /// Run `parse_fn`, rewinding to the starting state if it fails
    pub fn try_parse<T, F>(&mut self, parse_fn: F) -> Option<T>
    where
        F: FnOnce(&mut Self) -> SyntaxResult<T>,
    {
        let checkpoint = self.save_checkpoint();
        match parse_fn(self) {
            Ok(result) => Some(result),
            Err(error) => {
                log_debug!("Speculative parse failed, restoring checkpoint",
                    "error" => error
                );
                self.restore_checkpoint(checkpoint);
                None
            }
        }
    }

    // === CONTEXT TRACKING ===

    pub fn push_context(&mut self, context: &'static str) {
        if self.context_stack.len() >= MAX_CONTEXT_STACK_DEPTH {
            log_warning!("Context stack depth limit reached, dropping oldest context");
            self.context_stack.remove(0);
        }
        if self.trace {
            log_debug!("Entering parsing context", "context" => context);
        }
        self.context_stack.push(context);
    }

    pub fn pop_context(&mut self) {
        if let Some(context) = self.context_stack.pop() {
            if self.trace {
                log_debug!("Exiting parsing context", "context" => context);
            }
        }
    }

    pub fn current_context(&self) -> String {
        self.context_stack.join(" -> ")
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    /// Attach the context stack and nearby tokens to `error`
    pub fn contextual_error(&self, error: SyntaxError) -> ContextualSyntaxError {
        let context = ErrorContext::new()
            .with_context(self.context_stack.iter().map(|c| c.to_string()).collect())
            .with_tokens(
                self.tokens
                    .context_snippet(3)
                    .iter()
                    .map(|t| t.describe())
                    .collect(),
            );

        ContextualSyntaxError::new(error, context)
    }

    pub fn diagnostic_info(&self) -> String {
        format!(
            "Parser State:\n{}\nContext: {}\nParse Depth: {}/{}",
            self.tokens.diagnostic(),
            self.current_context(),
            self.depth,
            self.max_depth
        )
    }
}

impl Parser for ChromaParser {
    fn current(&self) -> &Token {
        self.tokens.current().unwrap_or(&self.sentinel)
    }

    fn advance(&mut self) -> Token {
        match self.tokens.advance() {
            Some(token) => token,
            None => self.sentinel.clone(),
        }
    }

    fn enter(&mut self, context: &'static str) -> SyntaxResult<()> {
        if self.depth >= self.max_depth {
            let error = SyntaxError::max_recursion_depth(self.max_depth, self.current_span());
            log_error!(error.error_code(), "Maximum parser nesting depth exceeded",
                span = self.current_span(),
                "depth" => self.depth,
                "context" => context
            );
            return Err(error);
        }

        self.depth += 1;
        self.push_context(context);
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.pop_context();
    }
}

pub fn create_parser(tokens: TokenStream) -> ChromaParser {
    ChromaParser::new(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LexicalPreferences;
    use crate::grammar::ast::{BinaryOp, ExprKind, Statement};
    use crate::lexical::Tokenizer;
    use crate::utils::Span;
    use assert_matches::assert_matches;

    fn parser_with(source: &str, max_parse_depth: usize) -> ChromaParser {
        let tokens = Tokenizer::with_preferences(LexicalPreferences::default())
            .tokenize(source)
            .unwrap();
        let preferences = SyntaxPreferences {
            max_parse_depth,
            trace_contexts: false,
        };
        ChromaParser::with_preferences(TokenStream::new(tokens), preferences)
    }

    fn parse(source: &str) -> SyntaxResult<Program> {
        parser_with(source, MAX_PARSE_DEPTH).parse_program()
    }

    fn single(source: &str) -> String {
        let program = parse(source).unwrap();
        assert_eq!(program.len(), 1, "{source}");
        program.statements[0].to_string()
    }

    #[test]
    fn test_rgb_call() {
        let program = parse("rgb(255, 0, 0)").unwrap();
        let Statement::Expression(statement) = &program.statements[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { callee, arguments } = &statement.expression.kind else {
            panic!("expected call");
        };
        assert_eq!(callee.as_identifier(), Some("rgb"));
        let values: Vec<_> = arguments
            .iter()
            .map(|a| match a.kind {
                ExprKind::Number { value } => value,
                _ => f64::NAN,
            })
            .collect();
        assert_eq!(values, vec![255.0, 0.0, 0.0]);
        assert_eq!(statement.expression.span.start.column, 1);
        assert_eq!(statement.expression.span.end.column, 15);
    }

    #[test]
    fn test_literals() {
        let program = parse("#ff00ff").unwrap();
        assert_matches!(
            &program.statements[0].expression().kind,
            ExprKind::Hex { raw } if raw == "#ff00ff"
        );

        let program = parse("50%").unwrap();
        assert_matches!(
            program.statements[0].expression().kind,
            ExprKind::Percent { value } if value == 50.0
        );

        let program = parse("90deg").unwrap();
        assert_matches!(
            &program.statements[0].expression().kind,
            ExprKind::Dimension { value, unit } if *value == 90.0 && unit == "deg"
        );

        assert_eq!(single("'hi'"), "\"hi\"");
        assert_eq!(single("rebeccapurple"), "rebeccapurple");
        assert_matches!(
            parse("red").unwrap().statements[0].expression().kind,
            ExprKind::NamedColor { .. }
        );
    }

    #[test]
    fn test_precedence() {
        assert_eq!(single("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(single("(1 + 2) * 3"), "(* (group (+ 1 2)) 3)");
        assert_eq!(single("1 - 2 - 3"), "(- (- 1 2) 3)");
        assert_eq!(single("8 / 2 / 2"), "(/ (/ 8 2) 2)");
        assert_eq!(single("-1 * +2"), "(* (- 1) (+ 2))");
        assert_eq!(single("--x"), "(- (- x))");
    }

    #[test]
    fn test_group_span_covers_parentheses() {
        let program = parse("(1 + 2) * 3").unwrap();
        let ExprKind::Binary { operator, left, .. } = &program.statements[0].expression().kind
        else {
            panic!("expected binary");
        };
        assert_eq!(*operator, BinaryOp::Multiply);
        assert_eq!(left.span.start.column, 1);
        assert_eq!(left.span.end.column, 8);
    }

    #[test]
    fn test_series_and_call_arguments() {
        assert_eq!(single("1, 2, 3"), "(series 1 2 3)");
        assert_eq!(single("mix(red, blue), 1"), "(series mix(red, blue) 1)");
        assert_eq!(single("f()"), "f()");
        assert_eq!(single("rgb(1 + 2, 3)"), "rgb((+ 1 2), 3)");
        // a parenthesised series is a single argument
        assert_eq!(single("f((1, 2))"), "f((group (series 1 2)))");
    }

    #[test]
    fn test_call_requires_identifier_callee() {
        let program = parse("2(3)").unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.statements[1].to_string(), "(group 3)");
    }

    #[test]
    fn test_assignment() {
        assert_eq!(single("a = b = 3"), "(= a (= b 3))");
        assert_matches!(
            parse("1 = 2"),
            Err(SyntaxError::InvalidAssignmentTarget { .. })
        );
        assert_matches!(
            parse("a + b = 2"),
            Err(SyntaxError::InvalidAssignmentTarget { found, .. }) if found == "'(+ a b)'"
        );
    }

    #[test]
    fn test_declarations_and_semicolons() {
        let program = parse("let accent = #336699;\nconst angle = 45deg\naccent").unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program.statements[0].to_string(), "(let accent #336699)");
        assert_eq!(program.statements[1].to_string(), "(const angle 45deg)");

        let Statement::Declaration(declaration) = &program.statements[0] else {
            panic!("expected declaration");
        };
        assert_eq!(declaration.name.name, "accent");
        assert_eq!(declaration.span.end.column, 22);
        assert_eq!(program.span.start.line, 1);
        assert_eq!(program.span.end.line, 3);
    }

    #[test]
    fn test_declaration_errors() {
        assert_matches!(
            parse("let = 3"),
            Err(SyntaxError::UnexpectedToken { expected, .. }) if expected == "identifier"
        );
        assert_matches!(
            parse("let x 3"),
            Err(SyntaxError::UnexpectedToken { expected, .. }) if expected == "'='"
        );
    }

    #[test]
    fn test_unexpected_end() {
        let error = parse("1 +").unwrap_err();
        assert_matches!(
            &error,
            SyntaxError::UnexpectedToken { found, span, .. }
                if found == "end of input" && span.start.column == 4
        );
        assert!(parse("rgb(1, 2").is_err());
        assert!(parse("(1").is_err());
    }

    #[test]
    fn test_literal_errors() {
        assert_matches!(
            parse("1.2.3"),
            Err(SyntaxError::InvalidNumericLiteral { literal, .. }) if literal == "1.2.3"
        );
        assert_matches!(
            parse("3parsec"),
            Err(SyntaxError::InvalidDimensionUnit { unit, .. }) if unit == "parsec"
        );
        assert_matches!(
            parse("deg"),
            Err(SyntaxError::UnexpectedToken { expected, .. }) if expected == "number before unit"
        );
        assert_matches!(
            parse("rgb(turn)"),
            Err(SyntaxError::UnexpectedToken { expected, .. }) if expected == "number before unit"
        );
        assert_matches!(parse(")"), Err(SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_hex_needs_digits() {
        assert_matches!(
            parse("#"),
            Err(SyntaxError::InvalidNumericLiteral { literal, .. }) if literal == "#"
        );
        assert_matches!(
            parse("rgb(#, 1)"),
            Err(SyntaxError::InvalidNumericLiteral { span, .. }) if span.start.column == 5
        );
        assert_matches!(
            parse("#a"),
            Ok(program) if program.statements[0].to_string() == "#a"
        );
    }

    #[test]
    fn test_empty_and_trivia_only_programs() {
        let program = parse("").unwrap();
        assert!(program.is_empty());
        let program = parse("  // nothing\n/* here */").unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn test_missing_end() {
        let tokens = vec![Token::new(TokenKind::Number, "1", Span::default())];
        let mut parser = ChromaParser::new(TokenStream::new(tokens));
        assert_matches!(parser.parse_program(), Err(SyntaxError::MissingEnd));
    }

    #[test]
    fn test_depth_limit() {
        let nested = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert!(parser_with(&nested, MAX_PARSE_DEPTH).parse_program().is_ok());
        assert_matches!(
            parser_with(&nested, 12).parse_program(),
            Err(SyntaxError::MaxRecursionDepth { limit: 12, .. })
        );
        assert_matches!(
            parser_with(&"-".repeat(20), 8).parse_program(),
            Err(SyntaxError::MaxRecursionDepth { .. })
        );
    }

    #[test]
    fn test_depth_is_released() {
        let mut parser = parser_with("f(1, (2))", MAX_PARSE_DEPTH);
        parser.parse_program().unwrap();
        assert_eq!(parser.depth(), 0);
        assert_eq!(parser.current_context(), "");
    }

    #[test]
    fn test_checkpoints_and_try_parse() {
        let mut parser = parser_with("a + ) b", MAX_PARSE_DEPTH);
        assert!(parser.matches_sequence(&[TokenKind::Identifier, TokenKind::Plus]));
        assert!(!parser.matches_sequence(&[TokenKind::Plus]));

        let failed = parser.try_parse(|p| builders::parse_expression(p));
        assert!(failed.is_none());
        assert_eq!(parser.tokens().position(), 0);
        assert_eq!(parser.depth(), 0);

        let checkpoint = parser.save_checkpoint();
        parser.advance();
        parser.advance();
        assert!(parser.check(TokenKind::RParen));
        parser.restore_checkpoint(checkpoint);
        assert!(parser.check(TokenKind::Identifier));

        let identifier = parser.try_parse(|p| builders::parse_primary(p));
        assert_eq!(identifier.map(|e| e.to_string()).as_deref(), Some("a"));
        assert_eq!(parser.peek(0).map(|t| t.kind), Some(TokenKind::Plus));
    }

    #[test]
    fn test_contextual_error() {
        let mut parser = parser_with("1 + )", MAX_PARSE_DEPTH);
        let error = parser.parse_program().unwrap_err();
        let contextual = parser.contextual_error(error).to_string();
        assert!(contextual.contains("Unexpected token"));
        assert!(contextual.contains("Near:"));
        assert!(parser.diagnostic_info().contains("Parse Depth"));
    }
}
