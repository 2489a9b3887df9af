//! Syntax errors
//!
//! Every error is fatal to the parse call that raised it; there is no
//! recovery or aggregation.

use crate::logging::{codes, Code};
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unexpected token: expected {expected}, found {found} at {}", .span.start)]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Invalid assignment target: {found} at {} is not an identifier", .span.start)]
    InvalidAssignmentTarget { found: String, span: Span },

    #[error("Invalid dimension unit '{unit}' in '{literal}' at {}", .span.start)]
    InvalidDimensionUnit {
        unit: String,
        literal: String,
        span: Span,
    },

    #[error("Invalid numeric literal '{literal}' at {}", .span.start)]
    InvalidNumericLiteral { literal: String, span: Span },

    #[error("Maximum nesting depth {limit} exceeded at {}", .span.start)]
    MaxRecursionDepth { limit: usize, span: Span },

    #[error("Token sequence has no END token")]
    MissingEnd,
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn invalid_assignment_target(found: &str, span: Span) -> Self {
        Self::InvalidAssignmentTarget {
            found: found.to_string(),
            span,
        }
    }

    pub fn invalid_dimension_unit(unit: &str, literal: &str, span: Span) -> Self {
        Self::InvalidDimensionUnit {
            unit: unit.to_string(),
            literal: literal.to_string(),
            span,
        }
    }

    pub fn invalid_numeric_literal(literal: &str, span: Span) -> Self {
        Self::InvalidNumericLiteral {
            literal: literal.to_string(),
            span,
        }
    }

    pub fn max_recursion_depth(limit: usize, span: Span) -> Self {
        Self::MaxRecursionDepth { limit, span }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::InvalidAssignmentTarget { .. } => codes::syntax::INVALID_ASSIGNMENT_TARGET,
            Self::InvalidDimensionUnit { .. } => codes::syntax::INVALID_DIMENSION_UNIT,
            Self::InvalidNumericLiteral { .. } => codes::syntax::INVALID_NUMERIC_LITERAL,
            Self::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
            Self::MissingEnd => codes::syntax::MISSING_END,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::InvalidAssignmentTarget { span, .. }
            | Self::InvalidDimensionUnit { span, .. }
            | Self::InvalidNumericLiteral { span, .. }
            | Self::MaxRecursionDepth { span, .. } => Some(*span),
            Self::MissingEnd => None,
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

/// Parser state captured alongside an error
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub parsing_context: Vec<String>,
    pub surrounding_tokens: Vec<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.parsing_context = context;
        self
    }

    pub fn with_tokens(mut self, tokens: Vec<String>) -> Self {
        self.surrounding_tokens = tokens;
        self
    }

    pub fn format_context(&self) -> String {
        let mut context = String::new();

        if !self.parsing_context.is_empty() {
            context.push_str(&format!("Context: {}\n", self.parsing_context.join(" -> ")));
        }
        if !self.surrounding_tokens.is_empty() {
            context.push_str(&format!("Near: {}\n", self.surrounding_tokens.join(" ")));
        }

        context
    }
}

/// A syntax error plus where the parser was when it failed
#[derive(Debug, Clone)]
pub struct ContextualSyntaxError {
    pub error: SyntaxError,
    pub context: ErrorContext,
}

impl ContextualSyntaxError {
    pub fn new(error: SyntaxError, context: ErrorContext) -> Self {
        Self { error, context }
    }
}

impl std::fmt::Display for ContextualSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.error)?;
        write!(f, "{}", self.context.format_context())
    }
}
