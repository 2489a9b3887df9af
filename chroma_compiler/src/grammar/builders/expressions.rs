//! Expression productions, loosest binding first
//!
//! ```text
//! Expression     := Assignment
//! Assignment     := Series ('=' Assignment)?
//! Series         := Addition (',' Addition)*
//! Addition       := Multiplication (('+' | '-') Multiplication)*
//! Multiplication := Unary (('*' | '/') Unary)*
//! Unary          := ('+' | '-') Unary | Call
//! Call           := Primary ('(' Arguments? ')')?
//! Arguments      := Addition (',' Addition)*
//! ```
//!
//! Call arguments start at Addition, one level below Series, so the commas
//! inside a call never build a series.

use super::{nested, parse_primary, Parser};
use crate::grammar::ast::{BinaryOp, ExprKind, Expression, UnaryOp};
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::tokens::TokenKind;

pub fn parse_expression(parser: &mut dyn Parser) -> SyntaxResult<Expression> {
    parse_assignment(parser)
}

/// Right-associative; the target must be an identifier
pub fn parse_assignment(parser: &mut dyn Parser) -> SyntaxResult<Expression> {
    nested(parser, "assignment", |parser| {
        let target = parse_series(parser)?;

        if !parser.check(TokenKind::Equals) {
            return Ok(target);
        }

        if !target.is_identifier() {
            return Err(SyntaxError::invalid_assignment_target(
                &format!("'{}'", target),
                target.span,
            ));
        }

        parser.advance();
        let value = parse_assignment(parser)?;
        let span = target.span.merge(value.span);

        Ok(Expression::new(
            ExprKind::Assignment {
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    })
}

/// Collapses to a series node only when at least one comma is present
pub fn parse_series(parser: &mut dyn Parser) -> SyntaxResult<Expression> {
    let first = parse_addition(parser)?;

    if !parser.check(TokenKind::Comma) {
        return Ok(first);
    }

    let mut expressions = vec![first];
    while parser.consume_if(TokenKind::Comma).is_some() {
        expressions.push(parse_addition(parser)?);
    }

    let span = match (expressions.first(), expressions.last()) {
        (Some(first), Some(last)) => first.span.merge(last.span),
        _ => parser.current_span(),
    };

    Ok(Expression::new(ExprKind::Series { expressions }, span))
}

pub fn parse_addition(parser: &mut dyn Parser) -> SyntaxResult<Expression> {
    let mut left = parse_multiplication(parser)?;

    loop {
        let operator = match parser.current().kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Subtract,
            _ => return Ok(left),
        };
        parser.advance();

        let right = parse_multiplication(parser)?;
        left = binary(operator, left, right);
    }
}

pub fn parse_multiplication(parser: &mut dyn Parser) -> SyntaxResult<Expression> {
    let mut left = parse_unary(parser)?;

    loop {
        let operator = match parser.current().kind {
            TokenKind::Star => BinaryOp::Multiply,
            TokenKind::Slash => BinaryOp::Divide,
            _ => return Ok(left),
        };
        parser.advance();

        let right = parse_unary(parser)?;
        left = binary(operator, left, right);
    }
}

fn binary(operator: BinaryOp, left: Expression, right: Expression) -> Expression {
    let span = left.span.merge(right.span);
    Expression::new(
        ExprKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

pub fn parse_unary(parser: &mut dyn Parser) -> SyntaxResult<Expression> {
    nested(parser, "unary", |parser| {
        let operator = match parser.current().kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            _ => return parse_call(parser),
        };

        let sign = parser.advance();
        let operand = parse_unary(parser)?;
        let span = sign.span.merge(operand.span);

        Ok(Expression::new(
            ExprKind::Unary {
                operator,
                operand: Box::new(operand),
            },
            span,
        ))
    })
}

/// A primary followed by `(` is a call only when the primary is an
/// identifier or function name
pub fn parse_call(parser: &mut dyn Parser) -> SyntaxResult<Expression> {
    let callee = parse_primary(parser)?;

    if !callee.is_identifier() || !parser.check(TokenKind::LParen) {
        return Ok(callee);
    }

    parser.advance();
    let arguments = parse_arguments(parser)?;
    let close = parser.expect(TokenKind::RParen, "')' or ','")?;
    let span = callee.span.merge(close.span);

    Ok(Expression::new(
        ExprKind::Call {
            callee: Box::new(callee),
            arguments,
        },
        span,
    ))
}

/// Comma-separated arguments after `(`, stopping before `)`
pub fn parse_arguments(parser: &mut dyn Parser) -> SyntaxResult<Vec<Expression>> {
    let mut arguments = Vec::new();

    if parser.check(TokenKind::RParen) {
        return Ok(arguments);
    }

    loop {
        arguments.push(parse_addition(parser)?);
        if parser.consume_if(TokenKind::Comma).is_none() {
            return Ok(arguments);
        }
    }
}
