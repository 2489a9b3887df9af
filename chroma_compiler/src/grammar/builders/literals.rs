//! Primary expressions
//!
//! `Primary := NUMBER | STRING | HEXVALUE | PERCENT | DIMENSION
//!           | IDENTIFIER | FUNCTION | named color | '(' Expression ')'`

use super::{nested, parse_expression, unexpected_token_error, Parser};
use crate::grammar::ast::{ExprKind, Expression};
use crate::grammar::keywords::{is_dimension_unit, is_named_color};
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::tokens::{Token, TokenKind};
use regex::Regex;
use std::sync::OnceLock;

static DIMENSION_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Numeric prefix followed by a letter suffix
fn dimension_pattern() -> Option<&'static Regex> {
    DIMENSION_PATTERN
        .get_or_init(|| Regex::new(r"^([^\p{L}]+)(\p{L}+)$").ok())
        .as_ref()
}

pub fn parse_primary(parser: &mut dyn Parser) -> SyntaxResult<Expression> {
    let token = parser.current().clone();

    let kind = match token.kind {
        TokenKind::Number => ExprKind::Number {
            value: parse_number(&token.value, &token)?,
        },
        TokenKind::String => ExprKind::String {
            value: token.value.clone(),
        },
        // a lone '#' has no digits to carry
        TokenKind::HexValue if token.value.len() < 2 => {
            return Err(SyntaxError::invalid_numeric_literal(&token.value, token.span));
        }
        TokenKind::HexValue => ExprKind::Hex {
            raw: token.value.clone(),
        },
        TokenKind::Percent => {
            let digits = token.value.strip_suffix('%').unwrap_or(&token.value);
            ExprKind::Percent {
                value: parse_number(digits, &token)?,
            }
        }
        TokenKind::Dimension => {
            let (value, unit) = split_dimension(&token)?;
            ExprKind::Dimension { value, unit }
        }
        TokenKind::Keyword if is_named_color(&token.value) => ExprKind::NamedColor {
            name: token.value.clone(),
        },
        TokenKind::Identifier | TokenKind::Function => ExprKind::Identifier {
            name: token.value.clone(),
        },
        TokenKind::LParen => return parse_group(parser),
        _ => return Err(unexpected_token_error(&token, "expression")),
    };

    parser.advance();
    Ok(Expression::new(kind, token.span))
}

/// `'(' Expression ')'`, spanning both parentheses
fn parse_group(parser: &mut dyn Parser) -> SyntaxResult<Expression> {
    nested(parser, "group", |parser| {
        let open = parser.expect(TokenKind::LParen, "'('")?;
        let inner = parse_expression(parser)?;
        let close = parser.expect(TokenKind::RParen, "')'")?;

        Ok(Expression::new(
            ExprKind::Group {
                expression: Box::new(inner),
            },
            open.span.merge(close.span),
        ))
    })
}

fn parse_number(text: &str, token: &Token) -> SyntaxResult<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SyntaxError::invalid_numeric_literal(&token.value, token.span))
}

/// Split a DIMENSION token into its value and a validated unit
pub fn split_dimension(token: &Token) -> SyntaxResult<(f64, String)> {
    let captures = dimension_pattern().and_then(|pattern| pattern.captures(&token.value));

    let Some(captures) = captures else {
        // a unit word on its own, such as `deg`
        if token.value.chars().all(char::is_alphabetic) {
            return Err(unexpected_token_error(token, "number before unit"));
        }
        return Err(SyntaxError::invalid_dimension_unit(
            &token.value,
            &token.value,
            token.span,
        ));
    };

    let number = captures.get(1).map_or("", |m| m.as_str());
    let unit = captures.get(2).map_or("", |m| m.as_str());

    let value = parse_number(number, token)?;
    if !is_dimension_unit(unit) {
        return Err(SyntaxError::invalid_dimension_unit(
            unit,
            &token.value,
            token.span,
        ));
    }

    Ok((value, unit.to_string()))
}
