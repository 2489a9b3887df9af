//! Program and statement productions
//!
//! ```text
//! Program     := Statement*
//! Statement   := Declaration | Expression [';']
//! Declaration := ('const' | 'let' | 'var') IDENTIFIER '=' Expression [';']
//! ```

use super::{nested, parse_expression, Parser};
use crate::grammar::ast::{Declaration, ExpressionStatement, Identifier, Program, Statement};
use crate::grammar::keywords::Keyword;
use crate::syntax::SyntaxResult;
use crate::tokens::{Token, TokenKind};
use crate::utils::Span;

pub fn parse_program(parser: &mut dyn Parser) -> SyntaxResult<Program> {
    nested(parser, "program", |parser| {
        let start = parser.current_span();
        let mut statements = Vec::new();

        while !parser.current().is_end() {
            statements.push(parse_statement(parser)?);
        }

        let span = match statements.last() {
            Some(last) => start.merge(last.span()),
            None => Span::point(start.start),
        };

        Ok(Program { statements, span })
    })
}

pub fn parse_statement(parser: &mut dyn Parser) -> SyntaxResult<Statement> {
    let current = parser.current();
    if current.kind == TokenKind::Keyword {
        if let Some(keyword) = Keyword::from_str(&current.value) {
            return parse_declaration(parser, keyword).map(Statement::Declaration);
        }
    }

    nested(parser, "statement", |parser| {
        let expression = parse_expression(parser)?;
        let span = with_terminator(parser, expression.span);
        Ok(Statement::Expression(ExpressionStatement { expression, span }))
    })
}

pub fn parse_declaration(parser: &mut dyn Parser, keyword: Keyword) -> SyntaxResult<Declaration> {
    nested(parser, "declaration", |parser| {
        let start = parser.advance();

        let name_token = parser.expect(TokenKind::Identifier, "identifier")?;
        parser.expect(TokenKind::Equals, "'='")?;
        let value = parse_expression(parser)?;

        let span = with_terminator(parser, start.span.merge(value.span));
        Ok(Declaration {
            keyword,
            name: identifier(name_token),
            value,
            span,
        })
    })
}

fn identifier(token: Token) -> Identifier {
    Identifier {
        name: token.value,
        span: token.span,
    }
}

/// Consume an optional `;` and extend `span` over it
fn with_terminator(parser: &mut dyn Parser, span: Span) -> Span {
    let current = parser.current();
    if current.kind == TokenKind::Symbol && current.value == ";" {
        let semicolon = parser.advance();
        span.merge(semicolon.span)
    } else {
        span
    }
}
