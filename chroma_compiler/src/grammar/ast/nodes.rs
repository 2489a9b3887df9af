//! AST node definitions
//!
//! Parents own their children. Every node records the span from its first to
//! its last consumed token, taken from tokens or child nodes as they are
//! consumed. Nodes serialize to JSON with a `type` tag.

use crate::grammar::keywords::Keyword;
use crate::utils::Span;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl Program {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Total number of expression nodes in the tree
    pub fn node_count(&self) -> usize {
        self.statements.iter().map(|s| s.expression().node_count()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    Declaration(Declaration),
    Expression(ExpressionStatement),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Self::Declaration(d) => d.span,
            Self::Expression(e) => e.span,
        }
    }

    /// The statement's value expression
    pub fn expression(&self) -> &Expression {
        match self {
            Self::Declaration(d) => &d.value,
            Self::Expression(e) => &e.expression,
        }
    }
}

/// `let name = value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub keyword: Keyword,
    pub name: Identifier,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    #[serde(flatten)]
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ExprKind {
    #[serde(rename = "NumericLiteral")]
    Number { value: f64 },
    #[serde(rename = "StringLiteral")]
    String { value: String },
    #[serde(rename = "HexLiteral")]
    Hex { raw: String },
    #[serde(rename = "PercentLiteral")]
    Percent { value: f64 },
    #[serde(rename = "DimensionLiteral")]
    Dimension { value: f64, unit: String },
    NamedColor { name: String },
    Identifier { name: String },
    #[serde(rename = "CallExpression")]
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    #[serde(rename = "BinaryExpression")]
    Binary {
        operator: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    #[serde(rename = "UnaryExpression")]
    Unary {
        operator: UnaryOp,
        operand: Box<Expression>,
    },
    #[serde(rename = "GroupExpression")]
    Group { expression: Box<Expression> },
    #[serde(rename = "SeriesExpression")]
    Series { expressions: Vec<Expression> },
    #[serde(rename = "AssignmentExpression")]
    Assignment {
        target: Box<Expression>,
        value: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
        }
    }
}

impl Expression {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, ExprKind::Identifier { .. })
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<&Expression> {
        match &self.kind {
            ExprKind::Call { callee, arguments } => std::iter::once(callee.as_ref())
                .chain(arguments.iter())
                .collect(),
            ExprKind::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            ExprKind::Unary { operand, .. } => vec![operand.as_ref()],
            ExprKind::Group { expression } => vec![expression.as_ref()],
            ExprKind::Series { expressions } => expressions.iter().collect(),
            ExprKind::Assignment { target, value } => vec![target.as_ref(), value.as_ref()],
            _ => Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Expression::node_count)
            .sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Expression::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Compact prefix rendering: `rgb(1, 2, 3)`, `(+ 1 (* 2 3))`
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number { value } => write!(f, "{}", value),
            ExprKind::String { value } => write!(f, "{:?}", value),
            ExprKind::Hex { raw } => f.write_str(raw),
            ExprKind::Percent { value } => write!(f, "{}%", value),
            ExprKind::Dimension { value, unit } => write!(f, "{}{}", value, unit),
            ExprKind::NamedColor { name } | ExprKind::Identifier { name } => f.write_str(name),
            ExprKind::Call { callee, arguments } => {
                write!(f, "{}(", callee)?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                f.write_str(")")
            }
            ExprKind::Binary {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", operator.as_str(), left, right),
            ExprKind::Unary { operator, operand } => {
                write!(f, "({} {})", operator.as_str(), operand)
            }
            ExprKind::Group { expression } => write!(f, "(group {})", expression),
            ExprKind::Series { expressions } => {
                f.write_str("(series")?;
                for expression in expressions {
                    write!(f, " {}", expression)?;
                }
                f.write_str(")")
            }
            ExprKind::Assignment { target, value } => write!(f, "(= {} {})", target, value),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declaration(d) => write!(f, "({} {} {})", d.keyword, d.name.name, d.value),
            Self::Expression(e) => write!(f, "{}", e.expression),
        }
    }
}
