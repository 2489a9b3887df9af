pub mod nodes;

pub use nodes::{
    BinaryOp, Declaration, ExprKind, Expression, ExpressionStatement, Identifier, Program,
    Statement, UnaryOp,
};
