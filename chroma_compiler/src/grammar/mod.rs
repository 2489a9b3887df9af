//! Grammar for the chroma expression language

pub mod ast;
pub mod builders;
pub mod keywords;

pub use ast::*;
pub use keywords::{classify_word, Keyword, WordType};
