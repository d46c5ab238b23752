//! Template Parser Module
//!
//! Template text to AST, and the canonical printer going the other way.

pub mod ast;
pub mod parser;
pub mod printer;

pub use ast::*;
pub use parser::{parse_template, TemplateParser};
pub use printer::print_template;
