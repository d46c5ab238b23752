/**
 * Expression Parser Module
 *
 * Lexer, AST, parser and serializer for the host expressions embedded in
 * templates.
 */
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod serializer;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{parse_expression_at, ParseResult, Parser};
pub use serializer::serialize;
