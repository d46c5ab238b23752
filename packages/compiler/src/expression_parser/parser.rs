/**
 * Expression Parser
 *
 * Recursive descent parser for host expressions embedded in templates.
 * Parsing starts at an offset inside the template text and stops at the
 * first token that cannot continue the expression; the caller resumes
 * scanning at the reported end offset.
 */
use super::ast::*;
use super::lexer::{Lexer, Token};
use super::serializer::format_number;
use crate::parse_util::{ParseError, ParseSourceFile, ParseSourceSpan};

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parses the longest expression starting at `offset` in `text`.
/// Returns the expression and the byte offset just past its last token.
pub fn parse_expression_at(text: &str, offset: usize) -> ParseResult<(Expr, usize)> {
    Parser::new(text, "expression").parse_at(offset)
}

/// Parser for host expressions inside one source file
pub struct Parser<'a> {
    source: &'a str,
    url: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, url: &'a str) -> Self {
        Parser { source, url }
    }

    pub fn parse_at(&self, offset: usize) -> ParseResult<(Expr, usize)> {
        let mut ast = ParseAST::new(self.source, self.url, offset);
        let expr = ast.parse_expression()?;
        Ok((expr, ast.end))
    }

    /// Parses the whole source as one expression.
    pub fn parse(&self) -> ParseResult<Expr> {
        let mut ast = ParseAST::new(self.source, self.url, 0);
        let expr = ast.parse_expression()?;
        if let Some(token) = ast.peek() {
            return Err(ast.unexpected(&token));
        }
        Ok(expr)
    }
}

/// Internal parser state
struct ParseAST<'a> {
    source: &'a str,
    url: &'a str,
    lexer: Lexer<'a>,
    end: usize,
}

type Level<'a> = fn(&mut ParseAST<'a>) -> ParseResult<Expr>;

impl<'a> ParseAST<'a> {
    fn new(source: &'a str, url: &'a str, offset: usize) -> Self {
        ParseAST {
            source,
            url,
            lexer: Lexer::new(source, offset),
            end: offset,
        }
    }

    fn error_at(&self, index: usize, message: impl Into<String>) -> ParseError {
        let file = ParseSourceFile::new(self.source, self.url);
        ParseError::new(ParseSourceSpan::at(file, index), message)
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        if token.is_error() {
            return self.error_at(token.index, token.str_value.clone());
        }
        let text = &self.source[token.index..token.end];
        self.error_at(token.index, format!("Unexpected token '{}'", text))
    }

    fn unexpected_end(&self) -> ParseError {
        self.error_at(self.source.len(), "Unexpected end of expression")
    }

    fn peek(&self) -> Option<Token> {
        let mut lookahead = self.lexer;
        lookahead.next_token()
    }

    fn next(&mut self) -> ParseResult<Token> {
        match self.lexer.next_token() {
            Some(token) if token.is_error() => Err(self.unexpected(&token)),
            Some(token) => {
                self.end = token.end;
                Ok(token)
            }
            None => Err(self.unexpected_end()),
        }
    }

    fn consume_optional_character(&mut self, code: char) -> bool {
        match self.peek() {
            Some(token) if token.is_character(code) => {
                self.lexer.next_token();
                self.end = token.end;
                true
            }
            _ => false,
        }
    }

    fn consume_optional_operator(&mut self, op: &str) -> bool {
        match self.peek() {
            Some(token) if token.is_operator(op) => {
                self.lexer.next_token();
                self.end = token.end;
                true
            }
            _ => false,
        }
    }

    fn expect_character(&mut self, code: char) -> ParseResult<()> {
        if self.consume_optional_character(code) {
            return Ok(());
        }
        match self.peek() {
            Some(token) => Err(self.error_at(
                token.index,
                format!("Expected '{}' but found '{}'", code, &self.source[token.index..token.end]),
            )),
            None => Err(self.error_at(self.source.len(), format!("Expected '{}'", code))),
        }
    }

    /// Expression, including arrow functions
    fn parse_expression(&mut self) -> ParseResult<Expr> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }
        self.parse_conditional()
    }

    /// Arrow functions are recognized by scanning ahead for `=>` after a
    /// parameter list; anything else rewinds and parses as a conditional.
    fn try_parse_arrow(&mut self) -> ParseResult<Option<Expr>> {
        let saved = (self.lexer, self.end);
        match self.scan_arrow_params() {
            Some(params) if self.consume_optional_operator("=>") => {
                if let Some(token) = self.peek() {
                    if token.is_character('{') {
                        return Err(self.error_at(token.index, "Arrow function bodies must be expressions"));
                    }
                }
                let body = self.parse_expression()?;
                Ok(Some(Expr::Arrow {
                    params,
                    body: Box::new(body),
                }))
            }
            _ => {
                (self.lexer, self.end) = saved;
                Ok(None)
            }
        }
    }

    fn scan_arrow_params(&mut self) -> Option<Vec<String>> {
        let first = self.lexer.next_token()?;
        if first.is_identifier() {
            return Some(vec![first.str_value]);
        }
        if !first.is_character('(') {
            return None;
        }

        let mut params = Vec::new();
        let mut token = self.lexer.next_token()?;
        if token.is_character(')') {
            return Some(params);
        }
        loop {
            if !token.is_identifier() {
                return None;
            }
            params.push(token.str_value);
            let separator = self.lexer.next_token()?;
            if separator.is_character(')') {
                return Some(params);
            }
            if !separator.is_character(',') {
                return None;
            }
            token = self.lexer.next_token()?;
        }
    }

    fn parse_conditional(&mut self) -> ParseResult<Expr> {
        let test = self.parse_logical_or()?;

        if self.consume_optional_operator("?") {
            let consequent = self.parse_expression()?;
            self.expect_character(':')?;
            let alternate = self.parse_expression()?;
            return Ok(Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            });
        }

        Ok(test)
    }

    /// Left-associative binary level over `operators`.
    fn parse_binary(&mut self, operators: &[&str], next: Level<'a>) -> ParseResult<Expr> {
        let mut result = next(self)?;

        loop {
            let operator = match self.peek() {
                Some(token) if operators.iter().any(|op| token.is_operator(op)) => token.str_value,
                _ => break,
            };
            self.next()?;
            let right = next(self)?;
            result = Expr::Binary {
                operator: BinaryOperator::from_operator(&operator)
                    .ok_or_else(|| self.error_at(self.end, format!("Unknown operator '{}'", operator)))?,
                left: Box::new(result),
                right: Box::new(right),
            };
        }

        Ok(result)
    }

    /// Parse logical OR and nullish coalescing (||, ??)
    fn parse_logical_or(&mut self) -> ParseResult<Expr> {
        self.parse_binary(&["||", "??"], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> ParseResult<Expr> {
        self.parse_binary(&["&&"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        self.parse_binary(&["===", "!==", "==", "!="], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        self.parse_binary(&["<", "<=", ">", ">="], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        self.parse_binary(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        self.parse_binary(&["*", "/", "%"], Self::parse_exponentiation)
    }

    /// Parse exponentiation (**), right-associative
    fn parse_exponentiation(&mut self) -> ParseResult<Expr> {
        let base = self.parse_prefix()?;
        if self.consume_optional_operator("**") {
            let exponent = self.parse_exponentiation()?;
            return Ok(Expr::Binary {
                operator: BinaryOperator::Power,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        let operator = match self.peek() {
            Some(token) if token.is_operator("!") => Some(UnaryOperator::Not),
            Some(token) if token.is_operator("-") => Some(UnaryOperator::Minus),
            Some(token) if token.is_operator("+") => Some(UnaryOperator::Plus),
            Some(token) if token.is_keyword_named("typeof") => Some(UnaryOperator::Typeof),
            _ => None,
        };

        match operator {
            Some(operator) => {
                self.next()?;
                let operand = self.parse_prefix()?;
                Ok(Expr::Unary {
                    operator,
                    operand: Box::new(operand),
                })
            }
            None => self.parse_call_chain(),
        }
    }

    /// Member access, indexing and calls, including optional links
    fn parse_call_chain(&mut self) -> ParseResult<Expr> {
        let mut result = self.parse_primary()?;

        loop {
            if self.consume_optional_character('.') {
                let property = self.expect_property_name()?;
                result = Expr::Member {
                    object: Box::new(result),
                    property,
                    optional: false,
                };
            } else if self.consume_optional_operator("?.") {
                if self.consume_optional_character('(') {
                    let arguments = self.parse_call_arguments()?;
                    result = Expr::Call {
                        callee: Box::new(result),
                        arguments,
                        optional: true,
                    };
                } else if self.consume_optional_character('[') {
                    let index = self.parse_expression()?;
                    self.expect_character(']')?;
                    result = Expr::Index {
                        object: Box::new(result),
                        index: Box::new(index),
                        optional: true,
                    };
                } else {
                    let property = self.expect_property_name()?;
                    result = Expr::Member {
                        object: Box::new(result),
                        property,
                        optional: true,
                    };
                }
            } else if self.consume_optional_character('[') {
                let index = self.parse_expression()?;
                self.expect_character(']')?;
                result = Expr::Index {
                    object: Box::new(result),
                    index: Box::new(index),
                    optional: false,
                };
            } else if self.consume_optional_character('(') {
                let arguments = self.parse_call_arguments()?;
                result = Expr::Call {
                    callee: Box::new(result),
                    arguments,
                    optional: false,
                };
            } else {
                break;
            }
        }

        Ok(result)
    }

    fn expect_property_name(&mut self) -> ParseResult<String> {
        let token = self.next()?;
        if token.is_identifier() || token.is_keyword() {
            Ok(token.str_value)
        } else {
            Err(self.unexpected(&token))
        }
    }

    /// Arguments after an opening parenthesis, through the closing one
    fn parse_call_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.parse_list(')')
    }

    /// Comma-separated expressions through `close`; a trailing comma is allowed.
    fn parse_list(&mut self, close: char) -> ParseResult<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.consume_optional_character(close) {
            items.push(self.parse_expression()?);
            if !self.consume_optional_character(',') {
                self.expect_character(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.next()?;

        if token.is_character('(') {
            let expr = self.parse_expression()?;
            self.expect_character(')')?;
            return Ok(expr);
        }
        if token.is_character('[') {
            let elements = self.parse_list(']')?;
            return Ok(Expr::Array { elements });
        }
        if token.is_character('{') {
            return self.parse_literal_map();
        }
        if token.is_number() {
            return Ok(Expr::number(token.num_value));
        }
        if token.is_string() {
            return Ok(Expr::string(token.str_value));
        }
        if token.is_identifier() {
            return Ok(Expr::Identifier {
                name: token.str_value,
            });
        }
        if token.is_keyword() {
            let value = match token.str_value.as_str() {
                "true" => LiteralValue::Boolean(true),
                "false" => LiteralValue::Boolean(false),
                "null" => LiteralValue::Null,
                "undefined" => LiteralValue::Undefined,
                "this" => return Ok(Expr::This),
                _ => return Err(self.unexpected(&token)),
            };
            return Ok(Expr::Literal { value });
        }

        Err(self.unexpected(&token))
    }

    /// Object literal after its opening brace
    fn parse_literal_map(&mut self) -> ParseResult<Expr> {
        let mut properties = Vec::new();

        while !self.consume_optional_character('}') {
            let token = self.next()?;
            let key = if token.is_identifier() || token.is_keyword() || token.is_string() {
                token.str_value.clone()
            } else if token.is_number() {
                format_number(token.num_value)
            } else {
                return Err(self.unexpected(&token));
            };

            if token.is_identifier() && !matches!(self.peek(), Some(next) if next.is_character(':')) {
                properties.push(Property {
                    value: Expr::identifier(key.clone()),
                    key,
                    shorthand: true,
                });
            } else {
                self.expect_character(':')?;
                let value = self.parse_expression()?;
                properties.push(Property {
                    key,
                    value,
                    shorthand: false,
                });
            }

            if !self.consume_optional_character(',') {
                self.expect_character('}')?;
                break;
            }
        }

        Ok(Expr::Object { properties })
    }
}
