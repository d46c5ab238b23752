/**
 * Expression Lexer
 *
 * Scans host-expression tokens on demand, starting at an arbitrary offset
 * inside template text. Tokens are produced lazily so the parser can stop at
 * the first token that does not continue the expression, whatever follows it.
 */
use serde::{Deserialize, Serialize};

use crate::chars;

/// Token types in host expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenType {
    Character = 0,
    Identifier = 1,
    Keyword = 2,
    String = 3,
    Operator = 4,
    Number = 5,
    Error = 6,
}

/// Token representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub num_value: f64,
    pub str_value: String,
}

impl Token {
    fn new(index: usize, end: usize, token_type: TokenType, num_value: f64, str_value: String) -> Self {
        Token {
            index,
            end,
            token_type,
            num_value,
            str_value,
        }
    }

    fn operator(index: usize, end: usize, str_value: &str) -> Self {
        Token::new(index, end, TokenType::Operator, 0.0, str_value.to_string())
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.starts_with(code)
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_keyword_named(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == keyword
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }
}

const KEYWORDS: &[&str] = &["null", "undefined", "true", "false", "this", "typeof"];

/// Operators, longest first so the scanner can take the first prefix match.
const OPERATORS: &[&str] = &[
    "===", "!==", "**", "==", "!=", "<=", ">=", "&&", "||", "??", "?.", "=>", "+", "-", "*", "/",
    "%", "<", ">", "!", "?", "=",
];

/// On-demand scanner over `input`. Cheap to copy, which is how the parser
/// looks ahead and backtracks.
#[derive(Debug, Clone, Copy)]
pub struct Lexer<'a> {
    input: &'a str,
    index: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, offset: usize) -> Self {
        Lexer {
            input,
            index: offset.min(input.len()),
        }
    }

    fn peek_char(&self) -> char {
        self.char_at(self.index)
    }

    fn char_at(&self, index: usize) -> char {
        self.input
            .get(index..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(chars::EOF)
    }

    fn advance(&mut self) {
        self.index += self.peek_char().len_utf8();
    }

    fn skip_whitespace(&mut self) {
        while self.index < self.input.len() && chars::is_whitespace(self.peek_char()) {
            self.advance();
        }
    }

    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        if self.index >= self.input.len() {
            return None;
        }

        let start = self.index;
        let ch = self.peek_char();

        if chars::is_identifier_start(ch) {
            return Some(self.scan_identifier());
        }
        if chars::is_digit(ch) || (ch == chars::PERIOD && chars::is_digit(self.char_at(start + 1))) {
            return Some(self.scan_number(start));
        }

        match ch {
            chars::PERIOD
            | chars::LPAREN
            | chars::RPAREN
            | chars::LBRACKET
            | chars::RBRACKET
            | chars::LBRACE
            | chars::RBRACE
            | chars::COMMA
            | chars::COLON
            | chars::SEMICOLON => Some(self.scan_character(start, ch)),
            chars::SQ | chars::DQ => Some(self.scan_string(ch)),
            _ => Some(self.scan_operator(start, ch)),
        }
    }

    fn scan_character(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        Token::new(start, self.index, TokenType::Character, ch as u32 as f64, ch.to_string())
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.index;
        self.advance();
        while self.index < self.input.len() && chars::is_identifier_part(self.peek_char()) {
            self.advance();
        }

        let str_value = self.input[start..self.index].to_string();
        let token_type = if KEYWORDS.contains(&str_value.as_str()) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        Token::new(start, self.index, token_type, 0.0, str_value)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while chars::is_digit(self.peek_char()) {
            self.advance();
        }
        if self.peek_char() == chars::PERIOD && chars::is_digit(self.char_at(self.index + 1)) {
            self.advance();
            while chars::is_digit(self.peek_char()) {
                self.advance();
            }
        }
        if matches!(self.peek_char(), 'e' | 'E') {
            self.advance();
            if matches!(self.peek_char(), '+' | '-') {
                self.advance();
            }
            if !chars::is_digit(self.peek_char()) {
                return self.error(start, "Invalid exponent");
            }
            while chars::is_digit(self.peek_char()) {
                self.advance();
            }
        }

        let text = &self.input[start..self.index];
        match text.parse::<f64>() {
            Ok(value) => Token::new(start, self.index, TokenType::Number, value, String::new()),
            Err(_) => self.error(start, &format!("Invalid number [{}]", text)),
        }
    }

    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.index;
        self.advance();

        let mut buffer = String::new();
        loop {
            if self.index >= self.input.len() {
                return self.error(start, "Unterminated quote");
            }
            let ch = self.peek_char();
            if ch == quote {
                self.advance();
                break;
            }
            if ch == chars::BACKSLASH {
                self.advance();
                match self.scan_escape() {
                    Some(unescaped) => buffer.push(unescaped),
                    None => return self.error(start, "Invalid unicode escape"),
                }
                continue;
            }
            buffer.push(ch);
            self.advance();
        }

        Token::new(start, self.index, TokenType::String, 0.0, buffer)
    }

    fn scan_escape(&mut self) -> Option<char> {
        let ch = self.peek_char();
        self.advance();
        let unescaped = match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            'u' => {
                let hex_start = self.index;
                for _ in 0..4 {
                    if !self.peek_char().is_ascii_hexdigit() {
                        return None;
                    }
                    self.advance();
                }
                let code = u32::from_str_radix(&self.input[hex_start..self.index], 16).ok()?;
                return char::from_u32(code);
            }
            other => other,
        };
        Some(unescaped)
    }

    fn scan_operator(&mut self, start: usize, ch: char) -> Token {
        let rest = &self.input[start..];
        for operator in OPERATORS {
            if !rest.starts_with(operator) {
                continue;
            }
            // `a?.5:b` is a conditional, not an optional chain
            if *operator == "?." && chars::is_digit(self.char_at(start + 2)) {
                continue;
            }
            self.index = start + operator.len();
            return Token::operator(start, self.index, operator);
        }

        self.advance();
        self.error(start, &format!("Unexpected character [{}]", ch))
    }

    fn error(&self, start: usize, message: &str) -> Token {
        Token::new(
            start,
            self.index.max(start + 1).min(self.input.len()),
            TokenType::Error,
            0.0,
            format!("Lexer Error: {} at column {}", message, start),
        )
    }
}
