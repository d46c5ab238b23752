//! Character Codes
//!
//! Character constants and classification helpers shared by the template
//! scanner and the expression lexer.

pub const EOF: char = '\0';
pub const NEWLINE: char = '\n';

pub const DQ: char = '"';
pub const SQ: char = '\'';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const COMMA: char = ',';
pub const PERIOD: char = '.';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const LBRACKET: char = '[';
pub const BACKSLASH: char = '\\';
pub const RBRACKET: char = ']';
pub const LBRACE: char = '{';
pub const RBRACE: char = '}';

/// Check if character is whitespace
pub fn is_whitespace(ch: char) -> bool {
    (ch <= ' ' && ch != EOF) || ch == '\u{00A0}'
}

/// Check if character is a digit
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Check if character can start an identifier
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

/// Check if character can be part of an identifier
pub fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || is_digit(ch)
}

/// Check if character can appear in an element tag name
pub fn is_tag_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}
