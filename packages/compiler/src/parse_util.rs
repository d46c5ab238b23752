//! Parse Utilities
//!
//! Source files, locations and position-bearing parse errors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chars;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        ParseSourceFile {
            content: content.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseLocation {
    pub file: ParseSourceFile,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    fn new(file: ParseSourceFile, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            file,
            offset,
            line,
            col,
        }
    }

    /// Location of byte `offset` in `file`, with zero-based line and column.
    fn from_offset(file: ParseSourceFile, offset: usize) -> Self {
        let offset = offset.min(file.content.len());
        let mut line = 0;
        let mut col = 0;
        for ch in file.content[..offset].chars() {
            if ch == chars::NEWLINE {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        ParseLocation::new(file, offset, line, col)
    }

    /// Return the source around the location
    /// Up to `max_chars` or `max_lines` on each side of the location
    fn get_context(&self, max_chars: usize, max_lines: usize) -> Option<(String, String)> {
        let content = &self.file.content;
        if content.is_empty() {
            return None;
        }
        let offset = self.offset.min(content.len());

        let mut before = Vec::new();
        let mut lines = 0;
        for ch in content[..offset].chars().rev().take(max_chars) {
            if ch == chars::NEWLINE {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
            before.push(ch);
        }
        before.reverse();

        let mut after = String::new();
        lines = 0;
        for ch in content[offset..].chars().take(max_chars) {
            if ch == chars::NEWLINE {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
            after.push(ch);
        }
        Some((before.into_iter().collect(), after))
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.file.url, self.line, self.col)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
}

impl ParseSourceSpan {
    fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan { start, end }
    }

    pub fn at(file: ParseSourceFile, offset: usize) -> Self {
        let location = ParseLocation::from_offset(file, offset);
        ParseSourceSpan::new(location.clone(), location)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
        }
    }

    pub fn contextual_message(&self) -> String {
        if let Some((before, after)) = self.span.start.get_context(100, 3) {
            format!("{} (\"{}[ERROR ->]{}\")", self.msg, before, after)
        } else {
            self.msg.clone()
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.contextual_message(), self.span.start)
    }
}

impl std::error::Error for ParseError {}

/// Sanitize identifier by replacing non-word characters with underscores
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect()
}
