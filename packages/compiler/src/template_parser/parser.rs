//! Template Parser
//!
//! Single forward cursor over the template text. At each position the parser
//! tries, in order: an element (`<`), an interpolation (`{{`), an `@if`
//! block, a `@for` block, and finally a text run. Host expressions are
//! delegated to the expression parser, which reports where it stopped.

use super::ast::*;
use crate::chars;
use crate::expression_parser::{Expr, Parser as ExpressionParser};
use crate::parse_util::{ParseError, ParseSourceFile, ParseSourceSpan};

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parses template text into its node list.
pub fn parse_template(text: &str) -> ParseResult<Vec<TemplateNode>> {
    TemplateParser::new(text, "template.html").parse()
}

/// Where a run of sibling nodes ends
#[derive(Debug, Clone, Copy)]
enum Terminator<'t> {
    EndOfInput,
    EndTag(&'t str, usize),
    CloseBrace(&'static str, usize),
}

pub struct TemplateParser<'a> {
    source: &'a str,
    url: &'a str,
    index: usize,
}

impl<'a> TemplateParser<'a> {
    pub fn new(source: &'a str, url: &'a str) -> Self {
        TemplateParser { source, url, index: 0 }
    }

    pub fn parse(mut self) -> ParseResult<Vec<TemplateNode>> {
        self.parse_fragments(Terminator::EndOfInput)
    }

    fn error_at(&self, index: usize, message: impl Into<String>) -> ParseError {
        let file = ParseSourceFile::new(self.source, self.url);
        ParseError::new(ParseSourceSpan::at(file, index), message)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.index..]
    }

    fn at_end(&self) -> bool {
        self.index >= self.source.len()
    }

    fn matches(&self, text: &str) -> bool {
        self.rest().starts_with(text)
    }

    fn peek_char(&self) -> char {
        self.rest().chars().next().unwrap_or(chars::EOF)
    }

    fn eat(&mut self, text: &str) -> ParseResult<()> {
        if self.matches(text) {
            self.index += text.len();
            Ok(())
        } else {
            Err(self.error_at(self.index, format!("Expected \"{}\"", text)))
        }
    }

    /// Consumes `keyword` only when it is not the prefix of a longer word.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if !self.matches(keyword) {
            return false;
        }
        let next = self.source[self.index + keyword.len()..].chars().next();
        if next.map_or(false, chars::is_identifier_part) {
            return false;
        }
        self.index += keyword.len();
        true
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.index;
        while let Some(ch) = self.rest().chars().next() {
            if !predicate(ch) {
                break;
            }
            self.index += ch.len_utf8();
        }
        &self.source[start..self.index]
    }

    fn skip_whitespace(&mut self) {
        self.read_while(chars::is_whitespace);
    }

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        let (expr, end) = ExpressionParser::new(self.source, self.url).parse_at(self.index)?;
        self.index = end;
        Ok(expr)
    }

    fn is_terminated(&self, terminator: Terminator<'_>) -> bool {
        match terminator {
            Terminator::EndOfInput => self.at_end(),
            Terminator::EndTag(name, _) => {
                let rest = self.rest();
                rest.starts_with("</")
                    && rest[2..].starts_with(name)
                    && rest[2 + name.len()..].starts_with('>')
            }
            Terminator::CloseBrace(_, _) => self.matches("}"),
        }
    }

    fn parse_fragments(&mut self, terminator: Terminator<'_>) -> ParseResult<Vec<TemplateNode>> {
        let mut fragments = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_terminated(terminator) {
                break;
            }
            if self.at_end() {
                return Err(match terminator {
                    Terminator::EndTag(name, start) => {
                        self.error_at(start, format!("Missing closing tag </{}>", name))
                    }
                    Terminator::CloseBrace(block, start) => {
                        self.error_at(start, format!("Missing '}}' closing {} block", block))
                    }
                    Terminator::EndOfInput => self.error_at(self.index, "Unexpected end of template"),
                });
            }
            if self.matches("}") {
                return Err(self.error_at(self.index, "Unexpected '}'"));
            }
            if let Some(fragment) = self.parse_fragment()? {
                fragments.push(fragment);
            }
        }

        Ok(fragments)
    }

    fn parse_fragment(&mut self) -> ParseResult<Option<TemplateNode>> {
        if self.matches("<") {
            return self.parse_element().map(Some);
        }
        if self.matches("{{") {
            return self.parse_interpolation().map(Some);
        }
        if self.matches("@if") {
            return self.parse_if().map(Some);
        }
        if self.matches("@for") {
            return self.parse_for().map(Some);
        }
        Ok(self.parse_text())
    }

    fn parse_element(&mut self) -> ParseResult<TemplateNode> {
        let start = self.index;
        self.eat("<")?;
        if self.matches("/") {
            let name = self.source[self.index + 1..]
                .chars()
                .take_while(|c| chars::is_tag_name_char(*c))
                .collect::<String>();
            return Err(self.error_at(start, format!("Unexpected closing tag </{}>", name)));
        }

        let name = self.read_while(chars::is_tag_name_char);
        if name.is_empty() {
            return Err(self.error_at(self.index, "Expected tag name"));
        }

        let mut element = Element::new(name);
        element.attributes = self.parse_attribute_list()?;

        if self.matches("/>") {
            self.index += 2;
        } else {
            self.eat(">")?;
            element.children = self.parse_fragments(Terminator::EndTag(name, start))?;
            self.eat(&format!("</{}>", name))?;
        }

        Ok(TemplateNode::Element(element))
    }

    fn parse_attribute_list(&mut self) -> ParseResult<Vec<Attribute>> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            if self.matches(">") || self.matches("/>") {
                return Ok(attributes);
            }
            if self.at_end() {
                return Err(self.error_at(self.index, "Unterminated start tag"));
            }
            attributes.push(self.parse_attribute()?);
        }
    }

    fn parse_attribute(&mut self) -> ParseResult<Attribute> {
        let start = self.index;
        let mut name = String::new();
        while let Some(ch) = self.rest().chars().next() {
            if ch == chars::EQ || ch == chars::GT || chars::is_whitespace(ch) || self.matches("/>") {
                break;
            }
            name.push(ch);
            self.index += ch.len_utf8();
        }
        if name.is_empty() {
            return Err(self.error_at(start, "Expected attribute name"));
        }

        if !self.matches("=") {
            return Ok(Attribute::flag(name));
        }
        self.index += 1;
        if !self.matches("\"") {
            return Err(self.error_at(self.index, "Expected '\"' after '='"));
        }
        self.index += 1;

        let bound = (name.starts_with('[') && name.ends_with(']'))
            || (name.starts_with('(') && name.ends_with(')'));
        if bound && name.len() > 2 {
            let value = self.parse_expression()?;
            self.skip_whitespace();
            self.eat("\"")?;
            let inner = name[1..name.len() - 1].to_string();
            return Ok(if name.starts_with('[') {
                Attribute::property(inner, value)
            } else {
                Attribute::event(inner, value)
            });
        }

        let value = self.read_while(|c| c != chars::DQ);
        if self.at_end() {
            return Err(self.error_at(start, format!("Unterminated value of attribute {}", name)));
        }
        self.index += 1;
        Ok(Attribute::literal(name, value))
    }

    fn parse_interpolation(&mut self) -> ParseResult<TemplateNode> {
        self.eat("{{")?;
        self.skip_whitespace();
        let value = self.parse_expression()?;
        self.skip_whitespace();
        self.eat("}}")?;
        Ok(TemplateNode::expression(value))
    }

    /// `(expr)`, with whitespace allowed inside the parentheses
    fn parse_parenthesized(&mut self) -> ParseResult<Expr> {
        self.skip_whitespace();
        self.eat("(")?;
        self.skip_whitespace();
        let expr = self.parse_expression()?;
        self.skip_whitespace();
        self.eat(")")?;
        Ok(expr)
    }

    /// `{ children }`
    fn parse_block_body(&mut self, block: &'static str) -> ParseResult<Vec<TemplateNode>> {
        self.skip_whitespace();
        let start = self.index;
        self.eat("{")?;
        let children = self.parse_fragments(Terminator::CloseBrace(block, start))?;
        self.eat("}")?;
        Ok(children)
    }

    fn parse_if(&mut self) -> ParseResult<TemplateNode> {
        self.eat("@if")?;
        let test = self.parse_parenthesized()?;
        let then = self.parse_block_body("@if")?;

        let mut elifs = Vec::new();
        let mut otherwise = None;
        loop {
            let before = self.index;
            self.skip_whitespace();
            if !self.eat_keyword("@else") {
                self.index = before;
                break;
            }
            if otherwise.is_some() {
                return Err(self.error_at(before, "@else after the final @else branch"));
            }
            self.skip_whitespace();
            if self.eat_keyword("if") {
                let test = self.parse_parenthesized()?;
                let then = self.parse_block_body("@else if")?;
                elifs.push(ElseIf { test, then });
            } else {
                otherwise = Some(self.parse_block_body("@else")?);
            }
        }

        Ok(TemplateNode::If(IfBlock {
            test,
            then,
            elifs,
            otherwise: otherwise.unwrap_or_default(),
        }))
    }

    fn parse_for(&mut self) -> ParseResult<TemplateNode> {
        self.eat("@for")?;
        self.skip_whitespace();
        self.eat("(")?;
        self.skip_whitespace();
        let item = self.parse_expression()?;
        self.skip_whitespace();
        if !self.eat_keyword("of") {
            return Err(self.error_at(self.index, "Expected \"of\""));
        }
        self.skip_whitespace();
        let items = self.parse_expression()?;
        self.skip_whitespace();
        self.eat(";")?;
        self.skip_whitespace();
        if !self.eat_keyword("track") {
            return Err(self.error_at(self.index, "Expected \"track\""));
        }
        self.skip_whitespace();
        let track = self.parse_expression()?;
        self.skip_whitespace();
        self.eat(")")?;
        let children = self.parse_block_body("@for")?;

        let before = self.index;
        self.skip_whitespace();
        let empty = if self.eat_keyword("@empty") {
            self.parse_block_body("@empty")?
        } else {
            self.index = before;
            Vec::new()
        };

        Ok(TemplateNode::For(ForBlock {
            item,
            items,
            track,
            children,
            empty,
        }))
    }

    fn is_text_end(&self) -> bool {
        let rest = self.rest();
        rest.starts_with('<')
            || rest.starts_with('}')
            || rest.starts_with("{{")
            || rest.starts_with("@if")
            || rest.starts_with("@for")
    }

    /// Text up to the next marker. Trailing whitespace that starts with a
    /// line break belongs to the layout, not to the text.
    fn parse_text(&mut self) -> Option<TemplateNode> {
        let start = self.index;
        while !self.at_end() && !self.is_text_end() {
            self.index += self.peek_char().len_utf8();
        }

        let raw = &self.source[start..self.index];
        let content_end = raw.trim_end().len();
        let value = match raw[content_end..].find('\n') {
            Some(newline) => &raw[..content_end + newline],
            None => raw,
        };

        if value.trim().is_empty() {
            None
        } else {
            Some(TemplateNode::text(value))
        }
    }
}
