//! Template AST
//!
//! Nodes hold only literal data and host expressions, so a parsed template
//! can be shared across compilations.

use serde::{Deserialize, Serialize};

use crate::expression_parser::Expr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TemplateNode {
    Element(Element),
    Text { value: String },
    Expression { value: Expr },
    If(IfBlock),
    For(ForBlock),
}

impl TemplateNode {
    pub fn text(value: impl Into<String>) -> Self {
        TemplateNode::Text { value: value.into() }
    }

    pub fn expression(value: Expr) -> Self {
        TemplateNode::Expression { value }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            TemplateNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<TemplateNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    Literal,
    Flag,
    Property,
    Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum AttributeValue {
    Text(String),
    Bool(bool),
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            kind: AttributeKind::Literal,
            value: AttributeValue::Text(value.into()),
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            kind: AttributeKind::Flag,
            value: AttributeValue::Bool(true),
        }
    }

    pub fn property(name: impl Into<String>, value: Expr) -> Self {
        Attribute {
            name: name.into(),
            kind: AttributeKind::Property,
            value: AttributeValue::Expression(value),
        }
    }

    pub fn event(name: impl Into<String>, value: Expr) -> Self {
        Attribute {
            name: name.into(),
            kind: AttributeKind::Event,
            value: AttributeValue::Expression(value),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            AttributeValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn expression(&self) -> Option<&Expr> {
        match &self.value {
            AttributeValue::Expression(expr) => Some(expr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElseIf {
    pub test: Expr,
    pub then: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfBlock {
    pub test: Expr,
    pub then: Vec<TemplateNode>,
    pub elifs: Vec<ElseIf>,
    pub otherwise: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForBlock {
    /// Binding for the current item; the code generator only accepts a
    /// plain identifier here.
    pub item: Expr,
    pub items: Expr,
    pub track: Expr,
    pub children: Vec<TemplateNode>,
    pub empty: Vec<TemplateNode>,
}
