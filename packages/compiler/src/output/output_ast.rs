//! Output AST Module
//!
//! The generated program: an ES module importing the runtime constructors it
//! uses and exporting one component definition. Host expressions from the
//! template are embedded unchanged as [`Expression::Host`].

use serde::{Deserialize, Serialize};

use crate::expression_parser::{Expr, LiteralValue};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Statement>,
}

impl Program {
    pub fn imports(&self) -> impl Iterator<Item = (&[ImportSpecifier], &str)> {
        self.body.iter().filter_map(|statement| match statement {
            Statement::Import { specifiers, source } => Some((specifiers.as_slice(), source.as_str())),
            _ => None,
        })
    }

    /// Sources of every import, in program order.
    pub fn import_sources(&self) -> Vec<&str> {
        self.imports().map(|(_, source)| source).collect()
    }

    /// Names imported from `source`, default imports included.
    pub fn imported_names(&self, source: &str) -> Vec<&str> {
        self.imports()
            .filter(|(_, from)| *from == source)
            .flat_map(|(specifiers, _)| specifiers.iter().map(ImportSpecifier::local))
            .collect()
    }

    pub fn export_default(&self) -> Option<&Expression> {
        self.body.iter().find_map(|statement| match statement {
            Statement::ExportDefault(expr) => Some(expr),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name")]
pub enum ImportSpecifier {
    Default(String),
    Named(String),
}

impl ImportSpecifier {
    pub fn local(&self) -> &str {
        match self {
            ImportSpecifier::Default(name) | ImportSpecifier::Named(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: String,
    pub init: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    /// `import a, { b } from "source"`; no specifiers imports for side effects.
    Import {
        specifiers: Vec<ImportSpecifier>,
        source: String,
    },
    Const {
        declarations: Vec<Declarator>,
    },
    ExportDefault(Expression),
    Return(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub key: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Param {
    Identifier {
        name: String,
    },
    /// `{ key: local, ... }`
    Pattern {
        bindings: Vec<(String, String)>,
    },
}

impl Param {
    pub fn ident(name: impl Into<String>) -> Self {
        Param::Identifier { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    Identifier {
        name: String,
    },
    Literal {
        value: LiteralValue,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Member {
        object: Box<Expression>,
        property: String,
    },
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    Object {
        properties: Vec<ObjectProperty>,
    },
    Array {
        elements: Vec<Expression>,
    },
    Arrow {
        params: Vec<Param>,
        body: Box<Expression>,
    },
    Function {
        params: Vec<String>,
        body: Vec<Statement>,
    },
    Host {
        expr: Expr,
    },
}

impl Expression {
    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Identifier { name: name.into() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal {
            value: LiteralValue::String(value.into()),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Literal {
            value: LiteralValue::Boolean(value),
        }
    }

    pub fn null() -> Self {
        Expression::Literal {
            value: LiteralValue::Null,
        }
    }

    pub fn host(expr: Expr) -> Self {
        Expression::Host { expr }
    }

    pub fn call(callee: Expression, arguments: Vec<Expression>) -> Self {
        Expression::Call {
            callee: Box::new(callee),
            arguments,
        }
    }

    /// Zero-argument arrow returning `body`.
    pub fn thunk(body: Expression) -> Self {
        Expression::Arrow {
            params: Vec::new(),
            body: Box::new(body),
        }
    }

    pub fn arrow(params: Vec<Param>, body: Expression) -> Self {
        Expression::Arrow {
            params,
            body: Box::new(body),
        }
    }

    pub fn object(properties: Vec<ObjectProperty>) -> Self {
        Expression::Object { properties }
    }

    pub fn array(elements: Vec<Expression>) -> Self {
        Expression::Array { elements }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Expression::Literal { value: LiteralValue::Null })
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expression::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Looks up `key` on an object expression.
    pub fn property(&self, key: &str) -> Option<&Expression> {
        match self {
            Expression::Object { properties } => properties
                .iter()
                .find(|property| property.key == key)
                .map(|property| &property.value),
            _ => None,
        }
    }
}

impl ObjectProperty {
    pub fn new(key: impl Into<String>, value: Expression) -> Self {
        ObjectProperty {
            key: key.into(),
            value,
        }
    }
}
