/**
 * Host Expression AST
 *
 * Plain data: expressions hold no live state and can be shared across
 * compilations and threads.
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "typeof")]
    Typeof,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Typeof => "typeof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "**")]
    Power,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Modulo,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "<")]
    Lower,
    #[serde(rename = "<=")]
    LowerEquals,
    #[serde(rename = ">")]
    Bigger,
    #[serde(rename = ">=")]
    BiggerEquals,
    #[serde(rename = "==")]
    Equals,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = "===")]
    Identical,
    #[serde(rename = "!==")]
    NotIdentical,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "??")]
    NullishCoalesce,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Power => "**",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Lower => "<",
            BinaryOperator::LowerEquals => "<=",
            BinaryOperator::Bigger => ">",
            BinaryOperator::BiggerEquals => ">=",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Identical => "===",
            BinaryOperator::NotIdentical => "!==",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::NullishCoalesce => "??",
        }
    }

    pub fn from_operator(operator: &str) -> Option<Self> {
        Some(match operator {
            "**" => BinaryOperator::Power,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "%" => BinaryOperator::Modulo,
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "<" => BinaryOperator::Lower,
            "<=" => BinaryOperator::LowerEquals,
            ">" => BinaryOperator::Bigger,
            ">=" => BinaryOperator::BiggerEquals,
            "==" => BinaryOperator::Equals,
            "!=" => BinaryOperator::NotEquals,
            "===" => BinaryOperator::Identical,
            "!==" => BinaryOperator::NotIdentical,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            "??" => BinaryOperator::NullishCoalesce,
            _ => return None,
        })
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Or | BinaryOperator::NullishCoalesce => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Equals
            | BinaryOperator::NotEquals
            | BinaryOperator::Identical
            | BinaryOperator::NotIdentical => 3,
            BinaryOperator::Lower
            | BinaryOperator::LowerEquals
            | BinaryOperator::Bigger
            | BinaryOperator::BiggerEquals => 4,
            BinaryOperator::Add | BinaryOperator::Subtract => 5,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 6,
            BinaryOperator::Power => 7,
        }
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, BinaryOperator::Power)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: Expr,
    pub shorthand: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    Literal {
        value: LiteralValue,
    },
    Identifier {
        name: String,
    },
    This,
    Array {
        elements: Vec<Expr>,
    },
    Object {
        properties: Vec<Property>,
    },
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        optional: bool,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Arrow {
        params: Vec<String>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier { name: name.into() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal {
            value: LiteralValue::String(value.into()),
        }
    }

    pub fn number(value: f64) -> Self {
        Expr::Literal {
            value: LiteralValue::Number(value),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Literal {
            value: LiteralValue::Boolean(value),
        }
    }

    pub fn member(object: Expr, property: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            property: property.into(),
            optional: false,
        }
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            arguments,
            optional: false,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// True for the links of a member/call chain.
    pub fn is_chain_link(&self) -> bool {
        matches!(self, Expr::Member { .. } | Expr::Index { .. } | Expr::Call { .. })
    }

    /// True if evaluating the expression short-circuits somewhere along its
    /// member/call chain.
    pub fn has_optional_link(&self) -> bool {
        match self {
            Expr::Member { object, optional, .. }
            | Expr::Index { object, optional, .. } => *optional || object.has_optional_link(),
            Expr::Call { callee, optional, .. } => *optional || callee.has_optional_link(),
            _ => false,
        }
    }
}
