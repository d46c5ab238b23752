/**
 * Expression Serializer
 *
 * Serializes an expression back to source text. Parentheses are inserted
 * only where precedence requires them, so the output re-parses to an equal
 * AST and reads as valid JavaScript.
 */
use std::fmt;

use super::ast::*;

/// Serialize expression to string
pub fn serialize(expr: &Expr) -> String {
    let mut visitor = SerializeExpressionVisitor;
    visitor.visit(expr)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

/// Number formatting the host uses: integral values print without a
/// fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Single-quoted string literal with JavaScript escapes
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if (c as u32) < 0x20 => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// True if `key` can be written as a bare property name.
pub fn is_identifier_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if crate::chars::is_identifier_start(first) => chars.all(crate::chars::is_identifier_part),
        _ => false,
    }
}

const ARROW: u8 = 0;
const CONDITIONAL: u8 = 1;
const UNARY: u8 = 9;
const POSTFIX: u8 = 10;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Arrow { .. } => ARROW,
        Expr::Conditional { .. } => CONDITIONAL,
        Expr::Binary { operator, .. } => operator.precedence() + 1,
        Expr::Unary { .. } => UNARY,
        _ => POSTFIX,
    }
}

struct SerializeExpressionVisitor;

impl SerializeExpressionVisitor {
    fn visit(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Literal { value } => self.visit_literal(value),
            Expr::Identifier { name } => name.clone(),
            Expr::This => "this".to_string(),
            Expr::Array { elements } => format!("[{}]", self.visit_all(elements)),
            Expr::Object { properties } => self.visit_literal_map(properties),
            Expr::Member {
                object,
                property,
                optional,
            } => {
                let dot = if *optional { "?." } else { "." };
                format!("{}{}{}", self.visit_receiver(object), dot, property)
            }
            Expr::Index {
                object,
                index,
                optional,
            } => {
                let open = if *optional { "?.[" } else { "[" };
                format!("{}{}{}]", self.visit_receiver(object), open, self.visit(index))
            }
            Expr::Call {
                callee,
                arguments,
                optional,
            } => {
                let open = if *optional { "?.(" } else { "(" };
                format!("{}{}{})", self.visit_receiver(callee), open, self.visit_all(arguments))
            }
            Expr::Unary { operator, operand } => self.visit_unary(*operator, operand),
            Expr::Binary {
                operator,
                left,
                right,
            } => self.visit_binary(*operator, left, right),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let test = self.wrap_if(test, precedence(test) <= CONDITIONAL);
                format!("{} ? {} : {}", test, self.visit(consequent), self.visit(alternate))
            }
            Expr::Arrow { params, body } => {
                let body = self.wrap_if(body, matches!(**body, Expr::Object { .. }));
                format!("({}) => {}", params.join(", "), body)
            }
        }
    }

    fn visit_all(&mut self, exprs: &[Expr]) -> String {
        exprs.iter().map(|e| self.visit(e)).collect::<Vec<_>>().join(", ")
    }

    fn wrap_if(&mut self, expr: &Expr, wrap: bool) -> String {
        let text = self.visit(expr);
        if wrap {
            format!("({})", text)
        } else {
            text
        }
    }

    fn visit_receiver(&mut self, expr: &Expr) -> String {
        self.wrap_if(expr, precedence(expr) < POSTFIX)
    }

    fn visit_literal(&mut self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::Number(n) => format_number(*n),
            LiteralValue::String(s) => quote_string(s),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Undefined => "undefined".to_string(),
        }
    }

    fn visit_literal_map(&mut self, properties: &[Property]) -> String {
        if properties.is_empty() {
            return "{}".to_string();
        }
        let entries: Vec<String> = properties
            .iter()
            .map(|property| {
                if property.shorthand {
                    return property.key.clone();
                }
                let key = if is_identifier_name(&property.key) {
                    property.key.clone()
                } else {
                    quote_string(&property.key)
                };
                format!("{}: {}", key, self.visit(&property.value))
            })
            .collect();
        format!("{{ {} }}", entries.join(", "))
    }

    fn visit_unary(&mut self, operator: UnaryOperator, operand: &Expr) -> String {
        let inner = self.wrap_if(operand, precedence(operand) < UNARY);
        match operator {
            UnaryOperator::Typeof => format!("typeof {}", inner),
            UnaryOperator::Minus | UnaryOperator::Plus if inner.starts_with(['-', '+']) => {
                format!("{} {}", operator.as_str(), inner)
            }
            _ => format!("{}{}", operator.as_str(), inner),
        }
    }

    fn visit_binary(&mut self, operator: BinaryOperator, left: &Expr, right: &Expr) -> String {
        let own = operator.precedence() + 1;
        let right_assoc = operator.is_right_associative();

        let left_prec = precedence(left);
        let left = self.wrap_if(left, left_prec < own || (left_prec == own && right_assoc));
        let right_prec = precedence(right);
        let right = self.wrap_if(right, right_prec < own || (right_prec == own && !right_assoc));

        format!("{} {} {}", left, operator.as_str(), right)
    }
}
