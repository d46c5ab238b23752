//! Host Expression Interpreter
//!
//! Evaluates template expressions over the dynamic [`Value`] model with the
//! host language's semantics. Errors the host would throw at runtime
//! (`TypeError`, `ReferenceError`) are raised as panics, which propagate to
//! whoever triggered the reactive read.

use std::cmp::Ordering;
use std::rc::Rc;

use htmly_core::Value;
use indexmap::IndexMap;

use crate::expression_parser::serializer::format_number;
use crate::expression_parser::{serialize, BinaryOperator, Expr, LiteralValue, UnaryOperator};

/// Bindings visible to an expression: the component context as `this`
/// plus lexically bound names.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    this: Value,
    vars: Rc<IndexMap<String, Value>>,
}

impl Scope {
    pub fn new(this: Value) -> Self {
        Scope {
            this,
            vars: Rc::new(IndexMap::new()),
        }
    }

    pub fn this(&self) -> &Value {
        &self.this
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Child scope with `name` bound, shadowing any outer binding.
    pub fn with_var(&self, name: impl Into<String>, value: Value) -> Scope {
        self.with_vars(std::iter::once((name.into(), value)))
    }

    pub fn with_vars(&self, bindings: impl IntoIterator<Item = (String, Value)>) -> Scope {
        let mut vars = (*self.vars).clone();
        vars.extend(bindings);
        Scope {
            this: self.this.clone(),
            vars: Rc::new(vars),
        }
    }
}

pub fn evaluate(expr: &Expr, scope: &Scope) -> Value {
    Interpreter { scope }.visit(expr)
}

/// Property key an index expression's value designates.
pub fn property_key(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        other => other.to_display_string(),
    }
}

pub fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::String(s) => Value::string(s.as_str()),
        LiteralValue::Boolean(b) => Value::Bool(*b),
        LiteralValue::Null => Value::Null,
        LiteralValue::Undefined => Value::Undefined,
    }
}

/// `===`
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
        (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
        _ => left == right,
    }
}

/// `==`
pub fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (l, r) if l.is_nullish() || r.is_nullish() => l.is_nullish() && r.is_nullish(),
        (Value::Number(_) | Value::String(_) | Value::Bool(_), Value::Number(_) | Value::String(_) | Value::Bool(_))
            if std::mem::discriminant(left) != std::mem::discriminant(right) =>
        {
            left.to_number() == right.to_number()
        }
        _ => strict_equals(left, right),
    }
}

fn add(left: &Value, right: &Value) -> Value {
    let concatenates = |v: &Value| matches!(v, Value::String(_) | Value::Array(_) | Value::Object(_));
    if concatenates(left) || concatenates(right) {
        let mut text = left.to_display_string();
        text.push_str(&right.to_display_string());
        Value::string(text)
    } else {
        Value::Number(left.to_number() + right.to_number())
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

struct Interpreter<'s> {
    scope: &'s Scope,
}

impl Interpreter<'_> {
    fn visit(&self, expr: &Expr) -> Value {
        match expr {
            Expr::Literal { value } => literal_value(value),
            Expr::Identifier { name } => match self.scope.lookup(name) {
                Some(value) => value.clone(),
                None => panic!("ReferenceError: {} is not defined", name),
            },
            Expr::This => self.scope.this().clone(),
            Expr::Array { elements } => Value::array(elements.iter().map(|e| self.visit(e))),
            Expr::Object { properties } => Value::object(
                properties
                    .iter()
                    .map(|property| (property.key.clone(), self.visit(&property.value))),
            ),
            Expr::Member { .. } | Expr::Index { .. } | Expr::Call { .. } => {
                self.visit_chain(expr).unwrap_or(Value::Undefined)
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
                if self.visit(test).is_truthy() {
                    self.visit(consequent)
                } else {
                    self.visit(alternate)
                }
            }
            Expr::Arrow { params, body } => self.visit_arrow(params, body),
        }
    }

    /// Evaluates a member/call chain. `None` means an optional link hit a
    /// nullish value and the rest of the chain was skipped.
    fn visit_chain(&self, expr: &Expr) -> Option<Value> {
        match expr {
            Expr::Member {
                object,
                property,
                optional,
            } => {
                let receiver = self.visit_link(object)?;
                if *optional && receiver.is_nullish() {
                    return None;
                }
                Some(self.read_member(&receiver, property, object))
            }
            Expr::Index {
                object,
                index,
                optional,
            } => {
                let receiver = self.visit_link(object)?;
                if *optional && receiver.is_nullish() {
                    return None;
                }
                let key = property_key(&self.visit(index));
                Some(self.read_member(&receiver, &key, object))
            }
            Expr::Call {
                callee,
                arguments,
                optional,
            } => {
                let function = self.visit_link(callee)?;
                if *optional && function.is_nullish() {
                    return None;
                }
                let args: Vec<Value> = arguments.iter().map(|arg| self.visit(arg)).collect();
                match function.as_function() {
                    Some(f) => Some(f.call(&args)),
                    None => panic!("TypeError: {} is not a function", serialize(callee)),
                }
            }
            _ => Some(self.visit(expr)),
        }
    }

    fn visit_link(&self, expr: &Expr) -> Option<Value> {
        if expr.is_chain_link() {
            self.visit_chain(expr)
        } else {
            Some(self.visit(expr))
        }
    }

    fn read_member(&self, receiver: &Value, key: &str, object: &Expr) -> Value {
        if receiver.is_nullish() {
            panic!(
                "TypeError: Cannot read properties of {} (reading '{}') in `{}`",
                receiver.to_display_string(),
                key,
                serialize(object)
            );
        }
        receiver.get(key)
    }

    fn visit_unary(&self, operator: UnaryOperator, operand: &Expr) -> Value {
        match operator {
            UnaryOperator::Typeof => {
                if let Expr::Identifier { name } = operand {
                    if self.scope.lookup(name).is_none() {
                        return Value::string("undefined");
                    }
                }
                Value::string(self.visit(operand).type_of())
            }
            UnaryOperator::Not => Value::Bool(!self.visit(operand).is_truthy()),
            UnaryOperator::Minus => Value::Number(-self.visit(operand).to_number()),
            UnaryOperator::Plus => Value::Number(self.visit(operand).to_number()),
        }
    }

    fn visit_binary(&self, operator: BinaryOperator, left: &Expr, right: &Expr) -> Value {
        match operator {
            BinaryOperator::And => {
                let left = self.visit(left);
                return if left.is_truthy() { self.visit(right) } else { left };
            }
            BinaryOperator::Or => {
                let left = self.visit(left);
                return if left.is_truthy() { left } else { self.visit(right) };
            }
            BinaryOperator::NullishCoalesce => {
                let left = self.visit(left);
                return if left.is_nullish() { self.visit(right) } else { left };
            }
            _ => {}
        }

        let left = self.visit(left);
        let right = self.visit(right);
        let number = |f: fn(f64, f64) -> f64| Value::Number(f(left.to_number(), right.to_number()));
        match operator {
            BinaryOperator::Add => add(&left, &right),
            BinaryOperator::Subtract => number(|a, b| a - b),
            BinaryOperator::Multiply => number(|a, b| a * b),
            BinaryOperator::Divide => number(|a, b| a / b),
            BinaryOperator::Modulo => number(|a, b| a % b),
            BinaryOperator::Power => number(f64::powf),
            BinaryOperator::Lower => Value::Bool(compare(&left, &right) == Some(Ordering::Less)),
            BinaryOperator::LowerEquals => Value::Bool(matches!(
                compare(&left, &right),
                Some(Ordering::Less | Ordering::Equal)
            )),
            BinaryOperator::Bigger => Value::Bool(compare(&left, &right) == Some(Ordering::Greater)),
            BinaryOperator::BiggerEquals => Value::Bool(matches!(
                compare(&left, &right),
                Some(Ordering::Greater | Ordering::Equal)
            )),
            BinaryOperator::Equals => Value::Bool(loose_equals(&left, &right)),
            BinaryOperator::NotEquals => Value::Bool(!loose_equals(&left, &right)),
            BinaryOperator::Identical => Value::Bool(strict_equals(&left, &right)),
            BinaryOperator::NotIdentical => Value::Bool(!strict_equals(&left, &right)),
            BinaryOperator::And | BinaryOperator::Or | BinaryOperator::NullishCoalesce => unreachable!(),
        }
    }

    /// Arrow functions close over the current scope, `this` included.
    fn visit_arrow(&self, params: &[String], body: &Expr) -> Value {
        let scope = self.scope.clone();
        let params: Rc<[String]> = params.into();
        let body = Rc::new(body.clone());
        Value::function(move |args| {
            let bindings = params
                .iter()
                .enumerate()
                .map(|(index, name)| (name.clone(), args.get(index).cloned().unwrap_or_default()));
            evaluate(&body, &scope.with_vars(bindings))
        })
    }
}
