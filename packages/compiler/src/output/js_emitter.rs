//! JavaScript Emitter
//!
//! Prints a generated [`Program`] as an ES module. Host expressions are
//! printed by the expression serializer; everything else is laid out here.

use super::output_ast::{Expression, ImportSpecifier, ObjectProperty, Param, Program, Statement};
use crate::expression_parser::serializer::{format_number, is_identifier_name};
use crate::expression_parser::{serialize, Expr, LiteralValue};

/// Prints `program`, indenting nested blocks by `indent` spaces.
pub fn emit_program(program: &Program, indent: usize) -> String {
    let mut ctx = EmitterVisitorContext::new(indent);
    JsEmitterVisitor.visit_program(program, &mut ctx);
    ctx.to_source()
}

#[derive(Debug, Clone, Default)]
struct EmittedLine {
    parts: Vec<String>,
    indent: usize,
}

/// Line buffer the emitter prints into.
pub struct EmitterVisitorContext {
    lines: Vec<EmittedLine>,
    indent: usize,
    indent_width: usize,
}

impl EmitterVisitorContext {
    pub fn new(indent_width: usize) -> Self {
        EmitterVisitorContext {
            lines: vec![EmittedLine::default()],
            indent: 0,
            indent_width,
        }
    }

    fn current_line_mut(&mut self) -> &mut EmittedLine {
        if self.lines.is_empty() {
            self.lines.push(EmittedLine::default());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    pub fn line_is_empty(&self) -> bool {
        self.lines.last().map_or(true, |line| line.parts.is_empty())
    }

    pub fn print(&mut self, part: &str) {
        if !part.is_empty() {
            self.current_line_mut().parts.push(part.to_string());
        }
    }

    pub fn println(&mut self, last_part: &str) {
        self.print(last_part);
        let indent = self.indent;
        self.lines.push(EmittedLine {
            parts: Vec::new(),
            indent,
        });
    }

    pub fn inc_indent(&mut self) {
        self.indent += 1;
        if self.line_is_empty() {
            self.current_line_mut().indent = self.indent;
        }
    }

    pub fn dec_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        if self.line_is_empty() {
            self.current_line_mut().indent = self.indent;
        }
    }

    pub fn to_source(&self) -> String {
        let mut lines: Vec<&EmittedLine> = self.lines.iter().collect();
        if lines.last().map_or(false, |line| line.parts.is_empty()) {
            lines.pop();
        }
        let mut source = lines
            .iter()
            .map(|line| {
                if line.parts.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", " ".repeat(line.indent * self.indent_width), line.parts.concat())
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        source.push('\n');
        source
    }
}

/// Double-quoted string literal.
fn escape_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

fn print_key(key: &str) -> String {
    if is_identifier_name(key) {
        key.to_string()
    } else {
        escape_string(key)
    }
}

struct JsEmitterVisitor;

impl JsEmitterVisitor {
    fn visit_program(&self, program: &Program, ctx: &mut EmitterVisitorContext) {
        let mut previous: Option<&Statement> = None;
        for statement in &program.body {
            // Blank line between the import block and the rest
            if let Some(prev) = previous {
                let prev_import = matches!(prev, Statement::Import { .. });
                let this_import = matches!(statement, Statement::Import { .. });
                if prev_import != this_import || !this_import {
                    ctx.println("");
                }
            }
            self.visit_statement(statement, ctx);
            previous = Some(statement);
        }
    }

    fn visit_statement(&self, statement: &Statement, ctx: &mut EmitterVisitorContext) {
        match statement {
            Statement::Import { specifiers, source } => {
                ctx.print("import ");
                let defaults: Vec<&str> = specifiers
                    .iter()
                    .filter_map(|s| match s {
                        ImportSpecifier::Default(name) => Some(name.as_str()),
                        ImportSpecifier::Named(_) => None,
                    })
                    .collect();
                let named: Vec<&str> = specifiers
                    .iter()
                    .filter_map(|s| match s {
                        ImportSpecifier::Named(name) => Some(name.as_str()),
                        ImportSpecifier::Default(_) => None,
                    })
                    .collect();
                let mut clauses = defaults.iter().map(|name| name.to_string()).collect::<Vec<_>>();
                if !named.is_empty() {
                    clauses.push(format!("{{ {} }}", named.join(", ")));
                }
                if !clauses.is_empty() {
                    ctx.print(&clauses.join(", "));
                    ctx.print(" from ");
                }
                ctx.print(&escape_string(source));
                ctx.println(";");
            }
            Statement::Const { declarations } => {
                ctx.print("const ");
                for (index, declarator) in declarations.iter().enumerate() {
                    if index > 0 {
                        ctx.print(", ");
                    }
                    ctx.print(&declarator.name);
                    ctx.print(" = ");
                    self.visit_expression(&declarator.init, ctx);
                }
                ctx.println(";");
            }
            Statement::ExportDefault(expr) => {
                ctx.print("export default ");
                self.visit_expression(expr, ctx);
                ctx.println(";");
            }
            Statement::Return(expr) => {
                ctx.print("return ");
                self.visit_expression(expr, ctx);
                ctx.println(";");
            }
        }
    }

    fn visit_expression(&self, expr: &Expression, ctx: &mut EmitterVisitorContext) {
        match expr {
            Expression::Identifier { name } => ctx.print(name),
            Expression::Literal { value } => ctx.print(&self.literal(value)),
            Expression::Call { callee, arguments } => {
                self.visit_expression(callee, ctx);
                ctx.print("(");
                self.visit_all(arguments, ctx);
                ctx.print(")");
            }
            Expression::Member { object, property } => {
                self.visit_expression(object, ctx);
                ctx.print(".");
                ctx.print(property);
            }
            Expression::Index { object, index } => {
                self.visit_expression(object, ctx);
                ctx.print("[");
                self.visit_expression(index, ctx);
                ctx.print("]");
            }
            Expression::Object { properties } => self.visit_object(properties, ctx),
            Expression::Array { elements } => {
                ctx.print("[");
                self.visit_all(elements, ctx);
                ctx.print("]");
            }
            Expression::Arrow { params, body } => {
                ctx.print("(");
                let params: Vec<String> = params.iter().map(print_param).collect();
                ctx.print(&params.join(", "));
                ctx.print(") => ");
                let wraps = match body.as_ref() {
                    Expression::Object { .. } => true,
                    Expression::Host { expr } => matches!(expr, Expr::Object { .. }),
                    _ => false,
                };
                if wraps {
                    ctx.print("(");
                }
                self.visit_expression(body, ctx);
                if wraps {
                    ctx.print(")");
                }
            }
            Expression::Function { params, body } => {
                ctx.print("function (");
                ctx.print(&params.join(", "));
                ctx.println(") {");
                ctx.inc_indent();
                for statement in body {
                    self.visit_statement(statement, ctx);
                }
                ctx.dec_indent();
                ctx.print("}");
            }
            Expression::Host { expr } => ctx.print(&serialize(expr)),
        }
    }

    fn visit_all(&self, exprs: &[Expression], ctx: &mut EmitterVisitorContext) {
        for (index, expr) in exprs.iter().enumerate() {
            if index > 0 {
                ctx.print(", ");
            }
            self.visit_expression(expr, ctx);
        }
    }

    fn visit_object(&self, properties: &[ObjectProperty], ctx: &mut EmitterVisitorContext) {
        if properties.is_empty() {
            ctx.print("{}");
            return;
        }
        ctx.print("{ ");
        for (index, property) in properties.iter().enumerate() {
            if index > 0 {
                ctx.print(", ");
            }
            ctx.print(&print_key(&property.key));
            ctx.print(": ");
            self.visit_expression(&property.value, ctx);
        }
        ctx.print(" }");
    }

    fn literal(&self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::Number(n) => format_number(*n),
            LiteralValue::String(s) => escape_string(s),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Undefined => "undefined".to_string(),
        }
    }
}

fn print_param(param: &Param) -> String {
    match param {
        Param::Identifier { name } => name.clone(),
        Param::Pattern { bindings } => {
            let entries: Vec<String> = bindings
                .iter()
                .map(|(key, local)| {
                    if key == local {
                        key.clone()
                    } else {
                        format!("{}: {}", print_key(key), local)
                    }
                })
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
    }
}
