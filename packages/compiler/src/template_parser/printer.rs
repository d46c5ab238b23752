//! Canonical Template Printer
//!
//! Renders a template AST back to source text that parses to an equal AST.
//! Siblings are written back to back and elements are never self-closed.

use super::ast::*;
use crate::expression_parser::serialize;

pub fn print_template(nodes: &[TemplateNode]) -> String {
    let mut printer = TemplatePrinter::default();
    printer.print_nodes(nodes);
    printer.output
}

#[derive(Default)]
struct TemplatePrinter {
    output: String,
}

impl TemplatePrinter {
    fn print_nodes(&mut self, nodes: &[TemplateNode]) {
        for node in nodes {
            self.print_node(node);
        }
    }

    fn print_node(&mut self, node: &TemplateNode) {
        match node {
            TemplateNode::Element(element) => self.print_element(element),
            TemplateNode::Text { value } => self.output.push_str(value),
            TemplateNode::Expression { value } => {
                self.output.push_str("{{ ");
                self.output.push_str(&serialize(value));
                self.output.push_str(" }}");
            }
            TemplateNode::If(block) => self.print_if(block),
            TemplateNode::For(block) => self.print_for(block),
        }
    }

    fn print_element(&mut self, element: &Element) {
        self.output.push('<');
        self.output.push_str(&element.name);
        for attribute in &element.attributes {
            self.output.push(' ');
            self.print_attribute(attribute);
        }
        self.output.push('>');
        self.print_nodes(&element.children);
        self.output.push_str("</");
        self.output.push_str(&element.name);
        self.output.push('>');
    }

    fn print_attribute(&mut self, attribute: &Attribute) {
        let value = match &attribute.value {
            AttributeValue::Text(text) => text.clone(),
            AttributeValue::Expression(expr) => serialize(expr),
            AttributeValue::Bool(_) => String::new(),
        };
        let printed = match attribute.kind {
            AttributeKind::Flag => attribute.name.clone(),
            AttributeKind::Literal => format!("{}=\"{}\"", attribute.name, value),
            AttributeKind::Property => format!("[{}]=\"{}\"", attribute.name, value),
            AttributeKind::Event => format!("({})=\"{}\"", attribute.name, value),
        };
        self.output.push_str(&printed);
    }

    fn print_block(&mut self, head: &str, children: &[TemplateNode]) {
        self.output.push_str(head);
        self.output.push_str(" {");
        self.print_nodes(children);
        self.output.push('}');
    }

    fn print_if(&mut self, block: &IfBlock) {
        self.print_block(&format!("@if ({})", serialize(&block.test)), &block.then);
        for elif in &block.elifs {
            self.print_block(&format!(" @else if ({})", serialize(&elif.test)), &elif.then);
        }
        if !block.otherwise.is_empty() {
            self.print_block(" @else", &block.otherwise);
        }
    }

    fn print_for(&mut self, block: &ForBlock) {
        let head = format!(
            "@for ({} of {}; track {})",
            serialize(&block.item),
            serialize(&block.items),
            serialize(&block.track)
        );
        self.print_block(&head, &block.children);
        if !block.empty.is_empty() {
            self.print_block(" @empty", &block.empty);
        }
    }
}
