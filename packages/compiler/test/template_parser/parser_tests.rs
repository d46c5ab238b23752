/**
 * Template Parser Tests
 *
 * Elements, attributes, text, interpolations and control-flow blocks,
 * plus the errors reported for malformed templates.
 */

#[cfg(test)]
mod tests {
    use htmly_compiler::expression_parser::{serialize, Expr, Parser};
    use htmly_compiler::template_parser::{
        parse_template, Attribute, AttributeKind, Element, TemplateNode, TemplateParser,
    };

    fn parse(text: &str) -> Vec<TemplateNode> {
        parse_template(text).unwrap_or_else(|e| panic!("{}", e))
    }

    fn expr(text: &str) -> Expr {
        Parser::new(text, "test").parse().unwrap()
    }

    fn element(node: &TemplateNode) -> &Element {
        node.as_element().expect("Expected an element")
    }

    fn expect_error(text: &str, message: &str) {
        match parse_template(text) {
            Ok(nodes) => panic!("Expected an error for '{}', got {:?}", text, nodes),
            Err(error) => assert!(
                error.msg.contains(message),
                "Expected '{}' in '{}'",
                message,
                error.msg
            ),
        }
    }

    mod elements {
        use super::*;

        #[test]
        fn should_parse_literal_attributes() {
            let nodes = parse("<div foo=\"bar\"></div>");
            let mut expected = Element::new("div");
            expected.attributes.push(Attribute::literal("foo", "bar"));
            assert_eq!(nodes, vec![TemplateNode::Element(expected)]);
        }

        #[test]
        fn should_parse_self_closing_elements() {
            let nodes = parse("<br/><input type=\"text\" />");
            assert_eq!(nodes.len(), 2);
            assert_eq!(element(&nodes[0]).name, "br");
            assert!(element(&nodes[1]).children.is_empty());
            assert_eq!(element(&nodes[1]).attribute("type").and_then(|a| a.text()), Some("text"));
        }

        #[test]
        fn should_parse_nested_children() {
            let nodes = parse("<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>");
            let list = element(&nodes[0]);
            assert_eq!(list.children.len(), 2);
            assert_eq!(element(&list.children[1]).children, vec![TemplateNode::text("two")]);
        }

        #[test]
        fn should_parse_custom_element_names() {
            let nodes = parse("<user-card></user-card>");
            assert_eq!(element(&nodes[0]).name, "user-card");
        }

        #[test]
        fn should_allow_empty_literal_values() {
            let nodes = parse("<a href=\"\"></a>");
            assert_eq!(element(&nodes[0]).attribute("href").and_then(|a| a.text()), Some(""));
        }
    }

    mod attributes {
        use super::*;

        #[test]
        fn should_parse_flags() {
            let nodes = parse("<input disabled/>");
            let input = &element(&nodes[0]).attributes[0];
            assert_eq!(input, &Attribute::flag("disabled"));
        }

        #[test]
        fn should_parse_property_bindings() {
            let nodes = parse("<p [title]=\"user.name\"></p>");
            assert_eq!(
                element(&nodes[0]).attributes,
                vec![Attribute::property("title", expr("user.name"))]
            );
        }

        #[test]
        fn should_parse_event_bindings() {
            let nodes = parse("<button (click)=\"this.inc()\">+</button>");
            let attribute = &element(&nodes[0]).attributes[0];
            assert_eq!(attribute.kind, AttributeKind::Event);
            assert_eq!(attribute.name, "click");
            assert_eq!(attribute.expression().map(serialize).as_deref(), Some("this.inc()"));
        }

        #[test]
        fn should_keep_attribute_order() {
            let nodes = parse("<a b=\"1\" [c]=\"2\" d (e)=\"f\"></a>");
            let names: Vec<&str> = element(&nodes[0]).attributes.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(names, vec!["b", "c", "d", "e"]);
        }

        #[test]
        fn should_allow_arrow_handlers() {
            let nodes = parse("<input (input)=\"e => this.set(e)\"/>");
            let attribute = &element(&nodes[0]).attributes[0];
            assert!(matches!(attribute.expression(), Some(Expr::Arrow { .. })));
        }
    }

    mod text {
        use super::*;

        #[test]
        fn should_parse_interpolations() {
            let nodes = parse("Hello {{ name }}!");
            assert_eq!(
                nodes,
                vec![
                    TemplateNode::text("Hello "),
                    TemplateNode::expression(expr("name")),
                    TemplateNode::text("!"),
                ]
            );
        }

        #[test]
        fn should_skip_whitespace_only_text() {
            let nodes = parse("  \n <b></b>\n  ");
            assert_eq!(nodes.len(), 1);
        }

        #[test]
        fn should_parse_interpolations_without_spaces() {
            let nodes = parse("{{a+b}}");
            assert_eq!(nodes, vec![TemplateNode::expression(expr("a + b"))]);
        }
    }

    mod blocks {
        use super::*;

        #[test]
        fn should_parse_if_else_chains() {
            let nodes = parse("@if (a) { A } @else if (b) { B } @else { C }");
            match &nodes[0] {
                TemplateNode::If(block) => {
                    assert_eq!(block.test, expr("a"));
                    assert_eq!(block.then, vec![TemplateNode::text("A ")]);
                    assert_eq!(block.elifs.len(), 1);
                    assert_eq!(block.elifs[0].test, expr("b"));
                    assert_eq!(block.otherwise, vec![TemplateNode::text("C ")]);
                }
                other => panic!("Expected @if, got {:?}", other),
            }
        }

        #[test]
        fn should_parse_if_without_else() {
            let nodes = parse("@if (ok) {<p>yes</p>}<p>after</p>");
            assert_eq!(nodes.len(), 2);
            match &nodes[0] {
                TemplateNode::If(block) => {
                    assert!(block.elifs.is_empty());
                    assert!(block.otherwise.is_empty());
                }
                other => panic!("Expected @if, got {:?}", other),
            }
        }

        #[test]
        fn should_parse_for_with_empty_block() {
            let nodes = parse(
                "@for (item of this.items(); track item().id) { <div>{{ item().name }}</div> } @empty { <p>none</p> }",
            );
            match &nodes[0] {
                TemplateNode::For(block) => {
                    assert_eq!(block.item, expr("item"));
                    assert_eq!(block.items, expr("this.items()"));
                    assert_eq!(block.track, expr("item().id"));
                    assert_eq!(element(&block.children[0]).name, "div");
                    assert_eq!(
                        element(&block.children[0]).children,
                        vec![TemplateNode::expression(expr("item().name"))]
                    );
                    assert_eq!(element(&block.empty[0]).name, "p");
                }
                other => panic!("Expected @for, got {:?}", other),
            }
        }

        #[test]
        fn should_parse_for_without_empty_block() {
            let nodes = parse("@for (x of xs; track x) { {{ x }} }");
            match &nodes[0] {
                TemplateNode::For(block) => {
                    assert_eq!(block.children, vec![TemplateNode::expression(expr("x"))]);
                    assert!(block.empty.is_empty());
                }
                other => panic!("Expected @for, got {:?}", other),
            }
        }

        #[test]
        fn should_nest_blocks_in_elements() {
            let nodes = parse("<ul>@for (x of xs; track x) {<li>{{ x }}</li>}</ul>");
            assert!(matches!(element(&nodes[0]).children[0], TemplateNode::For(_)));
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_report_missing_closing_tags() {
            expect_error("<div><p></p>", "Missing closing tag </div>");
        }

        #[test]
        fn should_report_stray_closing_tags() {
            expect_error("</div>", "Unexpected closing tag </div>");
        }

        #[test]
        fn should_report_unterminated_start_tags() {
            expect_error("<div class=\"a\"", "Unterminated start tag");
        }

        #[test]
        fn should_report_unquoted_values() {
            expect_error("<div a=b></div>", "Expected '\"' after '='");
        }

        #[test]
        fn should_report_unclosed_blocks() {
            expect_error("@if (a) { <p></p>", "Missing '}' closing @if block");
        }

        #[test]
        fn should_report_a_stray_brace() {
            expect_error("a } b", "Unexpected '}'");
        }

        #[test]
        fn should_report_a_missing_track() {
            expect_error("@for (x of xs;) { }", "Expected \"track\"");
        }

        #[test]
        fn should_report_else_after_else() {
            expect_error("@if (a) {} @else {} @else {}", "@else after the final @else branch");
        }

        #[test]
        fn should_report_expression_errors() {
            expect_error("{{ a + }}", "Unexpected token '}'");
        }

        #[test]
        fn should_locate_errors_in_the_template_url() {
            let error = TemplateParser::new("<p>\n</b>", "app/card.html").parse().unwrap_err();
            assert_eq!(error.span.start.file.url, "app/card.html");
            assert_eq!(error.span.start.line, 1);
        }
    }
}
