/**
 * Template Printer Tests
 *
 * The canonical printer writes templates that parse back to an equal AST.
 */

#[cfg(test)]
mod tests {
    use htmly_compiler::template_parser::{parse_template, print_template, TemplateNode};

    fn parse(text: &str) -> Vec<TemplateNode> {
        parse_template(text).unwrap_or_else(|e| panic!("{}", e))
    }

    fn check_round_trip(text: &str) {
        let ast = parse(text);
        let printed = print_template(&ast);
        assert_eq!(parse(&printed), ast, "'{}' printed as '{}'", text, printed);
    }

    mod canonical_form {
        use super::*;

        #[test]
        fn should_print_literal_attributes() {
            assert_eq!(print_template(&parse("<div foo=\"bar\"></div>")), "<div foo=\"bar\"></div>");
        }

        #[test]
        fn should_never_self_close() {
            assert_eq!(print_template(&parse("<br/>")), "<br></br>");
        }

        #[test]
        fn should_print_bindings() {
            let printed = print_template(&parse("<input disabled [value]=\"name\" (input)=\"e => set(e)\"/>"));
            assert_eq!(printed, "<input disabled [value]=\"name\" (input)=\"(e) => set(e)\"></input>");
        }

        #[test]
        fn should_drop_layout_whitespace() {
            let printed = print_template(&parse("<ul>\n  <li>{{ a }}</li>\n</ul>"));
            assert_eq!(printed, "<ul><li>{{ a }}</li></ul>");
        }

        #[test]
        fn should_print_blocks() {
            let printed = print_template(&parse(
                "@for (item of this.items(); track item().id) { <div>{{ item().name }}</div> } @empty { <p>none</p> }",
            ));
            assert_eq!(
                printed,
                "@for (item of this.items(); track item().id) {<div>{{ item().name }}</div>} @empty {<p>none</p>}"
            );
        }

        #[test]
        fn should_omit_an_empty_else() {
            assert_eq!(print_template(&parse("@if (a) {x}")), "@if (a) {x}");
        }
    }

    mod round_trip {
        use super::*;

        #[test]
        fn should_round_trip_elements_and_text() {
            check_round_trip("<div foo=\"bar\"></div>");
            check_round_trip("Hello {{ name }}!");
            check_round_trip("<p>a <b>b</b> c</p>");
        }

        #[test]
        fn should_round_trip_control_flow() {
            check_round_trip("@if (a) { A } @else if (b) { B } @else { C }");
            check_round_trip("@if (!user) { <p>none</p> } <p>after</p>");
            check_round_trip(
                "@for (item of this.items(); track item().id) { <div>{{ item().name }}</div> } @empty { <p>none</p> }",
            );
        }

        #[test]
        fn should_round_trip_components_and_slots() {
            check_round_trip(
                "<user-card [user]=\"this.user()\" (select)=\"this.pick\"><template slot=\"header\" let-u=\"user\">{{ u.name }}</template></user-card>",
            );
            check_round_trip("<slot name=\"footer\" [count]=\"n + 1\"></slot>");
        }
    }
}
