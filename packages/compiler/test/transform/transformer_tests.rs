/**
 * Transformer Tests
 *
 * Lowering of templates into programs over the runtime constructors,
 * checked through the printed module.
 */

#[cfg(test)]
mod tests {
    use htmly_compiler::error::CompilerError;
    use htmly_compiler::output::emit_program;
    use htmly_compiler::template_parser::parse_template;
    use htmly_compiler::transform::{default_resolver, lower, ComponentInfo};
    use htmly_compiler::{CompilerConfig, Program, Result};
    use indexmap::IndexMap;

    const RUNTIME: &str = "@htmly/core/renderer";

    fn siblings(names: &[&str]) -> IndexMap<String, ComponentInfo> {
        names
            .iter()
            .map(|name| (name.to_string(), ComponentInfo::new(*name, "/src")))
            .collect()
    }

    fn lower_with(template: &str, components: &[&str], config: &CompilerConfig) -> Result<Program> {
        let ast = parse_template(template).unwrap_or_else(|e| panic!("{}", e));
        let info = ComponentInfo::new("app", "/src");
        lower(&ast, &info, &siblings(components), &default_resolver, config)
    }

    fn program(template: &str, components: &[&str]) -> Program {
        lower_with(template, components, &CompilerConfig::default()).unwrap_or_else(|e| panic!("{}", e))
    }

    fn code(template: &str, components: &[&str]) -> String {
        emit_program(&program(template, components), 2)
    }

    /// The line returning the root node
    fn root(template: &str, components: &[&str]) -> String {
        let code = code(template, components);
        code.lines()
            .find(|line| line.trim_start().starts_with("return "))
            .map(|line| line.trim().to_string())
            .unwrap_or_else(|| panic!("No return in:\n{}", code))
    }

    fn expect_transform_error(template: &str, components: &[&str], message: &str) {
        match lower_with(template, components, &CompilerConfig::default()) {
            Ok(program) => panic!("Expected an error, got:\n{}", emit_program(&program, 2)),
            Err(CompilerError::Transform { message: actual }) => {
                assert!(actual.contains(message), "Expected '{}' in '{}'", message, actual)
            }
            Err(other) => panic!("Expected a transform error, got {}", other),
        }
    }

    mod elements {
        use super::*;

        #[test]
        fn should_print_a_complete_module() {
            assert_eq!(
                code("<div foo=\"bar\"></div>", &[]),
                [
                    "import { $c, $e } from \"@htmly/core/renderer\";",
                    "import controller from \"./app.js\";",
                    "",
                    "const $e_div = $e(\"div\");",
                    "",
                    "export default $c(\"app\", controller, function () {",
                    "  return $e_div({ attrs: { foo: \"bar\" } });",
                    "});",
                    "",
                ]
                .join("\n")
            );
        }

        #[test]
        fn should_call_bare_elements_without_arguments() {
            assert_eq!(root("<br/>", &[]), "return $e_br();");
        }

        #[test]
        fn should_split_attributes_by_kind() {
            assert_eq!(
                root("<input disabled [value]=\"this.name()\" (input)=\"e => this.set(e)\"/>", &[]),
                "return $e_input({ attrs: { disabled: true }, props: { value: () => this.name() }, events: { input: (e) => this.set(e) } });"
            );
        }

        #[test]
        fn should_quote_attribute_names_that_are_not_identifiers() {
            assert_eq!(
                root("<p aria-label=\"x\" [class.done]=\"ok\"></p>", &[]),
                "return $e_p({ attrs: { \"aria-label\": \"x\" }, props: { \"class.done\": () => ok } });"
            );
        }

        #[test]
        fn should_declare_each_tag_once() {
            let code = code("<p><b></b></p><p></p>", &[]);
            assert!(code.contains("const $e_p = $e(\"p\"), $e_b = $e(\"b\");"), "{}", code);
            assert!(code.contains("return $f($e_p({ child: $e_b() }), $e_p());"), "{}", code);
        }

        #[test]
        fn should_inline_element_constructors_without_hoisting() {
            let config = CompilerConfig {
                hoist_elements: false,
                ..CompilerConfig::default()
            };
            let code = emit_program(&lower_with("<div></div>", &[], &config).unwrap(), 2);
            assert!(!code.contains("const "));
            assert!(code.contains("return $e(\"div\")();"), "{}", code);
        }

        #[test]
        fn should_treat_unknown_custom_tags_as_elements() {
            let code = code("<x-widget></x-widget>", &[]);
            assert!(code.contains("const $e_x_widget = $e(\"x-widget\");"), "{}", code);
        }

        #[test]
        fn should_keep_loop_items_apart_from_element_constructors() {
            let code = code(
                "<select>@for (option of this.options(); track option().id) { <option [value]=\"option().id\">{{ option().name }}</option> }</select>",
                &[],
            );
            assert!(code.contains("const $e_select = $e(\"select\"), $e_option = $e(\"option\");"), "{}", code);
            assert!(
                code.contains("(option) => $e_option({ props: { value: () => option().id }, child: $t(() => option().name) })"),
                "{}",
                code
            );
        }

        #[test]
        fn should_number_tags_that_sanitize_to_the_same_name() {
            let code = code("<my-el></my-el><my_el></my_el><my-el></my-el>", &[]);
            assert!(
                code.contains("const $e_my_el = $e(\"my-el\"), $e_my_el_2 = $e(\"my_el\");"),
                "{}",
                code
            );
            assert!(code.contains("return $f($e_my_el(), $e_my_el_2(), $e_my_el());"), "{}", code);
        }
    }

    mod text {
        use super::*;

        #[test]
        fn should_lower_static_text() {
            assert_eq!(root("Hello", &[]), "return $t(\"Hello\");");
            assert_eq!(program("Hello", &[]).imported_names(RUNTIME), vec!["$c", "$t"]);
        }

        #[test]
        fn should_lower_interpolations_to_thunks() {
            assert_eq!(root("{{ this.name }}", &[]), "return $t(() => this.name);");
        }

        #[test]
        fn should_return_null_for_an_empty_template() {
            assert_eq!(root("  \n ", &[]), "return null;");
            assert_eq!(program("", &[]).imported_names(RUNTIME), vec!["$c"]);
        }
    }

    mod conditionals {
        use super::*;

        #[test]
        fn should_lower_else_if_chains() {
            assert_eq!(
                root("@if (a) {x} @else if (b) {y} @else {z}", &[]),
                "return $if({ ifs: [[() => a, $t(\"x\")], [() => b, $t(\"y\")]], otherwise: $t(\"z\") });"
            );
        }

        #[test]
        fn should_drop_trailing_empty_branches() {
            assert_eq!(
                root("@if (a) {x} @else if (b) {}", &[]),
                "return $if({ ifs: [[() => a, $t(\"x\")]] });"
            );
        }

        #[test]
        fn should_keep_leading_empty_branches() {
            assert_eq!(
                root("@if (a) {} @else if (b) {y}", &[]),
                "return $if({ ifs: [[() => a, null], [() => b, $t(\"y\")]] });"
            );
            assert_eq!(
                root("@if (a) {} @else {z}", &[]),
                "return $if({ ifs: [[() => a, null]], otherwise: $t(\"z\") });"
            );
        }

        #[test]
        fn should_drop_a_block_without_content() {
            assert_eq!(root("@if (a) {}", &[]), "return null;");
            assert_eq!(program("@if (a) {}", &[]).imported_names(RUNTIME), vec!["$c"]);
        }
    }

    mod loops {
        use super::*;

        #[test]
        fn should_lower_for_blocks() {
            assert_eq!(
                root(
                    "@for (item of this.items(); track item().id) { <div>{{ item().name }}</div> } @empty { <p>none</p> }",
                    &[]
                ),
                "return $for({ items: () => this.items(), trackBy: (item) => item().id, empty: $e_p({ child: $t(\"none\") }) }, (item) => $e_div({ child: $t(() => item().name) }));"
            );
        }

        #[test]
        fn should_render_an_empty_fragment_for_empty_bodies() {
            assert_eq!(
                root("@for (x of xs; track x) {} @empty {none}", &[]),
                "return $for({ items: () => xs, trackBy: (x) => x, empty: $t(\"none\") }, (x) => $f());"
            );
        }

        #[test]
        fn should_drop_a_loop_without_content() {
            assert_eq!(root("@for (x of xs; track x) {}", &[]), "return null;");
        }

        #[test]
        fn should_reject_non_identifier_items() {
            expect_transform_error("@for (item.x of xs; track item) {a}", &[], "must be a plain identifier");
        }
    }

    mod components {
        use super::*;

        #[test]
        fn should_import_child_components() {
            let code = code("<user-card></user-card>", &["user-card"]);
            assert!(code.contains("import UserCard from \"./user-card.component.js\";"), "{}", code);
            assert!(code.contains("return UserCard({});"), "{}", code);
            assert!(!code.contains("$e"), "{}", code);
        }

        #[test]
        fn should_pass_props_events_and_slots() {
            assert_eq!(
                root(
                    "<user-card name=\"Ann\" [user]=\"this.user()\" (select)=\"this.pick\"><template slot=\"header\" let-u=\"user\">{{ u.name }}</template><p>body</p></user-card>",
                    &["user-card"]
                ),
                "return UserCard({ props: { name: \"Ann\", user: () => this.user() }, events: { select: this.pick }, slots: { header: ({ user: u }) => $t(() => u.name), default: () => $e_p({ child: $t(\"body\") }) } });"
            );
        }

        #[test]
        fn should_bind_flag_lets_under_their_own_name() {
            assert_eq!(
                root("<list><template let-item>{{ item }}</template></list>", &["list"]),
                "return List({ slots: { default: ({ item }) => $t(() => item) } });"
            );
        }

        #[test]
        fn should_merge_children_routed_to_the_same_slot() {
            assert_eq!(
                root("<card><b></b><template><i></i></template></card>", &["card"]),
                "return Card({ slots: { default: () => $f($e_b(), $e_i()) } });"
            );
        }

        #[test]
        fn should_use_the_module_resolver() {
            let ast = parse_template("<user-card></user-card>").unwrap();
            let info = ComponentInfo::new("app", "/src");
            let resolver = |child: &ComponentInfo| format!("/build/{}.mjs", child.name);
            let program = lower(&ast, &info, &siblings(&["user-card"]), &resolver, &CompilerConfig::default()).unwrap();
            assert_eq!(
                program.import_sources(),
                vec![RUNTIME, "./app.js", "../build/user-card.mjs"]
            );
        }

        #[test]
        fn should_import_styles_for_side_effects() {
            let ast = parse_template("").unwrap();
            let mut info = ComponentInfo::new("app", "/src");
            info.styles = Some("/src/app.css".to_string());
            let program = lower(&ast, &info, &IndexMap::new(), &default_resolver, &CompilerConfig::default()).unwrap();
            let code = emit_program(&program, 2);
            assert!(code.contains("import \"./app.css\";\nimport controller from \"./app.js\";"), "{}", code);
        }

        #[test]
        fn should_reject_templates_outside_components() {
            expect_transform_error("<div><template></template></div>", &[], "only allowed as a direct child");
        }

        #[test]
        fn should_reject_bound_slot_names() {
            expect_transform_error(
                "<card><template [slot]=\"name\"></template></card>",
                &["card"],
                "must be a literal name",
            );
        }

        #[test]
        fn should_reject_invalid_let_context_keys() {
            expect_transform_error(
                "<card><template let-u=\"a-b\"></template></card>",
                &["card"],
                "must name a context property",
            );
        }

        #[test]
        fn should_reject_let_locals_that_are_not_identifiers() {
            expect_transform_error(
                "<card><template let-1u=\"user\"></template></card>",
                &["card"],
                "must introduce a valid identifier",
            );
        }
    }

    mod slots {
        use super::*;

        #[test]
        fn should_lower_slot_outlets() {
            let code = code("<slot name=\"footer\" count=\"3\" [n]=\"this.n()\"></slot>", &[]);
            assert!(code.contains("function ($$slots) {"), "{}", code);
            assert!(
                code.contains("return $$slots[\"footer\"]({ count: \"3\", n: () => this.n() });"),
                "{}",
                code
            );
        }

        #[test]
        fn should_default_the_slot_name() {
            assert_eq!(root("<slot></slot>", &[]), "return $$slots[\"default\"]({});");
        }

        #[test]
        fn should_not_declare_slots_when_unused() {
            assert!(code("<p></p>", &[]).contains("function () {"));
        }
    }
}
