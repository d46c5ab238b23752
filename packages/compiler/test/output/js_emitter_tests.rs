/**
 * JavaScript Emitter Tests
 *
 * Layout of hand-built programs: import clauses, statement spacing,
 * indentation and literal quoting.
 */

#[cfg(test)]
mod tests {
    use htmly_compiler::expression_parser::Parser;
    use htmly_compiler::output::emit_program;
    use htmly_compiler::output::output_ast::{
        Declarator, Expression, ImportSpecifier, ObjectProperty, Param, Program, Statement,
    };

    fn host(text: &str) -> Expression {
        Expression::host(Parser::new(text, "test").parse().unwrap())
    }

    fn returning(expr: Expression) -> Program {
        Program {
            body: vec![Statement::ExportDefault(Expression::Function {
                params: Vec::new(),
                body: vec![Statement::Return(expr)],
            })],
        }
    }

    /// The emitted return expression
    fn emit_expr(expr: Expression) -> String {
        let code = emit_program(&returning(expr), 2);
        let line = code.lines().nth(1).unwrap().trim().to_string();
        line.trim_start_matches("return ").trim_end_matches(';').to_string()
    }

    mod statements {
        use super::*;

        #[test]
        fn should_combine_default_and_named_imports() {
            let program = Program {
                body: vec![Statement::Import {
                    specifiers: vec![
                        ImportSpecifier::Default("lib".into()),
                        ImportSpecifier::Named("a".into()),
                        ImportSpecifier::Named("b".into()),
                    ],
                    source: "lib".into(),
                }],
            };
            assert_eq!(emit_program(&program, 2), "import lib, { a, b } from \"lib\";\n");
        }

        #[test]
        fn should_print_side_effect_imports() {
            let program = Program {
                body: vec![Statement::Import {
                    specifiers: Vec::new(),
                    source: "./app.css".into(),
                }],
            };
            assert_eq!(emit_program(&program, 2), "import \"./app.css\";\n");
        }

        #[test]
        fn should_separate_statement_groups_with_blank_lines() {
            let program = Program {
                body: vec![
                    Statement::Import {
                        specifiers: vec![ImportSpecifier::Named("$e".into())],
                        source: "rt".into(),
                    },
                    Statement::Import {
                        specifiers: vec![ImportSpecifier::Default("controller".into())],
                        source: "./c.js".into(),
                    },
                    Statement::Const {
                        declarations: vec![
                            Declarator {
                                name: "a".into(),
                                init: Expression::call(Expression::ident("$e"), vec![Expression::string("a")]),
                            },
                            Declarator {
                                name: "b".into(),
                                init: Expression::call(Expression::ident("$e"), vec![Expression::string("b")]),
                            },
                        ],
                    },
                    Statement::ExportDefault(Expression::ident("a")),
                ],
            };
            assert_eq!(
                emit_program(&program, 2),
                "import { $e } from \"rt\";\nimport controller from \"./c.js\";\n\nconst a = $e(\"a\"), b = $e(\"b\");\n\nexport default a;\n"
            );
        }

        #[test]
        fn should_indent_function_bodies() {
            let program = Program {
                body: vec![Statement::ExportDefault(Expression::Function {
                    params: vec!["$$slots".into()],
                    body: vec![Statement::Return(Expression::null())],
                })],
            };
            assert_eq!(
                emit_program(&program, 4),
                "export default function ($$slots) {\n    return null;\n};\n"
            );
        }
    }

    mod expressions {
        use super::*;

        #[test]
        fn should_print_literals() {
            assert_eq!(emit_expr(Expression::string("say \"hi\"\n")), "\"say \\\"hi\\\"\\n\"");
            assert_eq!(emit_expr(Expression::boolean(false)), "false");
            assert_eq!(emit_expr(Expression::null()), "null");
        }

        #[test]
        fn should_print_objects_and_arrays() {
            let object = Expression::object(vec![
                ObjectProperty::new("a", Expression::array(vec![])),
                ObjectProperty::new("data-x", Expression::object(vec![])),
            ]);
            assert_eq!(emit_expr(object), "{ a: [], \"data-x\": {} }");
        }

        #[test]
        fn should_print_arrows() {
            assert_eq!(emit_expr(Expression::thunk(host("a + 1"))), "() => a + 1");
            assert_eq!(
                emit_expr(Expression::arrow(vec![Param::ident("x"), Param::ident("y")], host("x"))),
                "(x, y) => x"
            );
        }

        #[test]
        fn should_wrap_object_bodies_of_arrows() {
            let arrow = Expression::thunk(Expression::object(vec![ObjectProperty::new(
                "a",
                Expression::string("b"),
            )]));
            assert_eq!(emit_expr(arrow), "() => ({ a: \"b\" })");
            assert_eq!(emit_expr(Expression::thunk(host("{ a }"))), "() => ({ a })");
        }

        #[test]
        fn should_print_index_and_member_access() {
            let slot = Expression::call(
                Expression::Index {
                    object: Box::new(Expression::ident("$$slots")),
                    index: Box::new(Expression::string("default")),
                },
                vec![Expression::object(vec![])],
            );
            assert_eq!(emit_expr(slot), "$$slots[\"default\"]({})");
            let member = Expression::Member {
                object: Box::new(Expression::ident("a")),
                property: "b".into(),
            };
            assert_eq!(emit_expr(member), "a.b");
        }

        #[test]
        fn should_print_host_expressions_unchanged() {
            assert_eq!(emit_expr(host("this.user()?.name ?? 'anon'")), "this.user()?.name ?? 'anon'");
        }
    }
}
