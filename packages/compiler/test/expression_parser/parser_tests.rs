/**
 * Parser Tests
 *
 * Host expression grammar: precedence, member chains, arrow functions,
 * literals, the end offset reported to the template parser and errors.
 */

#[cfg(test)]
mod tests {
    use htmly_compiler::expression_parser::{
        parse_expression_at, serialize, BinaryOperator, Expr, LiteralValue, Parser, UnaryOperator,
    };

    fn parse(text: &str) -> Expr {
        Parser::new(text, "test").parse().unwrap_or_else(|e| panic!("{}", e))
    }

    fn check(text: &str, expected: &str) {
        assert_eq!(serialize(&parse(text)), expected);
    }

    fn expect_error(text: &str, message: &str) {
        match Parser::new(text, "test").parse() {
            Ok(expr) => panic!("Expected an error for '{}', got {:?}", text, expr),
            Err(error) => assert!(
                error.msg.contains(message),
                "Expected '{}' in '{}'",
                message,
                error.msg
            ),
        }
    }

    mod literals {
        use super::*;

        #[test]
        fn should_parse_numbers() {
            assert_eq!(parse("1"), Expr::number(1.0));
            assert_eq!(parse("0.5"), Expr::number(0.5));
        }

        #[test]
        fn should_parse_strings() {
            assert_eq!(parse("'a'"), Expr::string("a"));
            assert_eq!(parse("\"b\""), Expr::string("b"));
        }

        #[test]
        fn should_parse_keywords() {
            assert_eq!(parse("true"), Expr::boolean(true));
            assert_eq!(parse("null"), Expr::Literal { value: LiteralValue::Null });
            assert_eq!(
                parse("undefined"),
                Expr::Literal {
                    value: LiteralValue::Undefined
                }
            );
            assert_eq!(parse("this"), Expr::This);
        }

        #[test]
        fn should_parse_arrays() {
            check("[1, 'two', true, null]", "[1, 'two', true, null]");
            check("[]", "[]");
        }

        #[test]
        fn should_parse_objects() {
            check("{a: 1, 'b-c': 2}", "{ a: 1, 'b-c': 2 }");
            check("{}", "{}");
        }

        #[test]
        fn should_parse_shorthand_properties() {
            let expr = parse("{ item, index: i }");
            match expr {
                Expr::Object { properties } => {
                    assert!(properties[0].shorthand);
                    assert_eq!(properties[0].value, Expr::identifier("item"));
                    assert!(!properties[1].shorthand);
                }
                other => panic!("Expected object, got {:?}", other),
            }
        }

        #[test]
        fn should_allow_trailing_commas() {
            check("[1, 2,]", "[1, 2]");
            check("f(a,)", "f(a)");
        }
    }

    mod operators {
        use super::*;

        #[test]
        fn should_respect_precedence() {
            let expr = parse("a + b * c");
            match expr {
                Expr::Binary { operator, right, .. } => {
                    assert_eq!(operator, BinaryOperator::Add);
                    assert!(matches!(
                        *right,
                        Expr::Binary {
                            operator: BinaryOperator::Multiply,
                            ..
                        }
                    ));
                }
                other => panic!("Expected binary, got {:?}", other),
            }
        }

        #[test]
        fn should_keep_needed_parentheses() {
            check("(a + b) * c", "(a + b) * c");
            check("a - (b - c)", "a - (b - c)");
            check("a - b - c", "a - b - c");
        }

        #[test]
        fn should_parse_exponentiation_right_associative() {
            check("2 ** 3 ** 2", "2 ** 3 ** 2");
            check("(2 ** 3) ** 2", "(2 ** 3) ** 2");
        }

        #[test]
        fn should_parse_logical_operators() {
            check("a && b || c", "a && b || c");
            check("a && (b || c)", "a && (b || c)");
            check("a ?? b", "a ?? b");
        }

        #[test]
        fn should_parse_equality_and_relational() {
            check("a === b", "a === b");
            check("a != null", "a != null");
            check("a <= b == c > d", "a <= b == c > d");
        }

        #[test]
        fn should_parse_unary_operators() {
            let expr = parse("!a");
            assert!(matches!(
                expr,
                Expr::Unary {
                    operator: UnaryOperator::Not,
                    ..
                }
            ));
            check("typeof x", "typeof x");
            check("-(-a)", "- -a");
            check("-(a + b)", "-(a + b)");
        }

        #[test]
        fn should_parse_conditionals() {
            check("a ? b : c", "a ? b : c");
            check("a ? b : c ? d : e", "a ? b : c ? d : e");
            check("(a ? b : c) ? d : e", "(a ? b : c) ? d : e");
        }
    }

    mod chains {
        use super::*;

        #[test]
        fn should_parse_member_calls() {
            assert_eq!(
                parse("this.items()"),
                Expr::call(Expr::member(Expr::This, "items"), vec![])
            );
        }

        #[test]
        fn should_parse_index_access() {
            check("list[0].name", "list[0].name");
        }

        #[test]
        fn should_parse_optional_links() {
            check("user?.name", "user?.name");
            check("fn?.(1)", "fn?.(1)");
            check("list?.[0]", "list?.[0]");
            assert!(parse("a?.b.c").has_optional_link());
            assert!(!parse("a.b.c").has_optional_link());
        }

        #[test]
        fn should_allow_keywords_as_property_names() {
            check("a.null.this", "a.null.this");
        }

        #[test]
        fn should_call_the_result_of_calls() {
            check("item().tags[0]()", "item().tags[0]()");
        }
    }

    mod arrows {
        use super::*;

        #[test]
        fn should_parse_single_parameter_arrows() {
            assert_eq!(
                parse("x => x"),
                Expr::Arrow {
                    params: vec!["x".to_string()],
                    body: Box::new(Expr::identifier("x")),
                }
            );
        }

        #[test]
        fn should_parse_parenthesized_parameter_lists() {
            check("() => 1", "() => 1");
            check("(a, b) => a + b", "(a, b) => a + b");
        }

        #[test]
        fn should_wrap_object_bodies() {
            check("x => ({ x })", "(x) => ({ x })");
        }

        #[test]
        fn should_parse_arrows_as_arguments() {
            check("items.filter(item => item.done)", "items.filter((item) => item.done)");
        }

        #[test]
        fn should_not_mistake_parentheses_for_parameters() {
            check("(a) + b", "a + b");
        }
    }

    mod offsets {
        use super::*;

        #[test]
        fn should_stop_before_the_interpolation_end() {
            let (expr, end) = parse_expression_at("{{ a + b }}", 3).unwrap();
            assert_eq!(serialize(&expr), "a + b");
            assert_eq!(end, 8);
        }

        #[test]
        fn should_stop_at_the_closing_quote() {
            let text = "<p [title]=\"user.name\">";
            let (expr, end) = parse_expression_at(text, 12).unwrap();
            assert_eq!(serialize(&expr), "user.name");
            assert_eq!(&text[end..], "\">");
        }

        #[test]
        fn should_stop_before_a_following_word() {
            let (expr, end) = parse_expression_at("item of items", 0).unwrap();
            assert_eq!(expr, Expr::identifier("item"));
            assert_eq!(end, 4);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_report_unexpected_end() {
            expect_error("a +", "Unexpected end of expression");
        }

        #[test]
        fn should_report_trailing_tokens() {
            expect_error("a b", "Unexpected token 'b'");
        }

        #[test]
        fn should_report_missing_parenthesis() {
            expect_error("(a", "Expected ')'");
        }

        #[test]
        fn should_reject_block_bodies() {
            expect_error("x => { }", "Arrow function bodies must be expressions");
        }

        #[test]
        fn should_surface_lexer_errors() {
            expect_error("a + #", "Lexer Error");
        }

        #[test]
        fn should_report_the_position() {
            let error = Parser::new("a\n+ )", "test").parse().unwrap_err();
            assert_eq!(error.span.start.line, 1);
            assert_eq!(error.span.start.col, 2);
        }
    }
}
