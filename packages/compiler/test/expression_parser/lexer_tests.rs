/**
 * Lexer Tests
 *
 * Token scanning for host expressions, including scanning that starts in
 * the middle of template text.
 */

#[cfg(test)]
mod tests {
    use htmly_compiler::expression_parser::lexer::{Lexer, Token};

    fn lex(text: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(text, 0);
        std::iter::from_fn(|| lexer.next_token()).collect()
    }

    fn expect_token(token: &Token, index: usize, end: usize) {
        assert_eq!(token.index, index, "Token index mismatch");
        assert_eq!(token.end, end, "Token end mismatch");
    }

    fn expect_character_token(token: &Token, index: usize, end: usize, character: char) {
        expect_token(token, index, end);
        assert!(token.is_character(character), "Expected character token '{}'", character);
    }

    fn expect_operator_token(token: &Token, index: usize, end: usize, operator: &str) {
        expect_token(token, index, end);
        assert!(token.is_operator(operator), "Expected operator token '{}'", operator);
    }

    fn expect_number_token(token: &Token, index: usize, end: usize, n: f64) {
        expect_token(token, index, end);
        assert!(token.is_number(), "Expected number token");
        assert!((token.num_value - n).abs() < f64::EPSILON, "Expected number {}", n);
    }

    fn expect_string_token(token: &Token, index: usize, end: usize, s: &str) {
        expect_token(token, index, end);
        assert!(token.is_string(), "Expected string token");
        assert_eq!(token.str_value, s);
    }

    fn expect_identifier_token(token: &Token, index: usize, end: usize, name: &str) {
        expect_token(token, index, end);
        assert!(token.is_identifier(), "Expected identifier token");
        assert_eq!(token.str_value, name);
    }

    fn expect_keyword_token(token: &Token, index: usize, end: usize, keyword: &str) {
        expect_token(token, index, end);
        assert!(token.is_keyword_named(keyword), "Expected keyword '{}'", keyword);
    }

    fn expect_error_token(token: &Token, message: &str) {
        assert!(token.is_error(), "Expected error token");
        assert!(
            token.str_value.contains(message),
            "Expected '{}' in '{}'",
            message,
            token.str_value
        );
    }

    mod token {
        use super::*;

        #[test]
        fn should_tokenize_a_simple_identifier() {
            let tokens = lex("j");
            assert_eq!(tokens.len(), 1);
            expect_identifier_token(&tokens[0], 0, 1, "j");
        }

        #[test]
        fn should_tokenize_a_dotted_identifier() {
            let tokens = lex("j.k");
            assert_eq!(tokens.len(), 3);
            expect_identifier_token(&tokens[0], 0, 1, "j");
            expect_character_token(&tokens[1], 1, 2, '.');
            expect_identifier_token(&tokens[2], 2, 3, "k");
        }

        #[test]
        fn should_tokenize_keywords() {
            let tokens = lex("this typeof null");
            expect_keyword_token(&tokens[0], 0, 4, "this");
            expect_keyword_token(&tokens[1], 5, 11, "typeof");
            expect_keyword_token(&tokens[2], 12, 16, "null");
        }

        #[test]
        fn should_tokenize_identifiers_with_dollar_and_underscore() {
            let tokens = lex("$item _index");
            expect_identifier_token(&tokens[0], 0, 5, "$item");
            expect_identifier_token(&tokens[1], 6, 12, "_index");
        }

        #[test]
        fn should_tokenize_a_call() {
            let tokens = lex("items()");
            expect_identifier_token(&tokens[0], 0, 5, "items");
            expect_character_token(&tokens[1], 5, 6, '(');
            expect_character_token(&tokens[2], 6, 7, ')');
        }

        #[test]
        fn should_tokenize_numbers() {
            let tokens = lex("88 0.5 .5 1.5e3");
            expect_number_token(&tokens[0], 0, 2, 88.0);
            expect_number_token(&tokens[1], 3, 6, 0.5);
            expect_number_token(&tokens[2], 7, 9, 0.5);
            expect_number_token(&tokens[3], 10, 15, 1500.0);
        }

        #[test]
        fn should_tokenize_quoted_strings() {
            let tokens = lex("'a' \"b\"");
            expect_string_token(&tokens[0], 0, 3, "a");
            expect_string_token(&tokens[1], 4, 7, "b");
        }

        #[test]
        fn should_unescape_strings() {
            let tokens = lex(r"'it\'s\nA'");
            assert_eq!(tokens[0].str_value, "it's\nA");
        }

        #[test]
        fn should_prefer_the_longest_operator() {
            let tokens = lex("a === b !== c ?? d");
            expect_operator_token(&tokens[1], 2, 5, "===");
            expect_operator_token(&tokens[3], 8, 11, "!==");
            expect_operator_token(&tokens[5], 14, 16, "??");
        }

        #[test]
        fn should_tokenize_optional_chaining() {
            let tokens = lex("a?.b");
            expect_operator_token(&tokens[1], 1, 3, "?.");
        }

        #[test]
        fn should_not_mistake_a_conditional_for_optional_chaining() {
            let tokens = lex("a?.5:b");
            expect_operator_token(&tokens[1], 1, 2, "?");
            expect_number_token(&tokens[2], 2, 4, 0.5);
            expect_character_token(&tokens[3], 4, 5, ':');
        }

        #[test]
        fn should_tokenize_the_arrow_operator() {
            let tokens = lex("x => x");
            expect_operator_token(&tokens[1], 2, 4, "=>");
        }

        #[test]
        fn should_skip_whitespace() {
            let tokens = lex("  a\n\t+ b ");
            assert_eq!(tokens.len(), 3);
            expect_operator_token(&tokens[1], 5, 6, "+");
        }
    }

    mod offsets {
        use super::*;

        #[test]
        fn should_start_scanning_at_the_given_offset() {
            let mut lexer = Lexer::new("{{ user.name }}", 3);
            let token = lexer.next_token().unwrap();
            expect_identifier_token(&token, 3, 7, "user");
            assert_eq!(lexer.next_token().unwrap().index, 7);
        }

        #[test]
        fn should_return_none_at_end_of_input() {
            let mut lexer = Lexer::new("a", 1);
            assert!(lexer.next_token().is_none());
        }

        #[test]
        fn should_scan_independently_when_copied() {
            let mut lexer = Lexer::new("a b", 0);
            let mut lookahead = lexer;
            lookahead.next_token();
            lookahead.next_token();
            let token = lexer.next_token().unwrap();
            expect_identifier_token(&token, 0, 1, "a");
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_report_unexpected_characters() {
            let tokens = lex("a # b");
            expect_error_token(&tokens[1], "Unexpected character [#]");
        }

        #[test]
        fn should_report_unterminated_strings() {
            let tokens = lex("'abc");
            expect_error_token(&tokens[0], "Unterminated quote");
        }

        #[test]
        fn should_report_invalid_exponents() {
            let tokens = lex("1e");
            expect_error_token(&tokens[0], "Invalid exponent");
        }

        #[test]
        fn should_report_the_column() {
            let tokens = lex("ab #");
            expect_error_token(&tokens[1], "at column 3");
        }
    }
}
