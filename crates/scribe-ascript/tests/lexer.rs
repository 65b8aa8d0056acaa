//! Lexer totality and determinism.

use scribe_ascript::{Lexer, TokenKind};

const SOURCES: &[&str] = &[
    "func add(a: number, b: number) { return a + b; }",
    "var s = \"multi\nline\"; print s;",
    "@@ $ var ~x = 1 ?",
    "\"unterminated string with ä and 😀",
    "a&&b||c!=d>=e<=f==g",
    "",
];

#[test]
fn test_every_non_whitespace_char_is_covered_once() {
    let lexer = Lexer::new().unwrap();

    for source in SOURCES {
        let tokens = lexer.tokenize(source);
        let chars: Vec<char> = source.chars().collect();
        let mut covered = vec![0; chars.len()];
        for token in &tokens {
            assert!(token.span.start < token.span.end, "empty token in {source:?}");
            for slot in &mut covered[token.span.start..token.span.end] {
                *slot += 1;
            }
        }

        for (i, ch) in chars.iter().enumerate() {
            let expected = if ch.is_whitespace() && !inside_string(&tokens, i) { 0 } else { 1 };
            assert_eq!(covered[i], expected, "char {i} ({ch:?}) in {source:?}");
        }
    }
}

fn inside_string(tokens: &[scribe_ascript::Token], offset: usize) -> bool {
    tokens
        .iter()
        .any(|t| t.kind == TokenKind::String && t.span.contains(offset))
}

#[test]
fn test_tokenizing_is_deterministic() {
    let lexer = Lexer::new().unwrap();
    for source in SOURCES {
        assert_eq!(lexer.tokenize(source), lexer.tokenize(source));
    }
}

#[test]
fn test_unknown_characters_become_error_tokens() {
    let lexer = Lexer::new().unwrap();
    let errors: Vec<usize> = lexer
        .tokenize("@@ $ var ~x = 1 ?")
        .iter()
        .filter(|t| t.kind == TokenKind::Error)
        .map(|t| t.span.start)
        .collect();
    assert_eq!(errors, vec![0, 1, 3, 9, 16]);
}
