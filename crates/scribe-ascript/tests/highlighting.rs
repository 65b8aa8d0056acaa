//! Highlighting visitor tests.

use pretty_assertions::assert_eq;
use scribe_ascript::{AScriptFrontEnd, generate_highlighting};
use scribe_lang::{
    HighlightCategory, HighlightToken, Keyword, LanguageFrontEnd, Markup, Span, TypeKind,
    ValueKind,
};

const ADD_AND_MAIN: &str = "func add(a: number, b: number) { return a + b; } func main() {}";

fn highlight(text: &str) -> Vec<HighlightToken> {
    let front_end = AScriptFrontEnd::new().unwrap();
    let tokens = front_end.tokenize(text);
    let program = front_end.build_ast(&tokens).unwrap();
    generate_highlighting(&program, &tokens)
}

fn token(start: usize, end: usize, category: HighlightCategory) -> HighlightToken {
    HighlightToken::new(Span::new(start, end), category)
}

fn symbol(start: usize, name: &str) -> HighlightToken {
    token(
        start,
        start + name.chars().count(),
        HighlightCategory::SymbolName(name.to_string()),
    )
}

#[test]
fn test_function_declarations() {
    let bracket = || HighlightCategory::Markup(Markup::Bracket);
    let number = || HighlightCategory::Type(TypeKind::Number);

    assert_eq!(
        highlight(ADD_AND_MAIN),
        vec![
            token(0, 4, HighlightCategory::Keyword(Keyword::Func)),
            symbol(5, "add"),
            symbol(9, "a"),
            token(12, 18, number()),
            symbol(20, "b"),
            token(23, 29, number()),
            token(31, 32, bracket()),
            token(33, 39, HighlightCategory::Keyword(Keyword::Return)),
            symbol(40, "a"),
            token(42, 43, HighlightCategory::Operator),
            symbol(44, "b"),
            token(47, 48, bracket()),
            token(49, 53, HighlightCategory::Keyword(Keyword::Func)),
            symbol(54, "main"),
            token(61, 62, bracket()),
            token(62, 63, bracket()),
        ]
    );
}

#[test]
fn test_values_and_operators() {
    assert_eq!(
        highlight("print -1 == \"x\" || true;"),
        vec![
            token(0, 5, HighlightCategory::Keyword(Keyword::Print)),
            token(6, 7, HighlightCategory::Operator),
            token(7, 8, HighlightCategory::Value(ValueKind::Number)),
            token(9, 11, HighlightCategory::Operator),
            token(12, 15, HighlightCategory::Value(ValueKind::String)),
            token(16, 18, HighlightCategory::Operator),
            token(19, 23, HighlightCategory::Value(ValueKind::Boolean)),
        ]
    );
}

#[test]
fn test_optional_children_are_skipped() {
    let categories: Vec<HighlightCategory> = highlight("if x { return; }")
        .into_iter()
        .map(|t| t.category)
        .collect();
    assert_eq!(
        categories,
        vec![
            HighlightCategory::Keyword(Keyword::If),
            HighlightCategory::SymbolName("x".into()),
            HighlightCategory::Markup(Markup::Bracket),
            HighlightCategory::Keyword(Keyword::Return),
            HighlightCategory::Markup(Markup::Bracket),
        ]
    );
}

#[test]
fn test_else_keyword() {
    let tokens = highlight("if a { } else if b { } else { }");
    let keywords: Vec<(Span, Keyword)> = tokens
        .iter()
        .filter_map(|t| match t.category {
            HighlightCategory::Keyword(keyword) => Some((t.span, keyword)),
            _ => None,
        })
        .collect();
    assert_eq!(
        keywords,
        vec![
            (Span::new(0, 2), Keyword::If),
            (Span::new(9, 13), Keyword::Else),
            (Span::new(14, 16), Keyword::If),
            (Span::new(23, 27), Keyword::Else),
        ]
    );
}

#[test]
fn test_spans_are_in_order() {
    let text = "proc main() {\n  var s = \"héllo\";\n  while s != \"\" { s = tail(s); }\n}";
    let tokens = highlight(text);
    assert!(tokens.windows(2).all(|w| w[0].span.start < w[1].span.start));
    assert!(tokens.iter().all(|t| t.span.end <= text.chars().count()));
}
