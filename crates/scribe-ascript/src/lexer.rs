//! AScript lexer.
//!
//! Scans left to right. At each position the token parsers are tried in a fixed order and the
//! first one that succeeds wins:
//!
//! 1. fixed symbols, longest first (so `==` never lexes as two `=`)
//! 2. regex matchers: numbers, then identifiers (reserved words are identifiers with a keyword
//!    spelling)
//! 3. string literals (a closing quote is required; no escapes; may span lines)
//!
//! Whitespace is skipped. Any other character no parser accepts becomes a one-character
//! [`TokenKind::Error`] token, so tokenizing never fails.

use crate::token::{Token, TokenKind};
use log::trace;
use regex::Regex;
use scribe_lang::Span;

/// Fixed symbols, multi-character ones first.
const SYMBOLS: &[(&str, TokenKind)] = &[
    ("==", TokenKind::EqualEqual),
    ("!=", TokenKind::NotEqual),
    ("<=", TokenKind::LessEqual),
    (">=", TokenKind::GreaterEqual),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("(", TokenKind::LeftParen),
    (")", TokenKind::RightParen),
    ("{", TokenKind::LeftBrace),
    ("}", TokenKind::RightBrace),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    ("=", TokenKind::Assign),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("!", TokenKind::Bang),
    ("<", TokenKind::Less),
    (">", TokenKind::Greater),
];

/// Result of one token parser: kind, consumed bytes, literal value.
type Lexeme = (TokenKind, usize, Option<String>);

/// Tokenizer for AScript source.
#[derive(Debug, Clone)]
pub struct Lexer {
    number: Regex,
    identifier: Regex,
}

impl Lexer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            number: Regex::new(r"^[0-9]+(?:\.[0-9]+)?")?,
            identifier: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*")?,
        })
    }

    /// Split `text` into tokens. Spans are character offsets.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut byte = 0;
        let mut offset = 0;

        while let Some(ch) = text[byte..].chars().next() {
            if ch.is_whitespace() {
                byte += ch.len_utf8();
                offset += 1;
                continue;
            }

            let rest = &text[byte..];
            let (kind, len, value) = symbol(rest)
                .or_else(|| self.regex_token(rest))
                .or_else(|| string_literal(rest))
                .unwrap_or((TokenKind::Error, ch.len_utf8(), None));

            let chars = rest[..len].chars().count();
            let span = Span::new(offset, offset + chars);
            tokens.push(Token { kind, span, value });

            byte += len;
            offset += chars;
        }

        trace!("Tokenized {offset} chars into {} tokens", tokens.len());
        tokens
    }

    fn regex_token(&self, rest: &str) -> Option<Lexeme> {
        if let Some(m) = self.number.find(rest) {
            return Some((TokenKind::Number, m.end(), Some(m.as_str().to_string())));
        }
        let m = self.identifier.find(rest)?;
        let text = m.as_str();
        Some(match TokenKind::keyword(text) {
            Some(keyword) => (keyword, m.end(), None),
            None => (TokenKind::Identifier, m.end(), Some(text.to_string())),
        })
    }
}

fn symbol(rest: &str) -> Option<Lexeme> {
    SYMBOLS
        .iter()
        .find(|(symbol, _)| rest.starts_with(symbol))
        .map(|&(symbol, kind)| (kind, symbol.len(), None))
}

fn string_literal(rest: &str) -> Option<Lexeme> {
    let body = rest.strip_prefix('"')?;
    let close = body.find('"')?;
    Some((TokenKind::String, close + 2, Some(body[..close].to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<TokenKind> {
        Lexer::new()
            .unwrap()
            .tokenize(text)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_longest_symbol_first() {
        assert_eq!(
            kinds("a == b = c <= !d"),
            vec![
                TokenKind::Identifier,
                TokenKind::EqualEqual,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Identifier,
                TokenKind::LessEqual,
                TokenKind::Bang,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_keywords_are_reserved_identifiers() {
        assert_eq!(
            kinds("var variable number numbers"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::NumberType,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_becomes_error_token() {
        let tokens = Lexer::new().unwrap().tokenize("\"abc");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].span, Span::new(0, 1));
        assert_eq!(tokens[1].value.as_deref(), Some("abc"));
    }

    #[test]
    fn test_spans_count_chars() {
        let tokens = Lexer::new().unwrap().tokenize("print \"héllo\"; x");
        assert_eq!(tokens[1].span, Span::new(6, 13));
        assert_eq!(tokens[1].value.as_deref(), Some("héllo"));
        assert_eq!(tokens[3].span, Span::new(15, 16));
    }
}
