//! Highlighter range index
//!
//! Indexes the highlight tokens of one pass for viewport queries.
//!
//! Tokens are kept sorted by start offset together with a prefix maximum of end offsets, so a
//! query is a binary search plus a scan over the overlapping tokens: O(log n + k). The index is
//! rebuilt wholesale for every pass and never patched.

use scribe_lang::{HighlightCategory, HighlightToken, Span, StyleId};

/// A highlighted span paired with its renderer-agnostic style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    /// Character span (absolute document offsets, half-open).
    pub span: Span,
    /// Semantic category the style was derived from.
    pub category: HighlightCategory,
    /// Style id (a function of the category only).
    pub style_id: StyleId,
    /// Dotted scope name for theming.
    pub scope: &'static str,
}

impl StyledSpan {
    fn from_token(token: &HighlightToken) -> Self {
        Self {
            span: token.span,
            category: token.category.clone(),
            style_id: token.category.style_id(),
            scope: token.category.scope(),
        }
    }

    /// Restrict the span to `[start, end)` and rebase it so `start` becomes `0`.
    ///
    /// Handy for renderers that lay out a slice of lines starting at `start`. An inverted range
    /// yields an empty span.
    pub fn relative_to(&self, start: usize, end: usize) -> Span {
        if start > end {
            return Span::new(0, 0);
        }
        Span::new(
            self.span.start.clamp(start, end) - start,
            self.span.end.clamp(start, end) - start,
        )
    }
}

/// Range index over the highlight tokens of one successful pass.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    /// Tokens sorted by span start.
    tokens: Vec<HighlightToken>,
    /// `prefix_max_end[i] = max(tokens[0..=i].span.end)`
    prefix_max_end: Vec<usize>,
}

impl Highlighter {
    /// Build an index from the full token list of a pass. Empty spans are dropped.
    pub fn new(mut tokens: Vec<HighlightToken>) -> Self {
        tokens.retain(|token| !token.span.is_empty());
        tokens.sort_by_key(|token| (token.span.start, token.span.end));

        let mut max_end = 0;
        let prefix_max_end = tokens
            .iter()
            .map(|token| {
                max_end = max_end.max(token.span.end);
                max_end
            })
            .collect();

        Self {
            tokens,
            prefix_max_end,
        }
    }

    /// Every token whose span intersects `[start, end)`, in span order.
    pub fn highlight_range(&self, start: usize, end: usize) -> Vec<StyledSpan> {
        self.query(start, end)
            .iter()
            .filter(|token| token.span.intersects(start, end))
            .map(StyledSpan::from_token)
            .collect()
    }

    /// The token covering `offset`, if any.
    pub fn token_at(&self, offset: usize) -> Option<&HighlightToken> {
        self.query(offset, offset.saturating_add(1))
            .iter()
            .find(|token| token.span.contains(offset))
    }

    /// Candidate slice for `[start, end)`: every intersecting token lies inside it.
    fn query(&self, start: usize, end: usize) -> &[HighlightToken] {
        if self.tokens.is_empty() || start >= end {
            return &[];
        }

        // First token starting at or after `end`; nothing from there on can intersect.
        let search_end = self.tokens.partition_point(|token| token.span.start < end);

        // First token starting at or after `start`, then walk back while earlier tokens may
        // still reach past `start`.
        let mut scan_start = self
            .tokens
            .partition_point(|token| token.span.start < start)
            .min(search_end);
        while scan_start > 0 && self.prefix_max_end[scan_start - 1] > start {
            scan_start -= 1;
        }

        &self.tokens[scan_start..search_end]
    }

    /// All tokens in span order.
    pub fn tokens(&self) -> &[HighlightToken] {
        &self.tokens
    }

    /// Number of indexed tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the index holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scribe_lang::{Keyword, Markup, ValueKind};

    fn token(start: usize, end: usize, category: HighlightCategory) -> HighlightToken {
        HighlightToken::new(Span::new(start, end), category)
    }

    fn sample() -> Highlighter {
        Highlighter::new(vec![
            token(10, 11, HighlightCategory::Markup(Markup::Bracket)),
            token(0, 4, HighlightCategory::Keyword(Keyword::Func)),
            token(5, 8, HighlightCategory::SymbolName("add".into())),
            token(20, 21, HighlightCategory::Markup(Markup::Bracket)),
            token(12, 14, HighlightCategory::Value(ValueKind::Number)),
        ])
    }

    #[test]
    fn test_tokens_are_sorted_by_start() {
        let highlighter = sample();
        let starts: Vec<usize> = highlighter.tokens().iter().map(|t| t.span.start).collect();
        assert_eq!(starts, vec![0, 5, 10, 12, 20]);
    }

    #[test]
    fn test_boundaries_are_half_open() {
        let highlighter = sample();

        // [4, 5) touches the end of `func` and the start of `add`: neither intersects.
        assert!(highlighter.highlight_range(4, 5).is_empty());

        let spans = highlighter.highlight_range(3, 6);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].scope, "keyword.func");
        assert_eq!(spans[1].scope, "symbol");

        let spans = highlighter.highlight_range(8, 10);
        assert!(spans.is_empty());

        let spans = highlighter.highlight_range(10, 11);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span, Span::new(10, 11));
    }

    #[test]
    fn test_long_token_found_from_later_start() {
        let highlighter = Highlighter::new(vec![
            token(0, 100, HighlightCategory::Value(ValueKind::String)),
            token(10, 12, HighlightCategory::Operator),
            token(50, 52, HighlightCategory::Operator),
        ]);

        let spans = highlighter.highlight_range(60, 70);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span, Span::new(0, 100));

        assert_eq!(highlighter.token_at(51).map(|t| t.span), Some(Span::new(0, 100)));
    }

    #[test]
    fn test_empty_queries() {
        let highlighter = sample();
        assert!(highlighter.highlight_range(5, 5).is_empty());
        assert!(highlighter.highlight_range(7, 3).is_empty());
        assert!(Highlighter::default().highlight_range(0, 100).is_empty());
        assert!(highlighter.token_at(4).is_none());
    }

    #[test]
    fn test_relative_to_clips_and_rebases() {
        let highlighter = sample();
        let spans = highlighter.highlight_range(6, 30);
        assert_eq!(spans[0].relative_to(6, 30), Span::new(0, 2));
        assert_eq!(spans.last().unwrap().relative_to(6, 30), Span::new(14, 15));

        // Inverted ranges clip to nothing.
        assert_eq!(spans[0].relative_to(30, 6), Span::new(0, 0));
        assert!(spans[0].relative_to(9, 9).is_empty());
    }

    #[test]
    fn test_token_at_extreme_offsets() {
        let highlighter = sample();
        assert!(highlighter.token_at(usize::MAX).is_none());
        assert!(highlighter.token_at(usize::MAX - 1).is_none());
        assert!(Highlighter::default().token_at(0).is_none());
    }
}
