//! Spans and semantic highlight categories.

use std::fmt;

/// Style ID type
///
/// These are only identifiers. The UI/theme layer is expected to map them to actual colors.
pub type StyleId = u32;

/// Style id for language keywords (`var`, `if`, `func`, ...).
pub const STYLE_KEYWORD: StyleId = 0x0500_0001;
/// Style id for parameter type names (`bool`, `string`, `number`).
pub const STYLE_TYPE: StyleId = 0x0500_0002;
/// Style id for symbol references and declarations.
pub const STYLE_SYMBOL: StyleId = 0x0500_0003;
/// Style id for unary and binary operators.
pub const STYLE_OPERATOR: StyleId = 0x0500_0004;
/// Style id for `true` / `false`.
pub const STYLE_VALUE_BOOLEAN: StyleId = 0x0500_0010;
/// Style id for number literals.
pub const STYLE_VALUE_NUMBER: StyleId = 0x0500_0011;
/// Style id for string literals.
pub const STYLE_VALUE_STRING: StyleId = 0x0500_0012;
/// Style id for block brackets.
pub const STYLE_MARKUP_BRACKET: StyleId = 0x0500_0020;

/// Half-open range `[start, end)` of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a span from `[start, end)`.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered by the span.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if the span contains a specific offset.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Check if the span intersects `[start, end)`.
    pub fn intersects(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Keyword variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `var`
    Var,
    /// `if`
    If,
    /// `else`
    Else,
    /// `while`
    While,
    /// `print`
    Print,
    /// `func`
    Func,
    /// `return`
    Return,
    /// `proc`
    Proc,
}

/// Parameter type variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `bool`
    Bool,
    /// `string`
    String,
    /// `number`
    Number,
}

/// Literal value variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `true` / `false`
    Boolean,
    /// Number literal
    Number,
    /// String literal
    String,
}

/// Markup variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Markup {
    /// Block delimiter (`{` / `}`).
    Bracket,
}

/// Semantic category of a highlighted token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HighlightCategory {
    /// A language keyword.
    Keyword(Keyword),
    /// A parameter type.
    Type(TypeKind),
    /// A symbol (variable, function or procedure name) with its identifier text.
    SymbolName(String),
    /// A unary or binary operator.
    Operator,
    /// A literal value.
    Value(ValueKind),
    /// Structural markup.
    Markup(Markup),
}

impl HighlightCategory {
    /// Renderer-agnostic style id for this category.
    ///
    /// The style depends on the category kind only; symbol names share one style.
    pub fn style_id(&self) -> StyleId {
        match self {
            Self::Keyword(_) => STYLE_KEYWORD,
            Self::Type(_) => STYLE_TYPE,
            Self::SymbolName(_) => STYLE_SYMBOL,
            Self::Operator => STYLE_OPERATOR,
            Self::Value(ValueKind::Boolean) => STYLE_VALUE_BOOLEAN,
            Self::Value(ValueKind::Number) => STYLE_VALUE_NUMBER,
            Self::Value(ValueKind::String) => STYLE_VALUE_STRING,
            Self::Markup(Markup::Bracket) => STYLE_MARKUP_BRACKET,
        }
    }

    /// Dotted scope name for theming (e.g. `keyword.func`, `value.string`).
    pub fn scope(&self) -> &'static str {
        match self {
            Self::Keyword(Keyword::Var) => "keyword.var",
            Self::Keyword(Keyword::If) => "keyword.if",
            Self::Keyword(Keyword::Else) => "keyword.else",
            Self::Keyword(Keyword::While) => "keyword.while",
            Self::Keyword(Keyword::Print) => "keyword.print",
            Self::Keyword(Keyword::Func) => "keyword.func",
            Self::Keyword(Keyword::Return) => "keyword.return",
            Self::Keyword(Keyword::Proc) => "keyword.proc",
            Self::Type(TypeKind::Bool) => "type.bool",
            Self::Type(TypeKind::String) => "type.string",
            Self::Type(TypeKind::Number) => "type.number",
            Self::SymbolName(_) => "symbol",
            Self::Operator => "operator",
            Self::Value(ValueKind::Boolean) => "value.boolean",
            Self::Value(ValueKind::Number) => "value.number",
            Self::Value(ValueKind::String) => "value.string",
            Self::Markup(Markup::Bracket) => "markup.bracket",
        }
    }
}

/// A `(span, category)` pair produced by a highlighting pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightToken {
    /// Character span of the highlighted token.
    pub span: Span,
    /// Semantic category.
    pub category: HighlightCategory,
}

impl HighlightToken {
    /// Create a highlight token.
    pub fn new(span: Span, category: HighlightCategory) -> Self {
        Self { span, category }
    }
}
