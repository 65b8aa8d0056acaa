#![warn(missing_docs)]
//! `scribe-lang` - language front-end interfaces for `scribe-core`.
//!
//! This crate stays lightweight and does **not** depend on the rope or on any concrete grammar.
//! It provides the vocabulary shared between the editor core and language crates:
//!
//! - [`Span`]: a half-open range of character offsets
//! - [`HighlightCategory`] / [`HighlightToken`]: the semantic output of a highlighting pass
//! - [`LanguageFrontEnd`]: the per-language bundle (lexer, AST builder, highlighting visitor)
//! - [`FrontEndRegistry`]: an explicit registry that selects a front-end by file extension

mod frontend;
mod highlight;

pub use frontend::{
    DynFrontEnd, FrontEndRegistry, HighlightError, Language, LanguageFrontEnd, Stage,
};
pub use highlight::{
    HighlightCategory, HighlightToken, Keyword, Markup, STYLE_KEYWORD, STYLE_MARKUP_BRACKET,
    STYLE_OPERATOR, STYLE_SYMBOL, STYLE_TYPE, STYLE_VALUE_BOOLEAN, STYLE_VALUE_NUMBER,
    STYLE_VALUE_STRING, Span, StyleId, TypeKind, ValueKind,
};
