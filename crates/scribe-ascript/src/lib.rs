//! `scribe-ascript` - the AScript language front-end for `scribe-core`.
//!
//! AScript is a small scripting language (`.as` files) with typed function parameters:
//!
//! ```text
//! func add(a: number, b: number) {
//!     return a + b;
//! }
//!
//! proc main() {
//!     var total = add(1, 2);
//!     if total > 2 { print "big"; } else { print "small"; }
//! }
//! ```
//!
//! The crate provides the three pipeline stages ([`Lexer`], [`parse`],
//! [`generate_highlighting`]) and [`AScriptFrontEnd`], which bundles them for a
//! [`scribe_lang::FrontEndRegistry`].
//!
//! ```rust
//! use scribe_ascript::AScriptFrontEnd;
//! use scribe_lang::{DynFrontEnd, FrontEndRegistry};
//!
//! let mut registry = FrontEndRegistry::new();
//! AScriptFrontEnd::register(&mut registry).unwrap();
//!
//! let front_end = registry.for_extension("as").unwrap();
//! let tokens = front_end.highlight("var x = 1;", &mut |_| {}).unwrap();
//! assert_eq!(tokens.len(), 3);
//! ```

pub mod ast;
mod error;
mod frontend;
mod highlighting;
mod lexer;
mod parser;
mod token;

pub use error::{ParseError, Production};
pub use frontend::{AScriptFrontEnd, LANGUAGE};
pub use highlighting::generate_highlighting;
pub use lexer::Lexer;
pub use parser::{MAX_NESTING, parse};
pub use token::{Token, TokenKind};
