#![warn(missing_docs)]
//! Scribe Core - Headless Code Editor Core
//!
//! # Overview
//!
//! `scribe-core` holds the state of a code-editing surface without rendering anything: the
//! document text, cursor and selection addressing, and a syntax-highlighting pipeline that
//! re-lexes and re-parses the document on every change. Languages plug in through
//! [`scribe_lang::LanguageFrontEnd`].
//!
//! # Core Features
//!
//! - **Persistent Rope**: balanced tree of chunks, O(log n) insert/delete/slice, edits return new
//!   snapshots that share unmodified subtrees
//! - **Line Metrics**: cached per node, O(log n) offset ↔ line mapping, O(1) longest line
//! - **Highlighting Pipeline**: background worker, debounced triggers, atomic publishing and
//!   stale-result suppression
//! - **Range Queries**: O(log n + k) lookup of the styles intersecting a viewport
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorSession (editor + pipeline glue)     │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  EditorState (cursor, selection, input)     │  ← Editing
//! ├──────────────────────┬──────────────────────┤
//! │  HighlightPipeline   │  Document            │  ← Versions / Persistence
//! ├──────────────────────┤                      │
//! │  Highlighter index   │                      │  ← Styles
//! ├──────────────────────┴──────────────────────┤
//! │  Position Mapping (CodePosition)            │  ← Addressing
//! ├─────────────────────────────────────────────┤
//! │  Rope                                       │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use scribe_core::{CodePosition, EditorState};
//!
//! let mut editor = EditorState::from_text("var x = 1;\nprint x;");
//! editor.set_cursor(CodePosition::new(8, 0), false);
//! editor.insert_text("4").unwrap();
//!
//! assert_eq!(editor.document().text(), "var x = 41;\nprint x;");
//! assert_eq!(editor.rope().offset_of(CodePosition::new(0, 1)).unwrap(), 12);
//! ```
//!
//! # Module Description
//!
//! - [`rope`] - Persistent rope with line metrics
//! - [`position`] - Offset ↔ code position conversion
//! - [`highlighter`] - Range index over highlight tokens
//! - [`pipeline`] - Versioned highlighting passes
//! - [`document`] - Loading, saving and versioning
//! - [`editor`] - Cursor, selection and text input
//! - [`session`] - Editor state wired to a pipeline
//! - [`config`] - Pipeline and editor settings

pub mod config;
pub mod document;
pub mod editor;
pub mod highlighter;
pub mod pipeline;
pub mod position;
pub mod rope;
pub mod session;

pub use config::{EditorConfig, PipelineConfig};
pub use document::{Document, DocumentError, Snapshot};
pub use editor::{CursorPosition, EditorState};
pub use highlighter::{Highlighter, StyledSpan};
pub use pipeline::{HighlightPipeline, PassOutcome, PipelineState, calculate_highlighting};
pub use position::{CodePosition, PositionError};
pub use rope::{Chunks, Rope, RopeError, TextMetrics};
pub use session::EditorSession;
