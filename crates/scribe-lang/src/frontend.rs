//! Language front-ends and the registry used to select them.

use crate::HighlightToken;
use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// A stage of a highlighting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Text is being split into concrete tokens.
    Tokenizing,
    /// Tokens are being assembled into a syntax tree.
    Parsing,
    /// The syntax tree is being walked to produce highlight tokens.
    Highlighting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Tokenizing => "tokenizing",
            Stage::Parsing => "parsing",
            Stage::Highlighting => "highlighting",
        };
        f.write_str(name)
    }
}

/// A failed highlighting pass, tagged with the stage that failed.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct HighlightError {
    /// The stage that produced the error.
    pub stage: Stage,
    /// The front-end specific error.
    pub source: Box<dyn Error + Send + Sync>,
}

impl HighlightError {
    /// Wrap a front-end error produced during `stage`.
    pub fn new(stage: Stage, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// Static description of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Human readable language name.
    pub name: &'static str,
    /// File extensions (without the leading dot) handled by the language.
    pub file_extensions: &'static [&'static str],
}

impl Language {
    /// Returns `true` if `extension` (without the dot) belongs to this language.
    pub fn matches_extension(&self, extension: &str) -> bool {
        self.file_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// The per-language bundle of lexer, AST builder and highlighting visitor.
///
/// Each stage is exposed separately so that language crates can be tested stage by stage. The
/// editor core drives them through the object-safe [`DynFrontEnd`], which every implementation
/// gets for free.
pub trait LanguageFrontEnd: Send + Sync {
    /// A concrete (lexed) token.
    type Token;
    /// The root of the syntax tree.
    type Ast;
    /// The error returned by [`LanguageFrontEnd::build_ast`].
    type Error: Error + Send + Sync + 'static;

    /// Name and file extensions of the language.
    fn language(&self) -> Language;

    /// Split `text` into concrete tokens. Must be total: malformed input degrades to error tokens.
    fn tokenize(&self, text: &str) -> Vec<Self::Token>;

    /// Build a syntax tree from `tokens`, failing fast on the first syntax error.
    fn build_ast(&self, tokens: &[Self::Token]) -> Result<Self::Ast, Self::Error>;

    /// Walk `ast` and emit highlight tokens in span order.
    fn build_highlighting(&self, ast: &Self::Ast, tokens: &[Self::Token]) -> Vec<HighlightToken>;
}

/// Object-safe view of a [`LanguageFrontEnd`], used by the registry and the pipeline.
pub trait DynFrontEnd: Send + Sync {
    /// Name and file extensions of the language.
    fn descriptor(&self) -> Language;

    /// Run a whole tokenize → parse → highlight pass over `text`.
    ///
    /// `on_stage` is called when each stage starts.
    fn highlight(
        &self,
        text: &str,
        on_stage: &mut dyn FnMut(Stage),
    ) -> Result<Vec<HighlightToken>, HighlightError>;
}

impl<F: LanguageFrontEnd> DynFrontEnd for F {
    fn descriptor(&self) -> Language {
        self.language()
    }

    fn highlight(
        &self,
        text: &str,
        on_stage: &mut dyn FnMut(Stage),
    ) -> Result<Vec<HighlightToken>, HighlightError> {
        on_stage(Stage::Tokenizing);
        let tokens = self.tokenize(text);

        on_stage(Stage::Parsing);
        let ast = self
            .build_ast(&tokens)
            .map_err(|err| HighlightError::new(Stage::Parsing, err))?;

        on_stage(Stage::Highlighting);
        Ok(self.build_highlighting(&ast, &tokens))
    }
}

/// Registry of language front-ends, constructed once at startup and passed by reference.
#[derive(Clone, Default)]
pub struct FrontEndRegistry {
    front_ends: Vec<Arc<dyn DynFrontEnd>>,
}

impl FrontEndRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a front-end. Earlier registrations win when extensions overlap.
    pub fn register<F: LanguageFrontEnd + 'static>(&mut self, front_end: F) -> &mut Self {
        self.front_ends.push(Arc::new(front_end));
        self
    }

    /// Register an already type-erased front-end.
    pub fn register_dyn(&mut self, front_end: Arc<dyn DynFrontEnd>) -> &mut Self {
        self.front_ends.push(front_end);
        self
    }

    /// Builder-style variant of [`FrontEndRegistry::register`].
    pub fn with<F: LanguageFrontEnd + 'static>(mut self, front_end: F) -> Self {
        self.register(front_end);
        self
    }

    /// Find the front-end handling `extension` (without the dot).
    pub fn for_extension(&self, extension: &str) -> Option<Arc<dyn DynFrontEnd>> {
        self.front_ends
            .iter()
            .find(|fe| fe.descriptor().matches_extension(extension))
            .cloned()
    }

    /// Find the front-end handling the extension of `path`.
    pub fn for_path(&self, path: &Path) -> Option<Arc<dyn DynFrontEnd>> {
        let extension = path.extension()?.to_str()?;
        self.for_extension(extension)
    }

    /// Descriptors of all registered languages, in registration order.
    pub fn languages(&self) -> Vec<Language> {
        self.front_ends.iter().map(|fe| fe.descriptor()).collect()
    }

    /// Number of registered front-ends.
    pub fn len(&self) -> usize {
        self.front_ends.len()
    }

    /// Returns `true` if no front-end is registered.
    pub fn is_empty(&self) -> bool {
        self.front_ends.is_empty()
    }
}

impl fmt::Debug for FrontEndRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrontEndRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
