//! The AScript front-end as seen by the editor core.

use crate::ast::Program;
use crate::error::ParseError;
use crate::highlighting::generate_highlighting;
use crate::lexer::Lexer;
use crate::parser::parse;
use crate::token::Token;
use scribe_lang::{FrontEndRegistry, HighlightToken, Language, LanguageFrontEnd};

/// Name and file extensions of AScript.
pub const LANGUAGE: Language = Language {
    name: "AScript",
    file_extensions: &["as"],
};

/// Lexer, parser and highlighting visitor for `.as` files.
#[derive(Debug, Clone)]
pub struct AScriptFrontEnd {
    lexer: Lexer,
}

impl AScriptFrontEnd {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            lexer: Lexer::new()?,
        })
    }

    /// Tokenize and parse `text` in one go.
    pub fn parse(&self, text: &str) -> Result<Program, ParseError> {
        parse(&self.lexer.tokenize(text))
    }

    /// Add AScript to `registry`.
    pub fn register(registry: &mut FrontEndRegistry) -> Result<(), regex::Error> {
        registry.register(Self::new()?);
        Ok(())
    }
}

impl LanguageFrontEnd for AScriptFrontEnd {
    type Token = Token;
    type Ast = Program;
    type Error = ParseError;

    fn language(&self) -> Language {
        LANGUAGE
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.lexer.tokenize(text)
    }

    fn build_ast(&self, tokens: &[Token]) -> Result<Program, ParseError> {
        parse(tokens)
    }

    fn build_highlighting(&self, ast: &Program, tokens: &[Token]) -> Vec<HighlightToken> {
        generate_highlighting(ast, tokens)
    }
}
