//! Parse errors.

use crate::ast::Location;
use crate::token::TokenKind;
use std::fmt;
use thiserror::Error;

/// Grammar production the parser needed and could not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    Expression,
    Statement,
    ParameterType,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Production::Expression => "expression",
            Production::Statement => "statement",
            Production::ParameterType => "parameter type (`bool`, `string` or `number`)",
        })
    }
}

fn describe_found(found: &Option<TokenKind>) -> &'static str {
    found.map_or("end of input", TokenKind::describe)
}

/// Why a token sequence is not a valid program. Offsets are character offsets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unrecognized input at offset {offset}")]
    Lexical { offset: usize },

    #[error("expected {expected}, found {} at offset {offset}", describe_found(.found))]
    ExpectedToken {
        expected: TokenKind,
        /// `None` at end of input.
        found: Option<TokenKind>,
        offset: usize,
    },

    #[error("expected {expected} at offset {offset}")]
    ExpectedExpression { expected: Production, offset: usize },

    /// An expression statement that is neither an assignment nor a call.
    #[error("unexpected expression at offset {offset} ({location})")]
    UnexpectedExpression { location: Location, offset: usize },

    /// Blocks or expressions nested deeper than the parser accepts.
    #[error("nesting deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { limit: usize, offset: usize },
}

impl ParseError {
    /// Character offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lexical { offset }
            | ParseError::ExpectedToken { offset, .. }
            | ParseError::ExpectedExpression { offset, .. }
            | ParseError::UnexpectedExpression { offset, .. }
            | ParseError::NestingTooDeep { offset, .. } => *offset,
        }
    }
}
