//! Position Mapping
//!
//! Converts between linear character offsets and `(column, line)` code positions using the
//! rope's cached line metrics.
//!
//! Policy (one per operation, no silent clamping unless the name says so):
//!
//! - [`Rope::offset_of`] and [`Rope::position_of`] are strict and fail out of bounds.
//! - [`Rope::position_of_coerced`] clamps the offset into `[0, len]` first.
//! - [`Rope::clamp_position`] snaps any position onto the nearest valid one.

use crate::rope::{Rope, RopeError};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// A zero-based `(column, line)` address into a rope snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CodePosition {
    /// Column in characters within the line.
    pub x: usize,
    /// Line index.
    pub y: usize,
}

impl CodePosition {
    /// Create a position from a column and a line.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl Ord for CodePosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then_with(|| self.x.cmp(&other.x))
    }
}

impl PartialOrd for CodePosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CodePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.y + 1, self.x + 1)
    }
}

/// Errors produced by position conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// The column lies past the end of its line.
    #[error("column {} past end of line {} (length {line_length})", .position.x, .position.y)]
    ColumnOutOfBounds {
        /// The rejected position.
        position: CodePosition,
        /// Length of the addressed line.
        line_length: usize,
    },
    /// The line (or offset) is out of bounds.
    #[error(transparent)]
    Rope(#[from] RopeError),
}

impl Rope {
    /// Character offset addressed by `position`.
    pub fn offset_of(&self, position: CodePosition) -> Result<usize, PositionError> {
        let line_length = self.line_length(position.y)?;
        if position.x > line_length {
            return Err(PositionError::ColumnOutOfBounds {
                position,
                line_length,
            });
        }
        Ok(self.line_start(position.y)? + position.x)
    }

    /// Code position of character offset `index` (`index <= len()`).
    pub fn position_of(&self, index: usize) -> Result<CodePosition, PositionError> {
        let y = self.line_of_offset(index)?;
        let x = index - self.line_start(y)?;
        Ok(CodePosition { x, y })
    }

    /// Like [`Rope::position_of`], but clamps `index` into `[0, len()]` first.
    pub fn position_of_coerced(&self, index: isize) -> CodePosition {
        let index = usize::try_from(index).unwrap_or(0).min(self.len());
        // In range after clamping.
        self.position_of(index).unwrap_or_default()
    }

    /// Snap `position` onto the document: the line is clamped to the last line and the column to
    /// that line's length.
    pub fn clamp_position(&self, position: CodePosition) -> CodePosition {
        let y = position.y.min(self.line_count() - 1);
        let x = position.x.min(self.line_length(y).unwrap_or(0));
        CodePosition { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_position_of() {
        let rope = Rope::from("ABC\nDEF\nGHI");

        assert_eq!(rope.position_of(0).unwrap(), CodePosition::new(0, 0)); // A
        assert_eq!(rope.position_of(3).unwrap(), CodePosition::new(3, 0)); // \n
        assert_eq!(rope.position_of(4).unwrap(), CodePosition::new(0, 1)); // D
        assert_eq!(rope.position_of(11).unwrap(), CodePosition::new(3, 2)); // end
        assert!(rope.position_of(12).is_err());
    }

    #[test]
    fn test_offset_of_is_strict() {
        let rope = Rope::from("ABC\nDEF\nGHI");

        assert_eq!(rope.offset_of(CodePosition::new(2, 1)).unwrap(), 6);
        assert_eq!(rope.offset_of(CodePosition::new(3, 0)).unwrap(), 3);
        assert!(matches!(
            rope.offset_of(CodePosition::new(4, 0)),
            Err(PositionError::ColumnOutOfBounds { line_length: 3, .. })
        ));
        assert!(matches!(
            rope.offset_of(CodePosition::new(0, 3)),
            Err(PositionError::Rope(RopeError::LineOutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_coerced_and_clamped() {
        let rope = Rope::from("ab\ncdef");

        assert_eq!(rope.position_of_coerced(-1), CodePosition::new(0, 0));
        assert_eq!(rope.position_of_coerced(100), CodePosition::new(4, 1));
        assert_eq!(rope.clamp_position(CodePosition::new(9, 0)), CodePosition::new(2, 0));
        assert_eq!(rope.clamp_position(CodePosition::new(1, 9)), CodePosition::new(1, 1));
    }

    #[test]
    fn test_ordering_is_line_major() {
        assert!(CodePosition::new(9, 0) < CodePosition::new(0, 1));
        assert!(CodePosition::new(1, 2) < CodePosition::new(2, 2));
        assert_eq!(CodePosition::new(1, 0).to_string(), "1:2");
    }
}
