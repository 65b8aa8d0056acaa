//! Editor state: cursor, selection and text input over a [`Document`].
//!
//! Positions are always kept inside the current snapshot: every edit moves the cursor
//! explicitly, and pointer input goes through [`Rope::clamp_position`]. Horizontal movement and
//! single-character deletion step over whole grapheme clusters.

use crate::config::EditorConfig;
use crate::document::{Document, DocumentError};
use crate::position::CodePosition;
use crate::rope::Rope;
use std::path::PathBuf;
use unicode_segmentation::UnicodeSegmentation;

/// Cursor location plus the column vertical movement tries to return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    /// Where the cursor is.
    pub position: CodePosition,
    /// Column remembered across up/down moves over shorter lines.
    pub wanted_x: usize,
}

impl CursorPosition {
    /// A cursor at `position` that wants to stay in its own column.
    pub const fn at(position: CodePosition) -> Self {
        Self {
            position,
            wanted_x: position.x,
        }
    }
}

/// Char offsets of the grapheme boundaries of `line`, excluding `0`.
fn grapheme_ends(line: &str) -> impl Iterator<Item = usize> + '_ {
    let mut offset = 0;
    line.graphemes(true).map(move |grapheme| {
        offset += grapheme.chars().count();
        offset
    })
}

/// The document being edited plus cursor and selection.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    document: Document,
    cursor: CursorPosition,
    anchor: Option<CodePosition>,
    config: EditorConfig,
}

impl EditorState {
    /// Edit `document` with the cursor at the start.
    pub fn new(document: Document, config: EditorConfig) -> Self {
        Self {
            document,
            cursor: CursorPosition::default(),
            anchor: None,
            config,
        }
    }

    /// Edit an unnamed document holding `text`.
    pub fn from_text(text: &str) -> Self {
        Self::new(Document::from_text(text), EditorConfig::default())
    }

    /// The edited document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current text snapshot.
    pub fn rope(&self) -> &Rope {
        self.document.rope()
    }

    /// Switch to another document. Resets cursor and selection.
    pub fn set_document(&mut self, document: Document) {
        self.document = document;
        self.cursor = CursorPosition::default();
        self.anchor = None;
    }

    /// Write the document to its path.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        self.document.save()
    }

    /// Write the document to `path` and make it the document's path.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), DocumentError> {
        self.document.save_as(path)
    }

    /// Editor settings.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current cursor.
    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    /// Character offset of the cursor.
    pub fn cursor_offset(&self) -> usize {
        self.offset(self.cursor.position)
    }

    fn offset(&self, position: CodePosition) -> usize {
        let rope = self.rope();
        let position = rope.clamp_position(position);
        rope.line_start(position.y).unwrap_or(rope.len()) + position.x
    }

    fn line_length(&self, line: usize) -> usize {
        self.rope().line_length(line).unwrap_or(0)
    }

    fn move_to(&mut self, position: CodePosition) {
        self.cursor = CursorPosition::at(position);
    }

    /// The selected range as `(start, end)` in document order, if it is not empty.
    pub fn selection(&self) -> Option<(CodePosition, CodePosition)> {
        let anchor = self.anchor?;
        let cursor = self.cursor.position;
        match anchor.cmp(&cursor) {
            std::cmp::Ordering::Less => Some((anchor, cursor)),
            std::cmp::Ordering::Greater => Some((cursor, anchor)),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The selected range as character offsets.
    pub fn selection_range(&self) -> Option<(usize, usize)> {
        let (start, end) = self.selection()?;
        Some((self.offset(start), self.offset(end)))
    }

    /// Text of the selection.
    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection_range()?;
        self.rope().text_in(start, end).ok()
    }

    /// Drop the selection without touching the text.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Select the whole document.
    pub fn select_all(&mut self) {
        let rope = self.rope();
        let last = rope.line_count() - 1;
        let end = CodePosition::new(self.line_length(last), last);
        self.anchor = Some(CodePosition::default());
        self.move_to(end);
    }

    /// Delete the selected text and put the cursor at its start.
    ///
    /// Returns `false` if nothing was selected.
    pub fn delete_selection(&mut self) -> Result<bool, DocumentError> {
        let Some((start, end)) = self.selection() else {
            self.anchor = None;
            return Ok(false);
        };
        let (from, to) = (self.offset(start), self.offset(end));
        self.document.delete(from, to)?;
        self.anchor = None;
        self.move_to(start);
        Ok(true)
    }

    /// Remove the selection and return its text (clipboard transport is up to the caller).
    pub fn cut(&mut self) -> Result<Option<String>, DocumentError> {
        let text = self.selected_text();
        self.delete_selection()?;
        Ok(text)
    }

    /// Replace the selection (if any) with `text` and place the cursor after it.
    pub fn paste(&mut self, text: &str) -> Result<(), DocumentError> {
        self.insert_text(text)
    }

    /// Replace the selection (if any) with `text` and place the cursor after it.
    pub fn insert_text(&mut self, text: &str) -> Result<(), DocumentError> {
        self.delete_selection()?;
        if text.is_empty() {
            return Ok(());
        }

        let offset = self.cursor_offset();
        self.document.insert(offset, text)?;
        let end = offset + text.chars().count();
        let y = self.rope().line_of_offset(end)?;
        let x = end - self.rope().line_start(y)?;
        self.move_to(CodePosition::new(x, y));
        Ok(())
    }

    /// Type one character.
    pub fn insert_char(&mut self, ch: char) -> Result<(), DocumentError> {
        let mut buf = [0; 4];
        self.insert_text(ch.encode_utf8(&mut buf))
    }

    /// Split the line at the cursor.
    pub fn insert_newline(&mut self) -> Result<(), DocumentError> {
        self.insert_text("\n")
    }

    /// Insert the configured tab text.
    pub fn insert_tab(&mut self) -> Result<(), DocumentError> {
        let tab = self.config.tab_text.clone();
        self.insert_text(&tab)
    }

    /// Delete the selection, or the grapheme before the cursor (joining lines at column 0).
    pub fn backspace(&mut self) -> Result<(), DocumentError> {
        if self.delete_selection()? {
            return Ok(());
        }
        let Some(target) = self.previous_stop(self.cursor.position) else {
            self.cursor.wanted_x = 0;
            return Ok(());
        };
        let (from, to) = (self.offset(target), self.cursor_offset());
        self.document.delete(from, to)?;
        self.move_to(target);
        Ok(())
    }

    /// Delete the selection, or the grapheme after the cursor (joining lines at line end).
    pub fn delete_forward(&mut self) -> Result<(), DocumentError> {
        if self.delete_selection()? {
            return Ok(());
        }
        if let Some(target) = self.next_stop(self.cursor.position) {
            let (from, to) = (self.cursor_offset(), self.offset(target));
            self.document.delete(from, to)?;
        }
        self.cursor.wanted_x = self.cursor.position.x;
        Ok(())
    }

    /// Position one grapheme before `position`, crossing to the previous line end.
    fn previous_stop(&self, position: CodePosition) -> Option<CodePosition> {
        if position.x == 0 {
            let y = position.y.checked_sub(1)?;
            return Some(CodePosition::new(self.line_length(y), y));
        }
        let line = self.rope().line_text(position.y).unwrap_or_default();
        let x = std::iter::once(0)
            .chain(grapheme_ends(&line))
            .take_while(|&end| end < position.x)
            .last()
            .unwrap_or(0);
        Some(CodePosition::new(x, position.y))
    }

    /// Position one grapheme after `position`, crossing to the next line start.
    fn next_stop(&self, position: CodePosition) -> Option<CodePosition> {
        if position.x >= self.line_length(position.y) {
            let y = position.y + 1;
            return (y < self.rope().line_count()).then(|| CodePosition::new(0, y));
        }
        let line = self.rope().line_text(position.y).unwrap_or_default();
        let x = grapheme_ends(&line)
            .find(|&end| end > position.x)
            .unwrap_or(position.x + 1);
        Some(CodePosition::new(x, position.y))
    }

    /// Start or continue a selection when extending, otherwise drop it.
    ///
    /// Returns the dropped selection so arrow keys can collapse onto one of its ends.
    fn prepare_move(&mut self, extend: bool) -> Option<(CodePosition, CodePosition)> {
        if extend {
            self.anchor.get_or_insert(self.cursor.position);
            None
        } else {
            let selection = self.selection();
            self.anchor = None;
            selection
        }
    }

    /// Move one grapheme left. Without `extend`, a selection collapses to its start.
    pub fn move_left(&mut self, extend: bool) {
        if let Some((start, _)) = self.prepare_move(extend) {
            self.move_to(start);
            return;
        }
        let target = self
            .previous_stop(self.cursor.position)
            .unwrap_or(self.cursor.position);
        self.move_to(target);
    }

    /// Move one grapheme right. Without `extend`, a selection collapses to its end.
    pub fn move_right(&mut self, extend: bool) {
        if let Some((_, end)) = self.prepare_move(extend) {
            self.move_to(end);
            return;
        }
        let target = self
            .next_stop(self.cursor.position)
            .unwrap_or(self.cursor.position);
        self.move_to(target);
    }

    /// Move one line up, keeping the wanted column. On the first line, go to `(0, 0)`.
    pub fn move_up(&mut self, extend: bool) {
        let cursor = match self.prepare_move(extend) {
            Some((start, _)) => CursorPosition::at(start),
            None => self.cursor,
        };
        self.cursor = match cursor.position.y.checked_sub(1) {
            Some(y) => CursorPosition {
                position: CodePosition::new(cursor.wanted_x.min(self.line_length(y)), y),
                wanted_x: cursor.wanted_x,
            },
            None => CursorPosition::default(),
        };
    }

    /// Move one line down, keeping the wanted column. On the last line, go to its end.
    pub fn move_down(&mut self, extend: bool) {
        let cursor = match self.prepare_move(extend) {
            Some((_, end)) => CursorPosition::at(end),
            None => self.cursor,
        };
        let y = cursor.position.y + 1;
        self.cursor = if y < self.rope().line_count() {
            CursorPosition {
                position: CodePosition::new(cursor.wanted_x.min(self.line_length(y)), y),
                wanted_x: cursor.wanted_x,
            }
        } else {
            let y = cursor.position.y;
            CursorPosition::at(CodePosition::new(self.line_length(y), y))
        };
    }

    /// Put the cursor at `position` (clamped into the document), e.g. from a click or drag.
    pub fn set_cursor(&mut self, position: CodePosition, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.cursor.position);
        } else {
            self.anchor = None;
        }
        let position = self.rope().clamp_position(position);
        self.move_to(position);
    }
}
