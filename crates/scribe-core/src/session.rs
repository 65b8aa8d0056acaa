//! Editor session: one [`EditorState`] wired to a [`HighlightPipeline`].
//!
//! Every change that produces a new snapshot (an edit or a file switch) schedules a highlighting
//! pass. The renderer reads text through [`EditorSession::get_lines`] and styles through
//! [`EditorSession::highlight_range`]; keeping both requests on the same viewport is its job.

use crate::document::{Document, DocumentError};
use crate::editor::EditorState;
use crate::highlighter::{Highlighter, StyledSpan};
use crate::pipeline::HighlightPipeline;
use std::path::Path;
use std::sync::Arc;

/// Editor state plus the highlighting pipeline that follows it.
pub struct EditorSession {
    editor: EditorState,
    pipeline: HighlightPipeline,
}

impl EditorSession {
    /// Bind `editor` to `pipeline` and schedule the first pass.
    pub fn new(editor: EditorState, pipeline: HighlightPipeline) -> Self {
        let session = Self { editor, pipeline };
        session.refresh();
        session
    }

    /// Schedule a pass for the current snapshot. Returns the request version, or `None` if the
    /// snapshot was already scheduled.
    pub fn refresh(&self) -> Option<u64> {
        self.pipeline.trigger(self.editor.document().snapshot())
    }

    /// Apply `f` to the editor state and reschedule highlighting if the snapshot changed.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut EditorState) -> R) -> R {
        let result = f(&mut self.editor);
        self.refresh();
        result
    }

    /// Load `path` and switch to it.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let document = Document::open(path)?;
        self.switch_to(document);
        Ok(())
    }

    /// Switch to `document`.
    pub fn switch_to(&mut self, document: Document) {
        self.editor.set_document(document);
        self.refresh();
    }

    /// Write the document to its path.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        self.editor.save()
    }

    /// The editor state.
    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// The highlighting pipeline.
    pub fn pipeline(&self) -> &HighlightPipeline {
        &self.pipeline
    }

    /// The published highlighter, if any.
    pub fn highlighter(&self) -> Option<Arc<Highlighter>> {
        self.pipeline.current()
    }

    /// Text of lines `[from, to)`.
    pub fn get_lines(&self, from: usize, to: usize) -> String {
        self.editor.rope().get_lines(from, to)
    }

    /// Styles intersecting `[start, end)`.
    pub fn highlight_range(&self, start: usize, end: usize) -> Vec<StyledSpan> {
        self.pipeline.highlight_range(start, end)
    }

    /// Length in characters of the longest line.
    pub fn max_line_length(&self) -> usize {
        self.editor.rope().max_line_length()
    }

    /// Number of lines in the document.
    pub fn line_count(&self) -> usize {
        self.editor.rope().line_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use scribe_lang::FrontEndRegistry;

    #[test]
    fn test_edits_reschedule_only_on_change() {
        let pipeline = HighlightPipeline::synchronous(
            Arc::new(FrontEndRegistry::new()),
            PipelineConfig::default(),
        );
        let mut session = EditorSession::new(EditorState::from_text("ab\ncdef"), pipeline);
        assert_eq!(session.pipeline().latest_version(), 1);

        session.edit(|editor| editor.move_right(false));
        assert_eq!(session.pipeline().latest_version(), 1);

        session.edit(|editor| editor.insert_char('x')).unwrap();
        assert_eq!(session.pipeline().latest_version(), 2);

        assert_eq!(session.get_lines(0, 1), "axb\n");
        assert_eq!(session.max_line_length(), 4);
        assert_eq!(session.line_count(), 2);
        assert!(session.highlight_range(0, 10).is_empty());
    }
}
