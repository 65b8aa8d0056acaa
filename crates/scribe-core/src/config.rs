//! Configuration for the highlighting pipeline and the editor state.

use std::time::Duration;

/// Configuration for [`HighlightPipeline`](crate::HighlightPipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// How long the worker waits after a trigger before draining queued triggers and running
    /// a pass on the newest one.
    pub debounce: Duration,
    /// Name of the worker thread.
    pub thread_name: String,
    /// Publish "no highlighting" when the active file matches no registered front-end.
    pub clear_on_unsupported: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            thread_name: String::from("scribe-highlight"),
            clear_on_unsupported: true,
        }
    }
}

impl PipelineConfig {
    /// Create a config with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the worker thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Control whether unsupported files clear the published highlighter.
    pub fn with_clear_on_unsupported(mut self, clear: bool) -> Self {
        self.clear_on_unsupported = clear;
        self
    }
}

/// Configuration for [`EditorState`](crate::EditorState).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Text inserted by [`EditorState::insert_tab`](crate::EditorState::insert_tab).
    pub tab_text: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_text: String::from("    "),
        }
    }
}

impl EditorConfig {
    /// Use a literal tab character instead of spaces.
    pub fn with_hard_tabs(mut self) -> Self {
        self.tab_text = String::from("\t");
        self
    }

    /// Insert `width` spaces per tab.
    pub fn with_tab_width(mut self, width: usize) -> Self {
        self.tab_text = " ".repeat(width);
        self
    }
}
