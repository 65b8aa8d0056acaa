//! Document persistence and versioning.
//!
//! A [`Document`] owns the current rope snapshot of one file, replaces it on every edit and
//! bumps a monotonic version. Loading reads the whole file into an initial rope; saving streams
//! the rope's chunks back to disk.

use crate::rope::{Rope, RopeError};
use log::{info, warn};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced by document operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Reading or writing the file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// `save()` was called on a document that has never had a path.
    #[error("document has no file path")]
    NoPath,
    /// An edit was out of bounds.
    #[error(transparent)]
    Rope(#[from] RopeError),
}

/// An immutable view of a document at one version, safe to hand to another thread.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Text at this version.
    pub rope: Rope,
    /// Document version the text belongs to.
    pub version: u64,
    /// File the document is associated with, if any.
    pub path: Option<PathBuf>,
}

impl Snapshot {
    /// Extension of the snapshot's file, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.path.as_deref()?.extension()?.to_str()
    }
}

/// The text of one file plus its version and persistence state.
#[derive(Debug, Clone, Default)]
pub struct Document {
    path: Option<PathBuf>,
    rope: Rope,
    version: u64,
    modified: bool,
}

impl Document {
    /// Create an empty, unnamed document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unnamed document holding `text`.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from(text),
            ..Self::default()
        }
    }

    /// Load the whole content of `path` into a new document.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rope = Rope::from(text);
        info!(
            "Loaded {} ({} lines, {} chars)",
            path.display(),
            rope.line_count(),
            rope.len()
        );
        Ok(Self {
            path: Some(path.to_path_buf()),
            rope,
            version: 0,
            modified: false,
        })
    }

    /// Write the document to its current path.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let path = self.path.clone().ok_or(DocumentError::NoPath)?;
        self.write_to(&path)
    }

    /// Write the document to `path` (created if missing) and make it the document's path.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), DocumentError> {
        let path = path.into();
        self.write_to(&path)?;
        self.path = Some(path);
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<(), DocumentError> {
        let io_err = |source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        };

        let result = File::create(path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            for chunk in self.rope.chunks() {
                writer.write_all(chunk.as_bytes())?;
            }
            writer.flush()
        });

        match result {
            Ok(()) => {
                info!("Saved {} ({} bytes)", path.display(), self.rope.byte_len());
                self.modified = false;
                Ok(())
            }
            Err(err) => {
                warn!("Could not write to {}: {err}", path.display());
                Err(io_err(err))
            }
        }
    }

    /// Current text snapshot.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Full text of the document.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Version number, incremented after each modification.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the document changed since it was loaded or last saved.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// File the document is associated with.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Associate the document with another file without writing it.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Extension of the document's file, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.path.as_deref()?.extension()?.to_str()
    }

    /// Capture the current version for a background reader.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rope: self.rope.clone(),
            version: self.version,
            path: self.path.clone(),
        }
    }

    /// Replace the whole text with `rope`. A no-op if `rope` is the current snapshot.
    pub fn set_rope(&mut self, rope: Rope) {
        if rope.ptr_eq(&self.rope) {
            return;
        }
        self.rope = rope;
        self.version += 1;
        self.modified = true;
    }

    /// Insert `text` at character offset `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), DocumentError> {
        let rope = self.rope.insert(offset, text)?;
        self.set_rope(rope);
        Ok(())
    }

    /// Delete the character range `[start, end)`.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<(), DocumentError> {
        let rope = self.rope.delete(start, end)?;
        self.set_rope(rope);
        Ok(())
    }

    /// Replace the character range `[start, end)` with `text`.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<(), DocumentError> {
        let rope = self.rope.delete(start, end)?.insert(start, text)?;
        self.set_rope(rope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_bump_version() {
        let mut doc = Document::from_text("hello");
        assert_eq!(doc.version(), 0);
        assert!(!doc.is_modified());

        doc.insert(5, " world").unwrap();
        doc.delete(0, 1).unwrap();
        assert_eq!(doc.version(), 2);
        assert!(doc.is_modified());
        assert_eq!(doc.text(), "ello world");

        // Empty edits keep the snapshot and the version.
        doc.insert(0, "").unwrap();
        doc.delete(3, 3).unwrap();
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_failed_edit_keeps_document() {
        let mut doc = Document::from_text("abc");
        assert!(matches!(doc.insert(10, "x"), Err(DocumentError::Rope(_))));
        assert_eq!(doc.version(), 0);
        assert_eq!(doc.text(), "abc");
    }

    #[test]
    fn test_replace() {
        let mut doc = Document::from_text("var x = 1;");
        doc.replace(8, 9, "42").unwrap();
        assert_eq!(doc.text(), "var x = 42;");
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_save_without_path() {
        let mut doc = Document::from_text("abc");
        assert!(matches!(doc.save(), Err(DocumentError::NoPath)));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut doc = Document::from_text("abc");
        doc.set_path("main.as");
        let snapshot = doc.snapshot();
        doc.insert(3, "def").unwrap();

        assert_eq!(snapshot.rope.to_string(), "abc");
        assert_eq!(snapshot.version, 0);
        assert_eq!(snapshot.extension(), Some("as"));
        assert_eq!(doc.version(), 1);
    }
}
