//! Text Buffer
//!
//! An immutable rope: a height-balanced binary tree of UTF-8 chunks with cached metrics.
//!
//! # Overview
//!
//! Every edit returns a new [`Rope`] that shares all untouched subtrees with the old one, so a
//! snapshot handed to a background highlighting pass stays valid no matter how the document is
//! edited afterwards. Offsets are measured in characters (Unicode scalar values).
//!
//! Each node caches its character/byte length, newline count and the lengths of its first, last
//! and longest line. That gives O(1) `len`, `line_count` and `max_line_length`, and O(log n)
//! insert, delete, slice and line lookups.
//!
//! # Example
//!
//! ```rust
//! use scribe_core::Rope;
//!
//! let rope = Rope::from("fn main\n{\n}");
//! let rope = rope.insert(7, "()").unwrap();
//!
//! assert_eq!(rope.to_string(), "fn main()\n{\n}");
//! assert_eq!(rope.line_count(), 3);
//! assert_eq!(rope.line_start(1).unwrap(), 10);
//! assert_eq!(rope.max_line_length(), 9);
//! ```

use memchr::memchr_iter;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Maximum size of a leaf chunk in bytes.
const MAX_LEAF_BYTES: usize = 1024;

/// Errors produced by rope operations (bounds violations).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RopeError {
    /// A character offset outside `[0, len]`.
    #[error("offset {offset} out of bounds (length {len})")]
    OffsetOutOfBounds {
        /// The rejected offset.
        offset: usize,
        /// Rope length in characters.
        len: usize,
    },
    /// A range violating `start <= end <= len`.
    #[error("invalid range {start}..{end} (length {len})")]
    InvalidRange {
        /// Inclusive start offset.
        start: usize,
        /// Exclusive end offset.
        end: usize,
        /// Rope length in characters.
        len: usize,
    },
    /// A line index past the end of the document.
    #[error("line {line} out of bounds (line count {line_count})")]
    LineOutOfBounds {
        /// The rejected line.
        line: usize,
        /// Number of lines in the rope.
        line_count: usize,
    },
}

/// Cached metrics of a chunk or subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextMetrics {
    /// Length in characters.
    pub chars: usize,
    /// Length in bytes.
    pub bytes: usize,
    /// Number of `\n` characters.
    pub newlines: usize,
    /// Characters before the first `\n` (or `chars` if there is none).
    pub first_line: usize,
    /// Characters after the last `\n` (or `chars` if there is none).
    pub last_line: usize,
    /// Length of the longest line, newlines excluded.
    pub longest_line: usize,
}

impl TextMetrics {
    /// Measure a single chunk of text.
    pub fn of(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut newlines = 0;
        let mut first_line = None;
        let mut longest_line = 0;
        let mut chars = 0;
        let mut line_start = 0;

        for nl in memchr_iter(b'\n', bytes) {
            let line_chars = text[line_start..nl].chars().count();
            first_line.get_or_insert(line_chars);
            longest_line = longest_line.max(line_chars);
            chars += line_chars + 1;
            newlines += 1;
            line_start = nl + 1;
        }

        let last_line = text[line_start..].chars().count();
        chars += last_line;

        Self {
            chars,
            bytes: bytes.len(),
            newlines,
            first_line: first_line.unwrap_or(last_line),
            last_line,
            longest_line: longest_line.max(last_line),
        }
    }

    /// Metrics of `left` immediately followed by `right`.
    pub fn concat(left: &Self, right: &Self) -> Self {
        Self {
            chars: left.chars + right.chars,
            bytes: left.bytes + right.bytes,
            newlines: left.newlines + right.newlines,
            first_line: if left.newlines == 0 {
                left.chars + right.first_line
            } else {
                left.first_line
            },
            last_line: if right.newlines == 0 {
                left.last_line + right.chars
            } else {
                right.last_line
            },
            longest_line: left
                .longest_line
                .max(right.longest_line)
                .max(left.last_line + right.first_line),
        }
    }
}

#[derive(Debug)]
enum Node {
    Leaf {
        text: String,
        metrics: TextMetrics,
    },
    Branch {
        left: Arc<Node>,
        right: Arc<Node>,
        metrics: TextMetrics,
        height: usize,
    },
}

impl Node {
    fn leaf(text: &str) -> Arc<Node> {
        Arc::new(Node::Leaf {
            text: text.to_string(),
            metrics: TextMetrics::of(text),
        })
    }

    fn empty() -> Arc<Node> {
        Arc::new(Node::Leaf {
            text: String::new(),
            metrics: TextMetrics::default(),
        })
    }

    fn branch(left: Arc<Node>, right: Arc<Node>) -> Arc<Node> {
        let metrics = TextMetrics::concat(left.metrics(), right.metrics());
        let height = left.height().max(right.height()) + 1;
        Arc::new(Node::Branch {
            left,
            right,
            metrics,
            height,
        })
    }

    fn metrics(&self) -> &TextMetrics {
        match self {
            Node::Leaf { metrics, .. } | Node::Branch { metrics, .. } => metrics,
        }
    }

    fn height(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Branch { height, .. } => *height,
        }
    }

    fn len(&self) -> usize {
        self.metrics().chars
    }

    fn newlines(&self) -> usize {
        self.metrics().newlines
    }
}

/// Build a perfectly balanced tree over `leaves`.
fn build_balanced(leaves: &[Arc<Node>]) -> Arc<Node> {
    match leaves {
        [] => Node::empty(),
        [leaf] => leaf.clone(),
        _ => {
            let mid = leaves.len() / 2;
            Node::branch(build_balanced(&leaves[..mid]), build_balanced(&leaves[mid..]))
        }
    }
}

fn chunk_leaves(text: &str) -> Vec<Arc<Node>> {
    let mut leaves = Vec::with_capacity(text.len() / MAX_LEAF_BYTES + 1);
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = rest.len().min(MAX_LEAF_BYTES);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        leaves.push(Node::leaf(&rest[..end]));
        rest = &rest[end..];
    }
    leaves
}

/// `branch(a, branch(b, c))` -> `branch(branch(a, b), c)`
fn rotate_left(node: Arc<Node>) -> Arc<Node> {
    if let Node::Branch { left, right, .. } = &*node {
        if let Node::Branch {
            left: right_left,
            right: right_right,
            ..
        } = &**right
        {
            return Node::branch(
                Node::branch(left.clone(), right_left.clone()),
                right_right.clone(),
            );
        }
    }
    node
}

/// `branch(branch(a, b), c)` -> `branch(a, branch(b, c))`
fn rotate_right(node: Arc<Node>) -> Arc<Node> {
    if let Node::Branch { left, right, .. } = &*node {
        if let Node::Branch {
            left: left_left,
            right: left_right,
            ..
        } = &**left
        {
            return Node::branch(
                left_left.clone(),
                Node::branch(left_right.clone(), right.clone()),
            );
        }
    }
    node
}

/// AVL join where `left` is taller than `right` by more than one level.
fn join_right(left: &Arc<Node>, right: Arc<Node>) -> Arc<Node> {
    let Node::Branch {
        left: ll, right: lr, ..
    } = &**left
    else {
        return Node::branch(left.clone(), right);
    };

    if lr.height() <= right.height() + 1 {
        let t = Node::branch(lr.clone(), right);
        if t.height() <= ll.height() + 1 {
            Node::branch(ll.clone(), t)
        } else {
            rotate_left(Node::branch(ll.clone(), rotate_right(t)))
        }
    } else {
        let t = join_right(lr, right);
        if t.height() <= ll.height() + 1 {
            Node::branch(ll.clone(), t)
        } else {
            rotate_left(Node::branch(ll.clone(), t))
        }
    }
}

/// Mirror image of [`join_right`].
fn join_left(left: Arc<Node>, right: &Arc<Node>) -> Arc<Node> {
    let Node::Branch {
        left: rl, right: rr, ..
    } = &**right
    else {
        return Node::branch(left, right.clone());
    };

    if rl.height() <= left.height() + 1 {
        let t = Node::branch(left, rl.clone());
        if t.height() <= rr.height() + 1 {
            Node::branch(t, rr.clone())
        } else {
            rotate_right(Node::branch(rotate_left(t), rr.clone()))
        }
    } else {
        let t = join_left(left, rl);
        if t.height() <= rr.height() + 1 {
            Node::branch(t, rr.clone())
        } else {
            rotate_right(Node::branch(t, rr.clone()))
        }
    }
}

/// Concatenate two trees, keeping the result height-balanced.
fn join(left: Arc<Node>, right: Arc<Node>) -> Arc<Node> {
    if left.len() == 0 {
        return right;
    }
    if right.len() == 0 {
        return left;
    }

    if let (Node::Leaf { text: a, .. }, Node::Leaf { text: b, .. }) = (&*left, &*right) {
        if a.len() + b.len() <= MAX_LEAF_BYTES {
            let mut text = String::with_capacity(a.len() + b.len());
            text.push_str(a);
            text.push_str(b);
            return Node::leaf(&text);
        }
    }

    let (hl, hr) = (left.height(), right.height());
    if hl > hr + 1 {
        join_right(&left, right)
    } else if hr > hl + 1 {
        join_left(left, &right)
    } else {
        Node::branch(left, right)
    }
}

fn char_to_byte(text: &str, char_idx: usize) -> usize {
    if text.len() == char_idx || text.is_ascii() {
        return char_idx.min(text.len());
    }
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Split `node` into `[0, at)` and `[at, len)`.
fn split(node: &Arc<Node>, at: usize) -> (Arc<Node>, Arc<Node>) {
    if at == 0 {
        return (Node::empty(), node.clone());
    }
    if at >= node.len() {
        return (node.clone(), Node::empty());
    }

    match &**node {
        Node::Leaf { text, .. } => {
            let byte = char_to_byte(text, at);
            (Node::leaf(&text[..byte]), Node::leaf(&text[byte..]))
        }
        Node::Branch { left, right, .. } => {
            let left_len = left.len();
            if at < left_len {
                let (a, b) = split(left, at);
                (a, join(b, right.clone()))
            } else if at == left_len {
                (left.clone(), right.clone())
            } else {
                let (a, b) = split(right, at - left_len);
                (join(left.clone(), a), b)
            }
        }
    }
}

fn newlines_before(node: &Node, offset: usize) -> usize {
    match node {
        Node::Leaf { text, .. } => {
            let byte = char_to_byte(text, offset);
            memchr_iter(b'\n', &text.as_bytes()[..byte]).count()
        }
        Node::Branch { left, right, .. } => {
            let left_len = left.len();
            if offset <= left_len {
                newlines_before(left, offset)
            } else {
                left.newlines() + newlines_before(right, offset - left_len)
            }
        }
    }
}

/// Character offset just past the `n`-th newline (1-based) of `node`.
fn offset_after_newline(node: &Node, n: usize) -> usize {
    match node {
        Node::Leaf { text, .. } => match memchr_iter(b'\n', text.as_bytes()).nth(n - 1) {
            Some(byte) => text[..=byte].chars().count(),
            None => node.len(),
        },
        Node::Branch { left, right, .. } => {
            if n <= left.newlines() {
                offset_after_newline(left, n)
            } else {
                left.len() + offset_after_newline(right, n - left.newlines())
            }
        }
    }
}

fn push_range(node: &Node, start: usize, end: usize, out: &mut String) {
    if start >= end {
        return;
    }
    match node {
        Node::Leaf { text, .. } => {
            let from = char_to_byte(text, start);
            let to = char_to_byte(text, end);
            out.push_str(&text[from..to]);
        }
        Node::Branch { left, right, .. } => {
            let left_len = left.len();
            if start < left_len {
                push_range(left, start, end.min(left_len), out);
            }
            if end > left_len {
                push_range(right, start.saturating_sub(left_len), end - left_len, out);
            }
        }
    }
}

/// An immutable, cheaply clonable text snapshot.
#[derive(Clone)]
pub struct Rope {
    root: Arc<Node>,
}

impl Rope {
    /// Create an empty rope.
    pub fn new() -> Self {
        Self {
            root: Node::empty(),
        }
    }

    fn from_root(root: Arc<Node>) -> Self {
        Self { root }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Returns `true` if the rope holds no text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length in bytes of the UTF-8 content.
    pub fn byte_len(&self) -> usize {
        self.root.metrics().bytes
    }

    /// Number of `\n` characters.
    pub fn newlines(&self) -> usize {
        self.root.newlines()
    }

    /// Number of logical lines (`newlines() + 1`; an empty rope has one empty line).
    pub fn line_count(&self) -> usize {
        self.newlines() + 1
    }

    /// Length in characters of the longest line.
    pub fn max_line_length(&self) -> usize {
        self.root.metrics().longest_line
    }

    /// Aggregated metrics of the whole rope.
    pub fn metrics(&self) -> TextMetrics {
        *self.root.metrics()
    }

    /// Returns `true` if both ropes are the same snapshot (not merely equal text).
    pub fn ptr_eq(&self, other: &Rope) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    fn check_offset(&self, offset: usize) -> Result<(), RopeError> {
        if offset > self.len() {
            return Err(RopeError::OffsetOutOfBounds {
                offset,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), RopeError> {
        if start > end || end > self.len() {
            return Err(RopeError::InvalidRange {
                start,
                end,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Return a new rope with `text` inserted at `offset`.
    pub fn insert(&self, offset: usize, text: &str) -> Result<Rope, RopeError> {
        self.check_offset(offset)?;
        if text.is_empty() {
            return Ok(self.clone());
        }

        let (before, after) = split(&self.root, offset);
        let middle = Rope::from(text).root;
        Ok(Self::from_root(join(join(before, middle), after)))
    }

    /// Return a new rope with `[start, end)` removed.
    pub fn delete(&self, start: usize, end: usize) -> Result<Rope, RopeError> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(self.clone());
        }

        let (before, rest) = split(&self.root, start);
        let (_, after) = split(&rest, end - start);
        Ok(Self::from_root(join(before, after)))
    }

    /// Return the subrange `[start, end)` as a new rope.
    pub fn slice(&self, start: usize, end: usize) -> Result<Rope, RopeError> {
        self.check_range(start, end)?;
        let (_, rest) = split(&self.root, start);
        let (middle, _) = split(&rest, end - start);
        Ok(Self::from_root(middle))
    }

    /// Copy `[start, end)` into a `String` without building an intermediate rope.
    pub fn text_in(&self, start: usize, end: usize) -> Result<String, RopeError> {
        self.check_range(start, end)?;
        let mut out = String::new();
        push_range(&self.root, start, end, &mut out);
        Ok(out)
    }

    /// Character offset of the first character of line `line`.
    ///
    /// `line == line_count()` is clamped to `len()`; anything beyond fails.
    pub fn line_start(&self, line: usize) -> Result<usize, RopeError> {
        let line_count = self.line_count();
        if line == 0 {
            return Ok(0);
        }
        if line == line_count {
            return Ok(self.len());
        }
        if line > line_count {
            return Err(RopeError::LineOutOfBounds { line, line_count });
        }
        Ok(offset_after_newline(&self.root, line))
    }

    /// Number of characters in line `line`, excluding its terminating newline.
    pub fn line_length(&self, line: usize) -> Result<usize, RopeError> {
        let line_count = self.line_count();
        if line >= line_count {
            return Err(RopeError::LineOutOfBounds { line, line_count });
        }
        let start = self.line_start(line)?;
        let end = if line + 1 < line_count {
            self.line_start(line + 1)? - 1
        } else {
            self.len()
        };
        Ok(end - start)
    }

    /// Line containing `offset`. `offset == len()` belongs to the last line.
    pub fn line_of_offset(&self, offset: usize) -> Result<usize, RopeError> {
        self.check_offset(offset)?;
        Ok(newlines_before(&self.root, offset))
    }

    /// Text of line `line` without its newline.
    pub fn line_text(&self, line: usize) -> Result<String, RopeError> {
        let start = self.line_start(line)?;
        let len = self.line_length(line)?;
        self.text_in(start, start + len)
    }

    /// Text of lines `[from, to)`, newlines included.
    ///
    /// `to` is clamped to `line_count()`; an empty string is returned if `from >= to`.
    pub fn get_lines(&self, from: usize, to: usize) -> String {
        let to = to.min(self.line_count());
        if from >= to {
            return String::new();
        }
        // Both lines are <= line_count here, so the lookups cannot fail.
        let start = self.line_start(from).unwrap_or(self.len());
        let end = self.line_start(to).unwrap_or(self.len());
        let mut out = String::new();
        push_range(&self.root, start, end, &mut out);
        out
    }

    /// Iterate over the UTF-8 chunks of the rope in order.
    pub fn chunks(&self) -> Chunks<'_> {
        Chunks {
            stack: vec![&self.root],
        }
    }

    /// Iterate over the characters of the rope.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chunks().flat_map(str::chars)
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        fn check(node: &Node) -> (TextMetrics, usize) {
            match node {
                Node::Leaf { text, metrics } => {
                    assert_eq!(*metrics, TextMetrics::of(text));
                    assert!(text.len() <= MAX_LEAF_BYTES);
                    (*metrics, 0)
                }
                Node::Branch {
                    left,
                    right,
                    metrics,
                    height,
                } => {
                    let (lm, lh) = check(left);
                    let (rm, rh) = check(right);
                    assert_eq!(*metrics, TextMetrics::concat(&lm, &rm));
                    assert_eq!(*height, lh.max(rh) + 1);
                    assert!(lh.abs_diff(rh) <= 1, "unbalanced: {lh} vs {rh}");
                    (*metrics, *height)
                }
            }
        }
        check(&self.root);
    }
}

impl Default for Rope {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Rope {
    fn from(text: &str) -> Self {
        Self::from_root(build_balanced(&chunk_leaves(text)))
    }
}

impl From<String> for Rope {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rope")
            .field("len", &self.len())
            .field("line_count", &self.line_count())
            .field("height", &self.root.height())
            .finish()
    }
}

impl PartialEq for Rope {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.byte_len() == other.byte_len()
                && self.chunks().flat_map(str::bytes).eq(other.chunks().flat_map(str::bytes)))
    }
}

impl Eq for Rope {}

/// Iterator over the chunks of a [`Rope`].
pub struct Chunks<'a> {
    stack: Vec<&'a Arc<Node>>,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while let Some(node) = self.stack.pop() {
            match &**node {
                Node::Leaf { text, .. } => {
                    if !text.is_empty() {
                        return Some(text.as_str());
                    }
                }
                Node::Branch { left, right, .. } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_new_rope() {
        let rope = Rope::new();
        assert_eq!(rope.len(), 0);
        assert_eq!(rope.line_count(), 1); // an empty document has one line
        assert_eq!(rope.max_line_length(), 0);
        assert_eq!(rope.to_string(), "");
    }

    #[test]
    fn test_metrics_of_chunk() {
        let m = TextMetrics::of("ab\ncdef\n\nxyz");
        assert_eq!(m.chars, 12);
        assert_eq!(m.newlines, 3);
        assert_eq!(m.first_line, 2);
        assert_eq!(m.last_line, 3);
        assert_eq!(m.longest_line, 4);
    }

    #[test]
    fn test_metrics_concat_joins_boundary_line() {
        let left = TextMetrics::of("a\nbcd");
        let right = TextMetrics::of("efgh\ni");
        let joined = TextMetrics::concat(&left, &right);
        assert_eq!(joined, TextMetrics::of("a\nbcdefgh\ni"));
        assert_eq!(joined.longest_line, 7);
    }

    #[test]
    fn test_large_text_is_chunked_and_balanced() {
        let text = "0123456789abcdef\n".repeat(2000);
        let rope = Rope::from(text.as_str());
        rope.assert_invariants();
        assert_eq!(rope.len(), text.len());
        assert_eq!(rope.line_count(), 2001);
        assert_eq!(rope.to_string(), text);
        assert!(rope.root.height() > 1);
    }

    #[test]
    fn test_chunking_respects_char_boundaries() {
        let text = "你好世界\n".repeat(300);
        let rope = Rope::from(text.as_str());
        rope.assert_invariants();
        assert_eq!(rope.len(), text.chars().count());
        assert_eq!(rope.byte_len(), text.len());
        assert_eq!(rope.line_length(7).unwrap(), 4);
    }

    #[test]
    fn test_old_snapshot_survives_edit() {
        let original = Rope::from("hello world");
        let edited = original.insert(5, ",").unwrap().delete(0, 1).unwrap();
        assert_eq!(original.to_string(), "hello world");
        assert_eq!(edited.to_string(), "ello, world");
    }

    #[test]
    fn test_out_of_bounds_operations_fail() {
        let rope = Rope::from("abc");
        assert_eq!(
            rope.insert(4, "x").unwrap_err(),
            RopeError::OffsetOutOfBounds { offset: 4, len: 3 }
        );
        assert!(matches!(rope.delete(2, 1), Err(RopeError::InvalidRange { .. })));
        assert!(matches!(rope.slice(0, 4), Err(RopeError::InvalidRange { .. })));
        assert!(rope.line_length(1).is_err());
    }

    #[test]
    fn test_random_edits_match_string_model() {
        let mut rng = StdRng::seed_from_u64(0x5c71be);
        let alphabet: Vec<char> = "abc xyz\n\né你".chars().collect();
        let mut model: Vec<char> = Vec::new();
        let mut rope = Rope::new();

        for _ in 0..600 {
            if model.is_empty() || rng.gen_bool(0.6) {
                let at = rng.gen_range(0..=model.len());
                let len = rng.gen_range(1..400);
                let text: String = (0..len)
                    .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                    .collect();
                rope = rope.insert(at, &text).unwrap();
                model.splice(at..at, text.chars());
            } else {
                let start = rng.gen_range(0..model.len());
                let end = rng.gen_range(start..=model.len().min(start + 300));
                rope = rope.delete(start, end).unwrap();
                model.drain(start..end);
            }

            rope.assert_invariants();
            assert_eq!(rope.len(), model.len());
        }

        let expected: String = model.iter().collect();
        assert_eq!(rope.to_string(), expected);

        let lines: Vec<&str> = expected.split('\n').collect();
        assert_eq!(rope.line_count(), lines.len());
        assert_eq!(
            rope.max_line_length(),
            lines.iter().map(|l| l.chars().count()).max().unwrap_or(0)
        );
        let mut offset = 0;
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(rope.line_start(i).unwrap(), offset);
            assert_eq!(rope.line_length(i).unwrap(), line.chars().count());
            offset += line.chars().count() + 1;
        }
    }
}
