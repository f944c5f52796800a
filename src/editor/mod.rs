// ── Editor component abstraction ──────────────────────────────────────────────
//
// The text surface owns the authoritative buffer.  The lifecycle core only
// sees it through `EditorSurface`, and the autosave worker reads it through a
// cloned `SharedBuffer` handle.

use std::sync::{Arc, PoisonError, RwLock};

/// What the document lifecycle needs from a text surface.
pub(crate) trait EditorSurface {
    /// The full current text.
    fn content(&self) -> String;
    /// Replace the full text.
    fn set_content(&self, text: &str);
}

// ── SharedBuffer ──────────────────────────────────────────────────────────────

/// Live document text, shared between the foreground surface and the
/// autosave worker.
///
/// Reads take a consistent snapshot under the lock; the worker never writes.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer {
    text: Arc<RwLock<String>>,
}

impl SharedBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append `text` and return the resulting content.
    pub(crate) fn append(&self, text: &str) -> String {
        let mut guard = self.text.write().unwrap_or_else(PoisonError::into_inner);
        guard.push_str(text);
        guard.clone()
    }

    /// Character count of the live text.
    pub(crate) fn char_len(&self) -> usize {
        self.text
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .chars()
            .count()
    }
}

impl EditorSurface for SharedBuffer {
    fn content(&self) -> String {
        self.text.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_content(&self, text: &str) {
        let mut guard = self.text.write().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        guard.push_str(text);
    }
}

// ── Word count ────────────────────────────────────────────────────────────────

/// Number of whitespace-separated words in `text`.
pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_text() {
        let a = SharedBuffer::new();
        let b = a.clone();
        a.set_content("hello");
        assert_eq!(b.content(), "hello");
        b.append(" world");
        assert_eq!(a.content(), "hello world");
    }

    #[test]
    fn set_content_replaces() {
        let buf = SharedBuffer::new();
        buf.set_content("first");
        buf.set_content("second");
        assert_eq!(buf.content(), "second");
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        let buf = SharedBuffer::new();
        buf.set_content("héllo");
        assert_eq!(buf.char_len(), 5);
    }

    #[test]
    fn word_count_splits_on_any_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("one"), 1);
        assert_eq!(word_count("one two\nthree\tfour  five"), 5);
    }
}
