// ── Session persistence ───────────────────────────────────────────────────────
//
// Reads and writes `last_session.txt` in the application folder: a single
// line holding the path of the last active document.  An empty or missing
// file means "no session".
// No `unsafe`: pure safe Rust.

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Remembers the last active document across restarts.
pub(crate) struct SessionTracker {
    file: PathBuf,
}

impl SessionTracker {
    pub(crate) fn new(file: PathBuf) -> Self {
        Self { file }
    }

    // ── Save ──────────────────────────────────────────────────────────────────

    /// Make `path` the sole remembered document.
    ///
    /// Best effort: a write failure is logged and otherwise ignored.
    pub(crate) fn record_active(&self, path: &Path) {
        match fs::write(&self.file, path.to_string_lossy().as_bytes()) {
            Ok(()) => tracing::debug!(document = %path.display(), "session recorded"),
            Err(e) => tracing::warn!(
                session = %self.file.display(),
                error = %e,
                "could not record session"
            ),
        }
    }

    // ── Load ──────────────────────────────────────────────────────────────────

    /// Return the remembered document if it still exists on disk.
    ///
    /// Returns `None` when the session file is missing, unreadable, empty, or
    /// names a file that has since been deleted.
    pub(crate) fn restore(&self) -> Option<PathBuf> {
        let data = fs::read_to_string(&self.file).ok()?;
        let trimmed = data.trim();
        if trimmed.is_empty() {
            return None;
        }
        let path = PathBuf::from(trimmed);
        if !path.is_file() {
            tracing::info!(document = %path.display(), "session document no longer exists");
            return None;
        }
        Some(path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
