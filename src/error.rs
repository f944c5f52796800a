// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in Quillpad return `error::Result<T>`.  No panics
// in production paths; errors surface through `platform::Notifier` and only
// `main()` decides which of them end the process.

use std::{io, path::PathBuf};

/// Every error that Quillpad can produce.
#[derive(Debug, thiserror::Error)]
pub(crate) enum QuillError {
    /// A standard I/O error that is not tied to a specific document.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document could not be read.  Fatal at startup.
    #[error("Could not load file:\n{}\n{source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the document (explicit save or autosave) failed.
    #[error("Could not save file:\n{}\n{source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing a large-deletion backup failed.
    #[error("Could not create backup file:\n{}\n{source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A selected path resolves outside the application folder.
    #[error("All files must be inside the app folder for portability.\n{}", .0.display())]
    OutsideRoot(PathBuf),

    /// The user cancelled a file prompt that had to produce a document.
    #[error("No file selected. Exiting.")]
    NoFileSelected,

    /// A settings value was rejected by `Settings::validate`.
    #[error("Invalid input: {0}")]
    InvalidSettings(String),

    /// Settings JSON could not be produced or parsed.
    #[error("settings format error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QuillError {
    /// `true` for errors after which the application has no usable state.
    pub(crate) fn is_fatal(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::NoFileSelected)
    }
}

/// Convenience alias used throughout the crate.
pub(crate) type Result<T> = std::result::Result<T, QuillError>;

// ── Tests ─────────────────────────────────────────────────────────────────────
