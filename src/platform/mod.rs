// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the interface that the rest of the codebase uses to
// talk to the OS and to the user: where the application folder is, which
// paths are allowed, how errors are shown and how files are picked.  No
// `unsafe` lives here; all Win32 FFI is confined to the `win32` sub-module
// and never leaks outward.

use std::{
    env, io,
    path::{Component, Path, PathBuf},
};

use crate::error::{QuillError, Result};

#[cfg(windows)]
pub mod win32;

// ── Application folder ────────────────────────────────────────────────────────

/// Environment variable that overrides the application folder.
pub(crate) const HOME_ENV: &str = "QUILLPAD_HOME";

/// Fixed file layout inside the application folder.
#[derive(Debug, Clone)]
pub(crate) struct AppPaths {
    /// Canonical application folder; every document must live under it.
    pub(crate) root: PathBuf,
    pub(crate) settings: PathBuf,
    pub(crate) session: PathBuf,
    pub(crate) readme: PathBuf,
}

impl AppPaths {
    /// Lay out the well-known files under `root`.
    ///
    /// `root` is canonicalised so that containment checks compare like with
    /// like.
    pub(crate) fn under(root: &Path) -> Result<Self> {
        let root = root.canonicalize()?;
        Ok(Self {
            settings: root.join("settings.json"),
            session: root.join("last_session.txt"),
            readme: root.join("readme.txt"),
            root,
        })
    }

    /// `$QUILLPAD_HOME` if set, otherwise the folder holding the executable.
    pub(crate) fn discover() -> Result<Self> {
        if let Some(home) = env::var_os(HOME_ENV) {
            return Self::under(Path::new(&home));
        }
        let exe = env::current_exe()?;
        let dir = exe.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "executable has no parent folder")
        })?;
        Self::under(dir)
    }
}

// ── Containment rule ──────────────────────────────────────────────────────────

/// Resolve `path` and accept it only if it lies inside `root`.
///
/// Relative paths are taken relative to `root`.  The longest existing
/// ancestor is canonicalised (symlinks and `..` resolved) and the remaining,
/// not-yet-existing components are appended; a `..` in that remainder is
/// rejected outright.  `root` must already be canonical.
pub(crate) fn contain(root: &Path, path: &Path) -> Result<PathBuf> {
    let outside = || QuillError::OutsideRoot(path.to_path_buf());
    let joined = root.join(path);

    let mut existing = joined.as_path();
    let mut rest: Vec<&std::ffi::OsStr> = Vec::new();
    let base = loop {
        match existing.canonicalize() {
            Ok(canon) => break canon,
            Err(_) => {
                let name = existing.file_name().ok_or_else(outside)?;
                rest.push(name);
                existing = existing.parent().ok_or_else(outside)?;
            }
        }
    };

    // `file_name()` skips `..`, so inspect the unresolved tail separately.
    let tail_has_parent_ref = joined
        .strip_prefix(existing)
        .map(|tail| tail.components().any(|c| matches!(c, Component::ParentDir)))
        .unwrap_or(true);
    if tail_has_parent_ref {
        return Err(outside());
    }

    let resolved = rest.iter().rev().fold(base, |acc, name| acc.join(name));
    if resolved.starts_with(root) {
        Ok(resolved)
    } else {
        Err(outside())
    }
}

// ── User-facing notifications ─────────────────────────────────────────────────

/// Modal error / info reporting.
///
/// Shared with the autosave worker, hence `Send + Sync`.
pub(crate) trait Notifier: Send + Sync {
    fn error(&self, title: &str, message: &str);
    fn info(&self, title: &str, message: &str);
}

/// Reports through `tracing` and stderr.  Used by the console front end and
/// on every non-Windows target.
#[cfg_attr(windows, allow(dead_code))]
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn error(&self, title: &str, message: &str) {
        tracing::error!(%title, "{message}");
        eprintln!("[{title}] {message}");
    }

    fn info(&self, title: &str, message: &str) {
        tracing::info!(%title, "{message}");
        eprintln!("[{title}] {message}");
    }
}

// ── File pickers ──────────────────────────────────────────────────────────────

/// Interactive open / save-as selection.  `None` means the user cancelled.
pub(crate) trait FilePicker {
    fn pick_open(&self, initial_dir: &Path) -> Option<PathBuf>;
    fn pick_save(&self, initial_dir: &Path) -> Option<PathBuf>;
}

/// Asks for a path on stdin.  An empty answer or end of input cancels.
#[cfg_attr(windows, allow(dead_code))]
pub(crate) struct StdinPicker;

impl StdinPicker {
    fn ask(prompt: &str, initial_dir: &Path) -> Option<PathBuf> {
        eprint!("{prompt} (relative to {}): ", initial_dir.display());
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let answer = line.trim();
                (!answer.is_empty()).then(|| initial_dir.join(answer))
            }
        }
    }
}

impl FilePicker for StdinPicker {
    fn pick_open(&self, initial_dir: &Path) -> Option<PathBuf> {
        Self::ask("Open Text File", initial_dir)
    }

    fn pick_save(&self, initial_dir: &Path) -> Option<PathBuf> {
        Self::ask("Save As", initial_dir)
    }
}

/// Platform default picker.
pub(crate) fn default_picker() -> Box<dyn FilePicker> {
    #[cfg(windows)]
    {
        Box::new(win32::dialogs::Win32Picker)
    }
    #[cfg(not(windows))]
    {
        Box::new(StdinPicker)
    }
}

/// Platform default notifier.
pub(crate) fn default_notifier() -> std::sync::Arc<dyn Notifier> {
    #[cfg(windows)]
    {
        std::sync::Arc::new(win32::window::MessageBoxNotifier)
    }
    #[cfg(not(windows))]
    {
        std::sync::Arc::new(ConsoleNotifier)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
