// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI for
// message boxes and common dialogs).  Each unsafe block in that module MUST
// carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

mod app;
mod autosave;
mod backup;
mod editor;
mod error;
mod platform;
mod session;
mod settings;
mod theme;
mod ui;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::{
    app::App,
    editor::SharedBuffer,
    error::{QuillError, Result},
    platform::AppPaths,
};

fn main() {
    init_tracing();

    if let Err(e) = run() {
        // Fatal errors have already been shown to the user by the lifecycle.
        tracing::error!(error = %e, "exiting");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quillpad=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Wire the lifecycle to the platform and drive the console surface.
///
/// Usage: `quillpad [PATH]`.  Without a path the last session (or the readme)
/// is opened.  A path outside the application folder falls back to a
/// mandatory file prompt.
fn run() -> Result<()> {
    let notifier = platform::default_notifier();
    let paths = AppPaths::discover().inspect_err(|e| {
        notifier.error("Fatal Error", &format!("Could not locate the application folder:\n{e}"));
    })?;
    let picker = platform::default_picker();
    let buffer = SharedBuffer::new();

    let mut app = App::new(paths, buffer.clone(), notifier);
    tracing::info!(root = %app.root().display(), "starting");
    app.startup()?;

    if let Some(arg) = std::env::args_os().nth(1) {
        match app.open_document(&PathBuf::from(arg)) {
            Ok(()) => {}
            Err(QuillError::OutsideRoot(_)) => app.open_file_dialog(picker.as_ref(), true)?,
            Err(e) => return Err(e),
        }
    }

    ui::console::run(&mut app, &buffer, picker.as_ref())
}
