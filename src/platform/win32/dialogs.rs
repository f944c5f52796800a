// ── Common dialogs ─────────────────────────────────────────────────────────────
//
// Thin wrappers around the Win32 common-dialog APIs, exposed to the rest of
// the crate as a `FilePicker`.  Each dialog opens in the application folder
// and defaults to `.txt`.  Containment is checked by the caller, not here.
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use std::path::{Path, PathBuf};

use windows::{
    core::{PCWSTR, PWSTR},
    Win32::{
        Foundation::HWND,
        UI::Controls::Dialogs::{
            GetOpenFileNameW, GetSaveFileNameW, OFN_FILEMUSTEXIST, OFN_HIDEREADONLY,
            OFN_NOCHANGEDIR, OFN_OVERWRITEPROMPT, OFN_PATHMUSTEXIST, OPENFILENAMEW,
            OPEN_FILENAME_FLAGS,
        },
    },
};

use super::window::wide;
use crate::platform::FilePicker;

// ── Buffer size ───────────────────────────────────────────────────────────────

/// Maximum path length in `WCHAR`s, including the null terminator.
/// `MAX_PATH` (260) is too short for modern Windows paths; use 32 768 which
/// is the documented maximum for `\\?\` extended paths.
const PATH_BUF_LEN: usize = 32_768;

/// "Display\0pattern\0…\0\0"
const FILTER: &str = "Text Files (*.txt)\0*.txt\0All Files (*.*)\0*.*\0\0";

// ── Picker ────────────────────────────────────────────────────────────────────

/// `FilePicker` backed by `GetOpenFileNameW` / `GetSaveFileNameW`.
pub(crate) struct Win32Picker;

impl FilePicker for Win32Picker {
    fn pick_open(&self, initial_dir: &Path) -> Option<PathBuf> {
        show(
            initial_dir,
            "Open Text File",
            OFN_FILEMUSTEXIST | OFN_PATHMUSTEXIST | OFN_HIDEREADONLY | OFN_NOCHANGEDIR,
            false,
        )
    }

    fn pick_save(&self, initial_dir: &Path) -> Option<PathBuf> {
        show(
            initial_dir,
            "Save As",
            OFN_OVERWRITEPROMPT | OFN_PATHMUSTEXIST | OFN_NOCHANGEDIR,
            true,
        )
    }
}

fn show(initial_dir: &Path, title: &str, flags: OPEN_FILENAME_FLAGS, save: bool) -> Option<PathBuf> {
    let mut buf = vec![0u16; PATH_BUF_LEN];
    let filter: Vec<u16> = FILTER.encode_utf16().collect();
    let dir = wide(&initial_dir.to_string_lossy());
    let title = wide(title);
    let def_ext = wide("txt");

    let mut ofn = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: HWND::default(),
        lpstrFilter: PCWSTR(filter.as_ptr()),
        lpstrFile: PWSTR(buf.as_mut_ptr()),
        nMaxFile: PATH_BUF_LEN as u32,
        lpstrInitialDir: PCWSTR(dir.as_ptr()),
        lpstrTitle: PCWSTR(title.as_ptr()),
        lpstrDefExt: PCWSTR(def_ext.as_ptr()),
        Flags: flags,
        ..Default::default()
    };

    // SAFETY: `ofn` is fully initialised; `buf`, `filter`, `dir`, `title` and
    // `def_ext` outlive this call.  The dialog functions read and write only
    // within the buffers we provided.  Both are called from the foreground
    // thread, which owns all interactive prompts.
    let ok = unsafe {
        if save {
            GetSaveFileNameW(&mut ofn)
        } else {
            GetOpenFileNameW(&mut ofn)
        }
    };

    if ok.as_bool() {
        Some(path_from_buf(&buf))
    } else {
        None
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Convert a null-terminated UTF-16 buffer to a `PathBuf`.
fn path_from_buf(buf: &[u16]) -> PathBuf {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    PathBuf::from(String::from_utf16_lossy(&buf[..len]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_from_buf_stops_at_null() {
        let mut buf: Vec<u16> = r"C:\app\notes.txt".encode_utf16().collect();
        buf.extend([0, b'x' as u16]);
        assert_eq!(path_from_buf(&buf), PathBuf::from(r"C:\app\notes.txt"));
    }

    #[test]
    fn filter_is_double_null_terminated() {
        assert!(FILTER.ends_with("\0\0"));
    }
}
