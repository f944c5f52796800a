// ── Message boxes ─────────────────────────────────────────────────────────────
//
// Modal error / info notifications.  The autosave worker reports through the
// same notifier, so every box is ownerless: `MessageBoxW` with a null owner
// is safe to call from any thread.

#![allow(unsafe_code)]

use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::HWND,
        UI::WindowsAndMessaging::{
            MessageBoxW, MB_ICONERROR, MB_ICONINFORMATION, MB_OK, MB_SETFOREGROUND,
            MESSAGEBOX_STYLE,
        },
    },
};

use crate::platform::Notifier;

/// `Notifier` backed by `MessageBoxW`.  Every message is also logged.
pub(crate) struct MessageBoxNotifier;

impl Notifier for MessageBoxNotifier {
    fn error(&self, title: &str, message: &str) {
        tracing::error!(%title, "{message}");
        show(title, message, MB_ICONERROR);
    }

    fn info(&self, title: &str, message: &str) {
        tracing::info!(%title, "{message}");
        show(title, message, MB_ICONINFORMATION);
    }
}

fn show(title: &str, message: &str, icon: MESSAGEBOX_STYLE) {
    let msg_wide = wide(message);
    let title_wide = wide(&caption(title));

    // SAFETY: msg_wide and title_wide are valid null-terminated UTF-16 strings
    // that remain allocated for the duration of the MessageBoxW call.
    // HWND::default() (null) means the dialog has no owner window.
    // Return value (button pressed) is intentionally unused.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_OK | MB_SETFOREGROUND | icon,
        );
    }
}

/// Title bar text for a message box.
fn caption(title: &str) -> String {
    format!("Quillpad - {title}")
}

/// Null-terminated UTF-16 copy of `s`.
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_is_null_terminated() {
        assert_eq!(wide("ab"), vec![b'a' as u16, b'b' as u16, 0]);
        assert_eq!(wide(""), vec![0]);
    }

    #[test]
    fn caption_is_plain_ascii() {
        assert_eq!(caption("Autosave"), "Quillpad - Autosave");
        assert!(caption("Error").is_ascii());
    }
}
