// ── Test doubles ──────────────────────────────────────────────────────────────
//
// Shared by the unit tests of several modules.  Compiled only under `cfg(test)`.

use std::{
    cell::RefCell,
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    thread,
    time::{Duration, Instant},
};

use crate::platform::{FilePicker, Notifier};

/// Records every notification instead of showing it.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
    infos: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("lock").clone()
    }

    pub(crate) fn infos(&self) -> Vec<String> {
        self.infos.lock().expect("lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, _title: &str, message: &str) {
        self.errors.lock().expect("lock").push(message.to_owned());
    }

    fn info(&self, _title: &str, message: &str) {
        self.infos.lock().expect("lock").push(message.to_owned());
    }
}

/// Answers each prompt with the next scripted choice; `None` is a cancel.
/// Running out of script also cancels.
#[derive(Default)]
pub(crate) struct ScriptedPicker {
    answers: RefCell<VecDeque<Option<PathBuf>>>,
    prompts: RefCell<usize>,
}

impl ScriptedPicker {
    pub(crate) fn new(answers: impl IntoIterator<Item = Option<PathBuf>>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            prompts: RefCell::new(0),
        }
    }

    pub(crate) fn prompts(&self) -> usize {
        *self.prompts.borrow()
    }

    fn next(&self) -> Option<PathBuf> {
        *self.prompts.borrow_mut() += 1;
        self.answers.borrow_mut().pop_front().flatten()
    }
}

impl FilePicker for ScriptedPicker {
    fn pick_open(&self, _initial_dir: &Path) -> Option<PathBuf> {
        self.next()
    }

    fn pick_save(&self, _initial_dir: &Path) -> Option<PathBuf> {
        self.next()
    }
}

/// Poll `cond` until it holds or `limit` passes.  Returns the last result.
pub(crate) fn within(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

/// Wait, with a generous deadline, until `path` holds exactly `expected`.
pub(crate) fn file_becomes(path: &Path, expected: &str) -> bool {
    within(Duration::from_secs(5), || {
        fs::read_to_string(path).is_ok_and(|s| s == expected)
    })
}
