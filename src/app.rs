// ── Application lifecycle & top-level state ────────────────────────────────────
//
// A single `App` is created on startup and owned by the front end for the
// lifetime of the process.  All document-state mutations happen on the
// foreground thread; the autosave worker only reads the shared buffer and the
// enabled flag.  There is no global mutable state.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{
    autosave::{AutosavePump, AutosaveTarget},
    backup,
    editor::{EditorSurface, SharedBuffer},
    error::{QuillError, Result},
    platform::{self, AppPaths, FilePicker, Notifier},
    session::SessionTracker,
    settings::{Settings, SettingsStore},
    theme::{self, Themeable},
};

/// Written on first run when there is no session to restore.
pub(crate) const README_TEXT: &str = "Right click to see the context menu and hotkeys.
Open any text document, and it will auto open next time.
";

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Where the lifecycle stands.  There is no closed state on exit: the
/// process simply ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Uninitialized,
    NoDocument,
    DocumentActive,
}

// ── DocumentState ─────────────────────────────────────────────────────────────

/// State of the current document.
///
/// `snapshot` is the last saved or observed text, kept only to spot large
/// deletions; the surface owns the real buffer.
#[derive(Debug)]
pub(crate) struct DocumentState {
    pub(crate) path: Option<PathBuf>,
    pub(crate) snapshot: String,
    /// Set iff `path` is set.  Shared with the autosave worker.
    autosave: Arc<AtomicBool>,
}

impl DocumentState {
    fn empty() -> Self {
        Self {
            path: None,
            snapshot: String::new(),
            autosave: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn autosave_enabled(&self) -> bool {
        self.autosave.load(Ordering::Acquire)
    }

    /// The bare filename component, or `"Untitled"` if no path is set.
    pub(crate) fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_owned())
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Top-level application state and the document lifecycle.
pub(crate) struct App {
    paths: AppPaths,
    settings_store: SettingsStore,
    settings: Settings,
    session: SessionTracker,
    pump: AutosavePump,
    buffer: SharedBuffer,
    notifier: Arc<dyn Notifier>,
    doc: DocumentState,
    phase: Phase,
}

impl App {
    /// Load settings and wire up collaborators.  No document is open yet.
    pub(crate) fn new(paths: AppPaths, buffer: SharedBuffer, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_tick(paths, buffer, notifier, crate::autosave::SECOND)
    }

    /// As [`App::new`], with the autosave interval measured in `tick`s.
    pub(crate) fn with_tick(
        paths: AppPaths,
        buffer: SharedBuffer,
        notifier: Arc<dyn Notifier>,
        tick: Duration,
    ) -> Self {
        let settings_store = SettingsStore::new(paths.settings.clone());
        let settings = settings_store.load();
        let pump = AutosavePump::new(tick, settings.autosave_interval);
        Self {
            session: SessionTracker::new(paths.session.clone()),
            paths,
            settings_store,
            settings,
            pump,
            buffer,
            notifier,
            doc: DocumentState::empty(),
            phase: Phase::Uninitialized,
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn doc(&self) -> &DocumentState {
        &self.doc
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn root(&self) -> &Path {
        &self.paths.root
    }

    pub(crate) fn autosave_running(&self) -> bool {
        self.pump.is_running()
    }

    // ── Startup ───────────────────────────────────────────────────────────────

    /// Reopen the last session's document, or fall back to the bundled
    /// readme.  Any error returned here is fatal.
    pub(crate) fn startup(&mut self) -> Result<()> {
        self.phase = Phase::NoDocument;
        match self.session.restore() {
            Some(path) => {
                tracing::info!(document = %path.display(), "restoring session");
                self.open_existing(&path)
            }
            None => self.open_readme(),
        }
    }

    fn open_readme(&mut self) -> Result<()> {
        let readme = self.paths.readme.clone();
        if !readme.is_file() {
            tracing::info!(path = %readme.display(), "creating readme");
            if let Err(source) = fs::write(&readme, README_TEXT) {
                let e = QuillError::Load { path: readme, source };
                self.notifier.error("Error", &e.to_string());
                return Err(e);
            }
        }
        self.open_existing(&readme)
    }

    // ── File open ─────────────────────────────────────────────────────────────

    /// Load `path` into the surface and make it the active document.
    ///
    /// A read failure is reported and returned as `QuillError::Load`; the
    /// caller must treat it as fatal.  No containment check happens here.
    pub(crate) fn open_existing(&mut self, path: &Path) -> Result<()> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(source) => {
                let e = QuillError::Load {
                    path: path.to_path_buf(),
                    source,
                };
                self.notifier.error("Error", &e.to_string());
                return Err(e);
            }
        };

        // The old worker must not see the new text.
        self.release_pump_unless(path);
        self.buffer.set_content(&content);
        self.doc.snapshot = content;
        self.activate(path.to_path_buf());
        tracing::info!(document = %path.display(), "document opened");
        Ok(())
    }

    /// Surface-facing open: apply the containment rule, then open.
    pub(crate) fn open_document(&mut self, path: &Path) -> Result<()> {
        let path = self.contain(path)?;
        self.open_existing(&path)
    }

    // ── File save ─────────────────────────────────────────────────────────────

    /// Write the surface content to `path` and make it the active document.
    ///
    /// On failure the error is reported and all state is left unchanged.
    pub(crate) fn save_as(&mut self, path: &Path) -> Result<()> {
        if let Err(e) = self.try_save_as(path) {
            self.notifier.error("Error", &e.to_string());
            return Err(e);
        }
        Ok(())
    }

    fn try_save_as(&mut self, path: &Path) -> Result<()> {
        let save_err = |source| QuillError::Save {
            path: path.to_path_buf(),
            source,
        };
        if path.is_dir() {
            return Err(save_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "target is a directory",
            )));
        }
        let parent_ok = path
            .parent()
            .map(|p| p.as_os_str().is_empty() || p.is_dir())
            .unwrap_or(false);
        if !parent_ok {
            return Err(save_err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "folder does not exist",
            )));
        }

        let content = self.buffer.content();
        fs::write(path, content.as_bytes()).map_err(save_err)?;

        self.doc.snapshot = content;
        self.activate(path.to_path_buf());
        tracing::info!(document = %path.display(), "document saved");
        Ok(())
    }

    /// Surface-facing save-as: apply the containment rule, then save.
    pub(crate) fn save_current_as(&mut self, path: &Path) -> Result<()> {
        let path = self.contain(path)?;
        self.save_as(&path)
    }

    /// Record `path` as the session, enable autosave and point the pump at it.
    ///
    /// Autosave stays off, and the user is told, if no worker can be started.
    fn activate(&mut self, path: PathBuf) {
        self.session.record_active(&path);
        self.release_pump_unless(&path);
        let running = self.pump.is_running()
            || self.pump.start(AutosaveTarget {
                path: path.clone(),
                enabled: Arc::clone(&self.doc.autosave),
                source: self.buffer.clone(),
                notifier: Arc::clone(&self.notifier),
            });
        if !running {
            self.notifier.error(
                "Autosave",
                &format!("Autosave could not be started for:\n{}\nSave manually.", path.display()),
            );
        }
        self.doc.path = Some(path);
        self.doc.autosave.store(running, Ordering::Release);
        self.phase = Phase::DocumentActive;
    }

    /// Stop a worker that writes anywhere other than `path`.
    fn release_pump_unless(&mut self, path: &Path) {
        if self.pump.target_path().is_some_and(|target| target != path) {
            self.doc.autosave.store(false, Ordering::Release);
            self.pump.stop();
        }
    }

    /// Stop autosaving and forget the active document.  The session file is
    /// left as is, so the document still reopens on the next start.
    pub(crate) fn close(&mut self) {
        self.doc.autosave.store(false, Ordering::Release);
        self.pump.stop();
        self.doc.path = None;
        self.doc.snapshot.clear();
        if self.phase != Phase::Uninitialized {
            self.phase = Phase::NoDocument;
        }
    }

    // ── Edits ─────────────────────────────────────────────────────────────────

    /// Called by the surface after every change.
    ///
    /// Backs up the previous text if this edit deleted a lot, then takes
    /// `content` as the new snapshot.  A failed backup is reported and
    /// editing continues.
    pub(crate) fn notify_edited(&mut self, content: &str) -> Option<PathBuf> {
        let backup = match backup::on_content_observed(&self.doc.snapshot, content, self.doc.path.as_deref()) {
            Ok(backup) => backup,
            Err(e) => {
                self.notifier.error("Error", &e.to_string());
                None
            }
        };
        self.doc.snapshot.clear();
        self.doc.snapshot.push_str(content);
        backup
    }

    // ── Interactive pickers ───────────────────────────────────────────────────

    /// Prompt for a document to open until the user picks one inside the
    /// application folder or cancels.
    ///
    /// With `mandatory`, cancelling reports "No file selected" and returns
    /// `QuillError::NoFileSelected`, which is fatal.  Otherwise cancelling
    /// changes nothing.
    pub(crate) fn open_file_dialog(&mut self, picker: &dyn FilePicker, mandatory: bool) -> Result<()> {
        loop {
            let Some(picked) = picker.pick_open(&self.paths.root) else {
                if mandatory {
                    let e = QuillError::NoFileSelected;
                    self.notifier.info("No File Selected", &e.to_string());
                    return Err(e);
                }
                return Ok(());
            };
            match self.contain(&picked) {
                Ok(path) => return self.open_existing(&path),
                Err(_) => continue,
            }
        }
    }

    /// Prompt for a save location until the user picks one inside the
    /// application folder or cancels.
    pub(crate) fn save_as_dialog(&mut self, picker: &dyn FilePicker) -> Result<()> {
        loop {
            let Some(picked) = picker.pick_save(&self.paths.root) else {
                return Ok(());
            };
            match self.contain(&picked) {
                Ok(path) => return self.save_as(&path),
                Err(_) => continue,
            }
        }
    }

    /// Apply the containment rule, reporting a violation to the user.
    fn contain(&self, path: &Path) -> Result<PathBuf> {
        platform::contain(&self.paths.root, path).inspect_err(|e| {
            self.notifier.error("Error", &e.to_string());
        })
    }

    // ── Settings ──────────────────────────────────────────────────────────────

    /// Validate, adopt and persist `settings`, then re-theme `views`.
    ///
    /// Invalid input is reported and nothing changes.
    pub(crate) fn apply_settings(
        &mut self,
        settings: Settings,
        views: &mut [&mut dyn Themeable],
    ) -> Result<()> {
        if let Err(e) = settings.validate() {
            self.notifier.error("Error", &e.to_string());
            return Err(e);
        }
        self.settings = settings;
        self.settings_store.save(&self.settings);
        self.pump.set_interval(self.settings.autosave_interval);

        let palette = theme::palette_for(&self.settings);
        for view in views.iter_mut() {
            view.apply_theme(&palette, &self.settings);
        }
        tracing::debug!(theme = %self.settings.theme, "settings applied");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{file_becomes, RecordingNotifier, ScriptedPicker};
    use std::thread;

    const TICK: Duration = Duration::from_millis(10);

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        buffer: SharedBuffer,
        notifier: Arc<RecordingNotifier>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().expect("tempdir");
            let root = dir.path().canonicalize().expect("canonicalize");
            Self {
                _dir: dir,
                root,
                buffer: SharedBuffer::new(),
                notifier: Arc::new(RecordingNotifier::default()),
            }
        }

        fn app(&self) -> App {
            let paths = AppPaths::under(&self.root).expect("paths");
            App::with_tick(
                paths,
                self.buffer.clone(),
                Arc::clone(&self.notifier) as Arc<dyn Notifier>,
                TICK,
            )
        }

        fn write(&self, name: &str, content: &str) -> PathBuf {
            let p = self.root.join(name);
            fs::write(&p, content).expect("write");
            p
        }

        fn session(&self) -> String {
            fs::read_to_string(self.root.join("last_session.txt")).expect("session file")
        }

        fn backups(&self) -> Vec<PathBuf> {
            fs::read_dir(&self.root)
                .expect("read_dir")
                .map(|e| e.expect("entry").path())
                .filter(|p| p.to_string_lossy().contains("_backup_"))
                .collect()
        }
    }

    #[test]
    fn fresh_app_is_uninitialized() {
        let fx = Fixture::new();
        let app = fx.app();
        assert_eq!(app.phase(), Phase::Uninitialized);
        assert!(app.doc().path.is_none());
        assert!(!app.doc().autosave_enabled());
        assert!(!app.autosave_running());
        assert_eq!(app.doc().display_name(), "Untitled");
    }

    #[test]
    fn first_run_creates_and_opens_readme() {
        let fx = Fixture::new();
        let mut app = fx.app();
        app.startup().expect("startup");

        let readme = fx.root.join("readme.txt");
        assert_eq!(fs::read_to_string(&readme).expect("readme"), README_TEXT);
        assert_eq!(fx.buffer.content(), README_TEXT);
        assert_eq!(app.doc().path.as_deref(), Some(readme.as_path()));
        assert_eq!(fx.session(), readme.to_string_lossy());
        assert_eq!(app.phase(), Phase::DocumentActive);
        assert!(app.doc().autosave_enabled());
        assert!(app.autosave_running());
    }

    #[test]
    fn existing_readme_is_not_overwritten() {
        let fx = Fixture::new();
        fx.write("readme.txt", "my own notes");
        let mut app = fx.app();
        app.startup().expect("startup");
        assert_eq!(fx.buffer.content(), "my own notes");
    }

    #[test]
    fn startup_restores_session_document() {
        let fx = Fixture::new();
        let doc = fx.write("novel.txt", "Chapter one");
        fs::write(fx.root.join("last_session.txt"), doc.to_string_lossy().as_bytes()).expect("session");

        let mut app = fx.app();
        app.startup().expect("startup");
        assert_eq!(fx.buffer.content(), "Chapter one");
        assert_eq!(app.doc().path.as_deref(), Some(doc.as_path()));
        assert_eq!(app.doc().snapshot, "Chapter one");
        assert!(!fx.root.join("readme.txt").exists());
    }

    #[test]
    fn startup_with_deleted_session_document_falls_back_to_readme() {
        let fx = Fixture::new();
        let gone = fx.root.join("gone.txt");
        fs::write(fx.root.join("last_session.txt"), gone.to_string_lossy().as_bytes()).expect("session");

        let mut app = fx.app();
        app.startup().expect("startup");
        let readme = fx.root.join("readme.txt");
        assert_eq!(app.doc().path.as_deref(), Some(readme.as_path()));
        assert_eq!(fx.session(), readme.to_string_lossy());
    }

    #[test]
    fn unreadable_document_is_fatal() {
        let fx = Fixture::new();
        let bad = fx.root.join("binary.txt");
        fs::write(&bad, [0xff_u8, 0xfe, 0x00, 0x80]).expect("write");

        let mut app = fx.app();
        let err = app.open_existing(&bad).expect_err("not utf-8");
        assert!(err.is_fatal());
        assert_eq!(fx.notifier.errors().len(), 1);
        assert!(fx.notifier.errors()[0].starts_with("Could not load file"));
        assert!(app.doc().path.is_none());
    }

    #[test]
    fn save_as_then_open_round_trips() {
        let fx = Fixture::new();
        let mut app = fx.app();
        app.startup().expect("startup");

        let text = "Line one\nLínea dos\n\tthree\n";
        fx.buffer.set_content(text);
        let target = fx.root.join("draft.txt");
        app.save_as(&target).expect("save");
        assert_eq!(app.doc().path.as_deref(), Some(target.as_path()));
        assert_eq!(fx.session(), target.to_string_lossy());

        fx.buffer.set_content("something else");
        app.open_existing(&target).expect("open");
        assert_eq!(fx.buffer.content(), text);
    }

    #[test]
    fn failed_save_leaves_state_unchanged() {
        let fx = Fixture::new();
        let mut app = fx.app();
        app.startup().expect("startup");
        let before = app.doc().path.clone();
        let session_before = fx.session();

        fx.buffer.set_content("unsaved");
        let err = app
            .save_as(&fx.root.join("no_such_dir").join("x.txt"))
            .expect_err("missing folder");
        assert!(matches!(err, QuillError::Save { .. }));
        assert!(!err.is_fatal());
        assert_eq!(app.doc().path, before);
        assert_eq!(fx.session(), session_before);
        assert_eq!(fx.notifier.errors().len(), 1);
    }

    #[test]
    fn save_onto_directory_is_rejected() {
        let fx = Fixture::new();
        fs::create_dir(fx.root.join("folder")).expect("mkdir");
        let mut app = fx.app();
        app.startup().expect("startup");
        assert!(app.save_as(&fx.root.join("folder")).is_err());
    }

    #[test]
    fn large_deletion_backs_up_previous_text() {
        let fx = Fixture::new();
        let long = "w".repeat(5000);
        let doc = fx.write("long.txt", &long);
        let mut app = fx.app();
        app.open_existing(&doc).expect("open");

        let backup = app.notify_edited("w").expect("backup written");
        assert_eq!(fs::read_to_string(&backup).expect("read backup"), long);
        assert_eq!(fx.backups(), vec![backup]);
        assert_eq!(app.doc().snapshot, "w");

        // The snapshot moved on: the next small edit is not a deletion.
        assert!(app.notify_edited("").is_none());
        assert_eq!(fx.backups().len(), 1);
    }

    #[test]
    fn small_edits_never_back_up() {
        let fx = Fixture::new();
        let doc = fx.write("short.txt", &"s".repeat(3000));
        let mut app = fx.app();
        app.open_existing(&doc).expect("open");

        assert!(app.notify_edited("").is_none());
        assert!(fx.backups().is_empty());
    }

    #[test]
    fn no_backup_without_a_document() {
        let fx = Fixture::new();
        let mut app = fx.app();
        app.notify_edited(&"x".repeat(5000));
        assert!(app.notify_edited("").is_none());
        assert!(fx.backups().is_empty());
    }

    #[test]
    fn open_outside_root_is_rejected_and_reprompted() {
        let fx = Fixture::new();
        let inside = fx.write("inside.txt", "inside");
        let elsewhere = tempfile::tempdir().expect("tempdir");
        let outside = elsewhere.path().join("outside.txt");
        fs::write(&outside, "outside").expect("write");

        let mut app = fx.app();
        app.startup().expect("startup");
        let before = app.doc().path.clone();

        let picker = ScriptedPicker::new([Some(outside), Some(inside.clone())]);
        app.open_file_dialog(&picker, false).expect("second pick accepted");

        assert_eq!(picker.prompts(), 2);
        assert_eq!(fx.notifier.errors().len(), 1);
        assert!(fx.notifier.errors()[0].contains("inside the app folder"));
        assert_ne!(app.doc().path, before);
        assert_eq!(fx.buffer.content(), "inside");
    }

    #[test]
    fn rejected_then_cancelled_open_changes_nothing() {
        let fx = Fixture::new();
        let mut app = fx.app();
        app.startup().expect("startup");
        let before = app.doc().path.clone();

        let picker = ScriptedPicker::new([Some(PathBuf::from("../escape.txt")), None]);
        app.open_file_dialog(&picker, false).expect("cancel is fine");
        assert_eq!(app.doc().path, before);
        assert_eq!(fx.buffer.content(), README_TEXT);
    }

    #[test]
    fn cancelling_mandatory_open_is_fatal() {
        let fx = Fixture::new();
        let mut app = fx.app();
        let picker = ScriptedPicker::new([None]);

        let err = app.open_file_dialog(&picker, true).expect_err("cancelled");
        assert!(matches!(err, QuillError::NoFileSelected));
        assert!(err.is_fatal());
        assert_eq!(fx.notifier.infos().len(), 1);
    }

    #[test]
    fn mandatory_open_reprompts_until_a_document_inside_is_picked() {
        let fx = Fixture::new();
        let inside = fx.write("chosen.txt", "chosen");
        let elsewhere = tempfile::tempdir().expect("tempdir");
        let outside = elsewhere.path().join("stray.txt");
        fs::write(&outside, "stray").expect("write");

        let mut app = fx.app();
        let picker = ScriptedPicker::new([Some(outside), Some(inside.clone())]);
        app.open_file_dialog(&picker, true).expect("second pick accepted");

        assert_eq!(picker.prompts(), 2);
        assert_eq!(fx.notifier.errors().len(), 1);
        assert!(fx.notifier.infos().is_empty());
        assert_eq!(app.phase(), Phase::DocumentActive);
        assert_eq!(app.doc().path.as_deref(), Some(inside.as_path()));
        assert_eq!(fx.buffer.content(), "chosen");
        assert_eq!(fx.session(), inside.to_string_lossy());
    }

    #[test]
    fn failed_pump_start_leaves_autosave_off_and_tells_the_user() {
        let fx = Fixture::new();
        let doc = fx.write("a.txt", "a");
        let mut app = fx.app();
        app.pump.refuse_spawns();

        app.open_existing(&doc).expect("open still succeeds");
        assert_eq!(app.phase(), Phase::DocumentActive);
        assert!(!app.autosave_running());
        assert!(!app.doc().autosave_enabled());
        let errors = fx.notifier.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Autosave could not be started"));
    }

    #[test]
    fn save_as_dialog_respects_containment() {
        let fx = Fixture::new();
        let mut app = fx.app();
        app.startup().expect("startup");
        fx.buffer.set_content("kept");

        let picker = ScriptedPicker::new([Some(PathBuf::from("../x.txt")), Some(PathBuf::from("kept.txt"))]);
        app.save_as_dialog(&picker).expect("saved");
        let kept = fx.root.join("kept.txt");
        assert_eq!(fs::read_to_string(&kept).expect("read"), "kept");
        assert_eq!(app.doc().path.as_deref(), Some(kept.as_path()));
    }

    #[test]
    fn autosave_persists_latest_content() {
        let fx = Fixture::new();
        let mut app = fx.app();
        app.apply_settings(Settings { autosave_interval: 2, ..Settings::default() }, &mut [])
            .expect("apply");
        app.startup().expect("startup");

        fx.buffer.set_content("typed since opening");
        app.notify_edited(&fx.buffer.content());

        assert!(file_becomes(&fx.root.join("readme.txt"), "typed since opening"));
    }

    #[test]
    fn reopening_same_document_keeps_one_pump() {
        let fx = Fixture::new();
        let doc = fx.write("a.txt", "a");
        let mut app = fx.app();
        app.open_existing(&doc).expect("open");
        app.open_existing(&doc).expect("open again");
        assert!(app.autosave_running());
        assert_eq!(app.pump.target_path(), Some(doc.as_path()));
    }

    #[test]
    fn switching_documents_retargets_autosave() {
        let fx = Fixture::new();
        let a = fx.write("a.txt", "alpha");
        let b = fx.write("b.txt", "beta");
        let mut app = fx.app();
        app.apply_settings(Settings { autosave_interval: 1, ..Settings::default() }, &mut [])
            .expect("apply");

        app.open_existing(&a).expect("open a");
        app.open_existing(&b).expect("open b");
        fx.buffer.set_content("beta edited");

        assert!(file_becomes(&b, "beta edited"));
        assert_eq!(app.pump.target_path(), Some(b.as_path()));
        assert_eq!(fs::read_to_string(&a).expect("read a"), "alpha");
    }

    #[test]
    fn close_stops_autosave() {
        let fx = Fixture::new();
        let doc = fx.write("a.txt", "original");
        let mut app = fx.app();
        app.apply_settings(Settings { autosave_interval: 1, ..Settings::default() }, &mut [])
            .expect("apply");
        app.open_existing(&doc).expect("open");

        app.close();
        assert_eq!(app.phase(), Phase::NoDocument);
        assert!(!app.autosave_running());
        assert!(!app.doc().autosave_enabled());

        fx.buffer.set_content("after close");
        thread::sleep(TICK * 5);
        assert_eq!(fs::read_to_string(&doc).expect("read"), "original");
    }

    struct Swatch {
        bg: String,
        width: u32,
    }

    impl Themeable for Swatch {
        fn apply_theme(&mut self, palette: &theme::Palette<'_>, settings: &Settings) {
            self.bg = palette.bg.to_owned();
            self.width = settings.max_char_width;
        }
    }

    #[test]
    fn apply_settings_persists_and_rethemes() {
        let fx = Fixture::new();
        let mut app = fx.app();
        let mut swatch = Swatch { bg: String::new(), width: 0 };

        let new = Settings { theme: "paper".to_owned(), max_char_width: 72, ..Settings::default() };
        app.apply_settings(new.clone(), &mut [&mut swatch]).expect("apply");

        assert_eq!(app.settings(), &new);
        assert_eq!(swatch.bg, "#f5f5f5");
        assert_eq!(swatch.width, 72);
        assert_eq!(SettingsStore::new(fx.root.join("settings.json")).load(), new);
    }

    #[test]
    fn invalid_settings_change_nothing() {
        let fx = Fixture::new();
        let mut app = fx.app();
        let bad = Settings { font_size: 0, ..Settings::default() };

        assert!(app.apply_settings(bad, &mut []).is_err());
        assert_eq!(app.settings(), &Settings::default());
        assert!(!fx.root.join("settings.json").exists());
        assert_eq!(fx.notifier.errors().len(), 1);
    }

    #[test]
    fn settings_are_loaded_at_construction() {
        let fx = Fixture::new();
        fx.write("settings.json", r#"{"theme": "monokai"}"#);
        let app = fx.app();
        assert_eq!(app.settings().theme, "monokai");
        assert_eq!(app.settings().font_size, 16);
    }
}
