// ── Autosave worker ───────────────────────────────────────────────────────────
//
// One background thread per active document.  Every `interval` ticks it
// snapshots the shared buffer and writes it to the path it was started with.
//
// The worker never mutates document state: it reads the enabled flag, the
// interval and the buffer, and performs the disk write.  Cancellation goes
// over a channel so `stop()` interrupts the sleep immediately.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc::{self, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    editor::{EditorSurface, SharedBuffer},
    error::QuillError,
    platform::Notifier,
};

/// Production tick: `autosave_interval` is measured in seconds.
pub(crate) const SECOND: Duration = Duration::from_secs(1);

/// Everything a worker needs, handed over at `start`.
pub(crate) struct AutosaveTarget {
    pub(crate) path: PathBuf,
    pub(crate) enabled: Arc<AtomicBool>,
    pub(crate) source: SharedBuffer,
    pub(crate) notifier: Arc<dyn Notifier>,
}

struct Worker {
    path: PathBuf,
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Owner of the (at most one) autosave thread.
pub(crate) struct AutosavePump {
    tick: Duration,
    interval: Arc<AtomicU64>,
    worker: Option<Worker>,
    #[cfg(test)]
    refuse_spawn: bool,
}

impl AutosavePump {
    /// A stopped pump waking every `interval` × `tick`.
    pub(crate) fn new(tick: Duration, interval: u64) -> Self {
        Self {
            tick,
            interval: Arc::new(AtomicU64::new(interval)),
            worker: None,
            #[cfg(test)]
            refuse_spawn: false,
        }
    }

    /// Make every later `start` fail as if the OS refused a new thread.
    #[cfg(test)]
    pub(crate) fn refuse_spawns(&mut self) {
        self.refuse_spawn = true;
    }

    /// Change the interval; a running worker picks it up after its current
    /// sleep.
    pub(crate) fn set_interval(&self, interval: u64) {
        self.interval.store(interval, Ordering::Relaxed);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Path the running worker writes to, if any.
    pub(crate) fn target_path(&self) -> Option<&Path> {
        self.worker.as_ref().map(|w| w.path.as_path())
    }

    /// Spawn the worker.
    ///
    /// Returns `false` and leaves the running worker untouched if one is
    /// already active; call `stop()` first to retarget.
    pub(crate) fn start(&mut self, target: AutosaveTarget) -> bool {
        if self.worker.is_some() {
            tracing::debug!("autosave already running");
            return false;
        }

        let (stop, stop_rx) = mpsc::channel();
        let tick = self.tick;
        let interval = Arc::clone(&self.interval);
        let path = target.path.clone();
        tracing::debug!(path = %path.display(), "autosave started");

        let builder = thread::Builder::new().name("autosave".to_owned());
        #[cfg(test)]
        {
            if self.refuse_spawn {
                tracing::error!("could not spawn autosave thread");
                return false;
            }
        }
        let handle = builder.spawn(move || loop {
            let ticks = interval.load(Ordering::Relaxed).max(1);
            let wait = tick * u32::try_from(ticks).unwrap_or(u32::MAX);
            match stop_rx.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => persist(&target),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        match handle {
            Ok(handle) => {
                self.worker = Some(Worker { path, stop, handle });
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "could not spawn autosave thread");
                false
            }
        }
    }

    /// Signal the worker and wait for it to finish its current write.
    /// No-op when stopped.
    pub(crate) fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop.send(());
            if worker.handle.join().is_err() {
                tracing::error!("autosave thread panicked");
            }
            tracing::debug!(path = %worker.path.display(), "autosave stopped");
        }
    }
}

impl Drop for AutosavePump {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One autosave tick.
fn persist(target: &AutosaveTarget) {
    if !target.enabled.load(Ordering::Acquire) {
        return;
    }
    let content = target.source.content();
    match fs::write(&target.path, content.as_bytes()) {
        Ok(()) => tracing::trace!(path = %target.path.display(), "autosaved"),
        Err(source) => {
            let e = QuillError::Save {
                path: target.path.clone(),
                source,
            };
            target.notifier.error("Autosave", &e.to_string());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
