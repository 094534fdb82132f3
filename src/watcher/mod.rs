//! Blocking "wake me when this file changes" primitive.
//!
//! One backend per kernel notification facility is compiled in, chosen by
//! target platform:
//!
//! * inotify on Linux and Android
//! * kqueue on the BSDs and iOS, and on macOS with the `kqueue` feature
//!
//! Everywhere else [`FileChangeWatcher::new`] fails with
//! [`Error::WatchUnsupported`]; there is no polling fallback.

use crate::error::{Error, Result};
use notify::{Event, EventHandler, EventKind};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::trace;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod inotify;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use inotify::InotifyWatcher as FileChangeWatcher;

#[cfg(any(
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly",
    target_os = "ios",
    all(target_os = "macos", feature = "kqueue")
))]
mod kqueue;
#[cfg(any(
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly",
    target_os = "ios",
    all(target_os = "macos", feature = "kqueue")
))]
pub use kqueue::KqueueWatcher as FileChangeWatcher;

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly",
    target_os = "ios",
    all(target_os = "macos", feature = "kqueue")
)))]
mod unsupported;
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly",
    target_os = "ios",
    all(target_os = "macos", feature = "kqueue")
)))]
pub use unsupported::UnsupportedWatcher as FileChangeWatcher;

/// Something that can block until a watched file changes.
pub trait ChangeWatcher: Send {
    /// Blocks until the file is modified or the wait is interrupted.
    ///
    /// Every call waits for a new change; implementations keep their kernel
    /// registration armed between calls.
    fn wait(&mut self) -> Result<()>;

    /// Handle that makes a pending or future `wait` return early.
    fn interrupter(&self) -> Option<WatchInterrupter> {
        None
    }
}

/// Message delivered to a waiting watcher.
#[derive(Debug)]
pub(crate) enum Wakeup {
    Notify(notify::Result<Event>),
    Interrupt,
}

/// Wakes a watcher's `wait` without a file change, as a signal would.
#[derive(Debug, Clone)]
pub struct WatchInterrupter {
    tx: mpsc::WeakUnboundedSender<Wakeup>,
}

impl WatchInterrupter {
    /// Returns false if the watcher no longer exists.
    pub fn interrupt(&self) -> bool {
        self.tx
            .upgrade()
            .is_some_and(|tx| tx.send(Wakeup::Interrupt).is_ok())
    }
}

/// Backend callback feeding an [`EventQueue`].
pub(crate) struct EventForwarder {
    tx: mpsc::UnboundedSender<Wakeup>,
}

impl EventHandler for EventForwarder {
    fn handle_event(&mut self, event: notify::Result<Event>) {
        let _ = self.tx.send(Wakeup::Notify(event));
    }
}

/// Channel between a notify backend callback and the blocked waiter.
pub(crate) struct EventQueue {
    receiver: mpsc::UnboundedReceiver<Wakeup>,
    weak_tx: mpsc::WeakUnboundedSender<Wakeup>,
    file_name: String,
}

impl EventQueue {
    /// Creates the queue and the event handler to hand to the backend.
    pub(crate) fn new(file_path: &Path) -> (Self, EventForwarder) {
        let (tx, rx) = mpsc::unbounded_channel();
        let weak_tx = tx.downgrade();

        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        (
            Self {
                receiver: rx,
                weak_tx,
                file_name,
            },
            EventForwarder { tx },
        )
    }

    pub(crate) fn interrupter(&self) -> WatchInterrupter {
        WatchInterrupter {
            tx: self.weak_tx.clone(),
        }
    }

    /// Blocks until an event accepted by `is_change` arrives for our file.
    ///
    /// Events already queued behind it are drained so a burst of writes
    /// produces a single wake-up.
    pub(crate) fn wait_for(&mut self, is_change: fn(&EventKind) -> bool) -> Result<()> {
        loop {
            let wakeup = self.receiver.blocking_recv().ok_or(Error::WatcherClosed)?;
            if self.should_wake(wakeup, is_change)? {
                break;
            }
        }

        while let Ok(pending) = self.receiver.try_recv() {
            self.should_wake(pending, is_change)?;
        }

        Ok(())
    }

    fn should_wake(&self, wakeup: Wakeup, is_change: fn(&EventKind) -> bool) -> Result<bool> {
        match wakeup {
            Wakeup::Interrupt => {
                trace!("file watch interrupted");
                Ok(true)
            }
            // Overflow: events were dropped, so the file may have changed.
            Wakeup::Notify(Ok(event)) if event.need_rescan() => {
                trace!("backend requested rescan");
                Ok(true)
            }
            Wakeup::Notify(Ok(event)) => {
                let relevant =
                    is_change(&event.kind) && is_event_relevant_to_file(&event, &self.file_name);
                if !relevant {
                    trace!(kind = ?event.kind, "ignoring file event");
                }
                Ok(relevant)
            }
            Wakeup::Notify(Err(e)) if is_interrupted(&e) => {
                trace!("file watch interrupted by signal");
                Ok(true)
            }
            Wakeup::Notify(Err(e)) => Err(e.into()),
        }
    }
}

/// Check if a notify event is relevant to a specific file
pub(crate) fn is_event_relevant_to_file(event: &Event, target_file_name: &str) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy() == target_file_name)
            .unwrap_or(false)
    })
}

fn is_interrupted(error: &notify::Error) -> bool {
    matches!(&error.kind, notify::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::Interrupted)
}
