//! inotify backend for Linux and Android.

use super::{ChangeWatcher, EventQueue, WatchInterrupter};
use crate::error::Result;
use notify::event::ModifyKind;
use notify::{Config, EventKind, INotifyWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Watches a single file for `IN_MODIFY`.
pub struct InotifyWatcher {
    _backend: INotifyWatcher,
    queue: EventQueue,
    file_path: PathBuf,
}

impl InotifyWatcher {
    /// Registers a watch on `path`, which must already exist.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let (queue, handler) = EventQueue::new(&file_path);

        let mut backend = INotifyWatcher::new(handler, Config::default())?;
        backend.watch(&file_path, RecursiveMode::NonRecursive)?;
        debug!(path = %file_path.display(), "registered inotify watch");

        Ok(Self {
            _backend: backend,
            queue,
            file_path,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

// Appends and in-place writes both surface as IN_MODIFY.
fn is_modification(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}

impl ChangeWatcher for InotifyWatcher {
    fn wait(&mut self) -> Result<()> {
        self.queue.wait_for(is_modification)
    }

    fn interrupter(&self) -> Option<WatchInterrupter> {
        Some(self.queue.interrupter())
    }
}
