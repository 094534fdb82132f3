//! kqueue backend for the BSDs, iOS and (optionally) macOS.

use super::{ChangeWatcher, EventQueue, WatchInterrupter};
use crate::error::Result;
use notify::event::{DataChange, ModifyKind};
use notify::{Config, EventKind, KqueueWatcher as KqueueBackend, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Watches a single file with an `EVFILT_VNODE` filter for writes and
/// extensions.
///
/// The backend keeps the vnode filter registered after each delivery, so
/// consecutive calls to [`wait`](ChangeWatcher::wait) stay armed.
pub struct KqueueWatcher {
    _backend: KqueueBackend,
    queue: EventQueue,
    file_path: PathBuf,
}

impl KqueueWatcher {
    /// Opens `path` and registers it with a kernel event queue.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let (queue, handler) = EventQueue::new(&file_path);

        let mut backend = KqueueBackend::new(handler, Config::default())?;
        backend.watch(&file_path, RecursiveMode::NonRecursive)?;
        debug!(path = %file_path.display(), "registered kqueue vnode filter");

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

// NOTE_WRITE arrives as a data change, NOTE_EXTEND as a size change.
fn is_write_or_extend(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(
            DataChange::Any | DataChange::Size | DataChange::Content
        ))
    )
}

impl ChangeWatcher for KqueueWatcher {
    fn wait(&mut self) -> Result<()> {
        self.queue.wait_for(is_write_or_extend)
    }

    fn interrupter(&self) -> Option<WatchInterrupter> {
        Some(self.queue.interrupter())
    }
}
