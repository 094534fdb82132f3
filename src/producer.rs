//! The producer side: streams complete lines from the file into the ring
//! buffer, then keeps following appends when asked to.

use crate::barrier::StartupBarrier;
use crate::error::{Error, Result};
use crate::ring_buffer::RingBuffer;
use crate::watcher::{ChangeWatcher, FileChangeWatcher, WatchInterrupter};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Reads the tailed file and feeds its lines into a [`RingBuffer`].
///
/// The read position always sits on a line boundary: a trailing line without
/// its `\n` is left for the next pass, so a line being written is never
/// split across two entries.
pub struct Producer<W = FileChangeWatcher> {
    file_path: PathBuf,
    buffer: Arc<RingBuffer<String>>,
    barrier: Arc<StartupBarrier>,
    watcher: Option<W>,
    position: u64,
}

impl Producer<FileChangeWatcher> {
    /// Creates a producer for `path`, registering the platform watcher up
    /// front when `follow` is set so no append after this call is missed.
    pub fn new<P: AsRef<Path>>(
        path: P,
        follow: bool,
        buffer: Arc<RingBuffer<String>>,
        barrier: Arc<StartupBarrier>,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let watcher = if follow {
            Some(FileChangeWatcher::new(path)?)
        } else {
            None
        };

        Ok(Self::with_watcher(path, buffer, barrier, watcher))
    }
}

impl<W: ChangeWatcher> Producer<W> {
    /// Creates a producer with an explicit watcher; `None` disables follow
    /// mode.
    pub fn with_watcher<P: AsRef<Path>>(
        path: P,
        buffer: Arc<RingBuffer<String>>,
        barrier: Arc<StartupBarrier>,
        watcher: Option<W>,
    ) -> Self {
        Self {
            file_path: path.as_ref().to_path_buf(),
            buffer,
            barrier,
            watcher,
            position: 0,
        }
    }

    pub fn interrupter(&self) -> Option<WatchInterrupter> {
        self.watcher.as_ref().and_then(ChangeWatcher::interrupter)
    }

    /// Byte offset of the first line not yet read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Runs the initial read, meets the consumer at the startup barrier and
    /// then follows the file until an error occurs or the consumer is gone.
    ///
    /// The barrier is passed exactly once even if the initial read fails; in
    /// that case the buffer is emptied first so nothing gets printed. The
    /// buffer is closed when this returns.
    pub fn run(mut self) -> Result<()> {
        let initial = self.read_pass();
        match &initial {
            Ok(lines) => debug!(lines, position = self.position, "initial read complete"),
            Err(e) => {
                let dropped = self.buffer.clear();
                debug!(error = %e, dropped, "initial read failed");
            }
        }

        self.barrier.arrive();

        let outcome = initial.and_then(|_| self.follow_changes());
        self.buffer.close();
        outcome
    }

    fn follow_changes(&mut self) -> Result<()> {
        let Some(mut watcher) = self.watcher.take() else {
            return Ok(());
        };

        loop {
            watcher.wait()?;

            if self.buffer.is_closed() {
                debug!("consumer finished, no longer following");
                return Ok(());
            }

            // A wake-up is only a hint: the length check in read_pass decides
            // whether there is anything to read.
            let lines = self.read_pass()?;
            trace!(lines, position = self.position, "follow read complete");
        }
    }

    /// Reads every complete line past the current position into the buffer.
    ///
    /// Returns the number of lines pushed.
    pub fn read_pass(&mut self) -> Result<usize> {
        let mut file = open_file(&self.file_path)?;
        let current_size = file.metadata()?.len();

        if !has_new_content(current_size, self.position) {
            trace!(current_size, position = self.position, "no new content");
            return Ok(0);
        }

        file.seek(SeekFrom::Start(self.position))?;
        let mut reader = BufReader::new(file);
        let mut raw = Vec::new();
        let mut pushed = 0;

        loop {
            raw.clear();
            let read = reader.read_until(b'\n', &mut raw)?;
            if read == 0 {
                break;
            }

            let Some(line) = complete_line(&raw) else {
                trace!(bytes = read, "leaving partial line for next pass");
                break;
            };

            self.buffer.push(String::from_utf8_lossy(line).into_owned());
            self.position += read as u64;
            pushed += 1;
        }

        Ok(pushed)
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound {
            path: path.display().to_string(),
        },
        _ => Error::Io(e),
    })
}

/// Truncation is not tracked, so a shrunken file simply has nothing new.
fn has_new_content(current_size: u64, position: u64) -> bool {
    current_size > position
}

/// Strips the `\n` terminator, or returns `None` for an unterminated line.
fn complete_line(raw: &[u8]) -> Option<&[u8]> {
    raw.strip_suffix(b"\n")
}
