//! A tail replacement: shows the last lines of a file and optionally follows
//! appended content.
//!
//! A producer thread reads complete lines into a fixed-size [`RingBuffer`]
//! that keeps only the newest entries, while a consumer thread writes them
//! out. A [`StartupBarrier`] holds the consumer back until the producer has
//! read the existing content, and in follow mode the producer sleeps in a
//! kernel-backed [`FileChangeWatcher`] between reads instead of polling.
//!
//! # Example
//!
//! ```rust,no_run
//! use log_tail::tail_file;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let printed = tail_file("app.log", 10, false, std::io::stdout())?;
//!     eprintln!("printed {} lines", printed);
//!     Ok(())
//! }
//! ```

mod barrier;
mod config;
mod consumer;
mod error;
mod producer;
mod ring_buffer;
mod tail;
mod watcher;

#[cfg(test)]
mod test_helpers;

// Public API exports
pub use barrier::StartupBarrier;
pub use config::{DEFAULT_LINES, TailConfig};
pub use consumer::Consumer;
pub use error::{Error, Result};
pub use producer::Producer;
pub use ring_buffer::RingBuffer;
pub use tail::{TailHandle, spawn};
pub use watcher::{ChangeWatcher, FileChangeWatcher, WatchInterrupter};

use std::io::Write;
use std::path::Path;

/// Prints the last `lines` lines of `path` to `out` and returns how many
/// were written.
///
/// With `follow` set this keeps writing appended lines and only returns on
/// error.
///
/// # Example
///
/// ```rust,no_run
/// use log_tail::tail_file;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Runs until the file can no longer be watched.
///     tail_file("/var/log/syslog", 100, true, std::io::stdout())?;
///     Ok(())
/// }
/// ```
pub fn tail_file<P, O>(path: P, lines: usize, follow: bool, out: O) -> Result<u64>
where
    P: AsRef<Path>,
    O: Write + Send + 'static,
{
    let config = TailConfig::new(path)?
        .with_lines(lines)?
        .with_follow(follow);
    spawn(config, out)?.join()
}
