//! Test utilities for temporary log files, capturing output and scripting
//! watcher wake-ups.

use crate::error::{Error, Result};
use crate::watcher::ChangeWatcher;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

pub struct TempLogFile {
    pub path: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl TempLogFile {
    /// Create a new, empty temporary log file
    pub fn new() -> io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("test.log");

        File::create(&path)?;

        Ok(Self {
            path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a temporary log file with one initial line
    pub fn with_content(content: &str) -> io::Result<Self> {
        let temp_file = Self::new()?;
        temp_file.append_content(content)?;
        Ok(temp_file)
    }

    /// Create a temporary log file with the given lines, each terminated
    pub fn with_lines(lines: &[&str]) -> io::Result<Self> {
        let temp_file = Self::new()?;
        for line in lines {
            temp_file.append_content(line)?;
        }
        Ok(temp_file)
    }

    /// Append a terminated line to the temporary log file
    pub fn append_content(&self, content: &str) -> io::Result<()> {
        Self::append_to(&self.path, content)
    }

    /// Append raw bytes without a trailing newline (a write in progress)
    pub fn append_raw(&self, content: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(content.as_bytes())?;
        file.flush()
    }

    /// Append a terminated line to any file
    pub fn append_to(path: &Path, content: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(path)?;

        writeln!(file, "{}", content)?;
        file.flush()
    }

    /// Get the path to the temporary file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A `Write` sink that forwards every completed line through a channel.
pub struct ChannelWriter {
    pending: Vec<u8>,
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelWriter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                pending: Vec::new(),
                tx,
            },
            rx,
        )
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            if byte == b'\n' {
                let line = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                self.tx
                    .send(line)
                    .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))?;
            } else {
                self.pending.push(byte);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A sink whose writes always fail, like stdout on a closed pipe.
pub struct BrokenWriter;

impl Write for BrokenWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

type Step = Box<dyn FnOnce() -> Result<()> + Send>;

/// A watcher that runs one scripted step per `wait` call.
///
/// Once the script is exhausted `wait` fails with `WatcherClosed`, which
/// ends the producer's follow loop.
#[derive(Default)]
pub struct ScriptedWatcher {
    steps: VecDeque<Step>,
    waits: usize,
}

impl ScriptedWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `wait` calls made so far.
    pub fn waits(&self) -> usize {
        self.waits
    }

    pub fn then<F>(mut self, step: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.steps.push_back(Box::new(step));
        self
    }
}

impl ChangeWatcher for ScriptedWatcher {
    fn wait(&mut self) -> Result<()> {
        self.waits += 1;
        match self.steps.pop_front() {
            Some(step) => step(),
            None => Err(Error::WatcherClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_log_file_creation() {
        let temp_file = TempLogFile::new().unwrap();
        assert!(temp_file.path().exists());
    }

    #[test]
    fn test_with_lines_terminates_each_line() {
        let temp_file = TempLogFile::with_lines(&["a", "b"]).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "a\nb\n");
    }

    #[test]
    fn test_append_raw_has_no_terminator() {
        let temp_file = TempLogFile::with_content("done").unwrap();
        temp_file.append_raw("partial").unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "done\npartial");
    }

    #[test]
    fn test_channel_writer_splits_lines() {
        let (mut writer, mut rx) = ChannelWriter::new();
        write!(writer, "one\ntw").unwrap();
        writeln!(writer, "o").unwrap();

        assert_eq!(rx.try_recv().unwrap(), "one");
        assert_eq!(rx.try_recv().unwrap(), "two");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_scripted_watcher_runs_steps_in_order() {
        let mut watcher = ScriptedWatcher::new()
            .then(|| Ok(()))
            .then(|| Err(Error::WatchUnsupported));

        assert!(watcher.wait().is_ok());
        assert!(matches!(watcher.wait(), Err(Error::WatchUnsupported)));
        assert!(matches!(watcher.wait(), Err(Error::WatcherClosed)));
        assert_eq!(watcher.waits(), 3);
    }
}
