//! Tail configuration.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Number of lines shown when no count is requested.
pub const DEFAULT_LINES: usize = 1000;

/// What to tail and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailConfig {
    path: PathBuf,
    lines: usize,
    follow: bool,
}

impl TailConfig {
    /// Tails the last [`DEFAULT_LINES`] lines of `path` without following.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidPath {
                message: "path is empty".to_string(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            lines: DEFAULT_LINES,
            follow: false,
        })
    }

    /// Sets the number of trailing lines to keep.
    pub fn with_lines(mut self, lines: usize) -> Result<Self> {
        if lines == 0 {
            return Err(Error::Config {
                message: "tail length must be at least 1".to_string(),
            });
        }
        self.lines = lines;
        Ok(self)
    }

    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn follow(&self) -> bool {
        self.follow
    }
}
