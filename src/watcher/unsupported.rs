//! Placeholder for platforms without a supported notification facility.

use super::ChangeWatcher;
use crate::error::{Error, Result};
use std::path::Path;

/// Never constructed: creation always fails with
/// [`Error::WatchUnsupported`].
pub struct UnsupportedWatcher {
    _private: (),
}

impl UnsupportedWatcher {
    pub fn new<P: AsRef<Path>>(_path: P) -> Result<Self> {
        Err(Error::WatchUnsupported)
    }
}

impl ChangeWatcher for UnsupportedWatcher {
    fn wait(&mut self) -> Result<()> {
        Err(Error::WatchUnsupported)
    }
}
