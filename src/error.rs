//! Error types for the tail library.

use thiserror::Error;

/// The main error type for tail operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors when reading the file or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file to tail does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// No kernel notification facility is available on this platform.
    #[error("No file change notification mechanism available on this platform")]
    WatchUnsupported,

    /// The notification backend stopped delivering events.
    #[error("File watcher closed unexpectedly")]
    WatcherClosed,

    /// File path errors.
    #[error("Invalid file path: {message}")]
    InvalidPath { message: String },

    /// Invalid tail configuration, such as a zero line count.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// A producer or consumer thread panicked.
    #[error("The {role} thread panicked")]
    ThreadPanicked { role: &'static str },
}

impl Error {
    /// Returns true for errors raised by the change notification layer.
    pub fn is_watch_error(&self) -> bool {
        matches!(
            self,
            Error::Watcher(_) | Error::WatchUnsupported | Error::WatcherClosed
        )
    }
}

/// A convenient Result type for tail operations.
pub type Result<T> = std::result::Result<T, Error>;
