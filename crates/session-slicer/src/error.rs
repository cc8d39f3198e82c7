//! Error types for session slicing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while splitting a print into sessions.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A Z token on a move line is not a number.
    #[error("invalid Z height '{token}' on line {line}")]
    InvalidHeight {
        /// Zero-based index of the offending line.
        line: usize,
        /// The text that failed to parse.
        token: String,
    },

    /// A session end height is not a number.
    #[error("invalid session height: {0}")]
    InvalidThreshold(String),

    /// The input contains no move with X, Y and Z.
    #[error("no printable moves found (no G0/G1 with X, Y and Z)")]
    NoPrintableMoves,

    /// Invalid session settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Reading the source or writing a session file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for session slicing operations.
pub type Result<T> = std::result::Result<T, SessionError>;
