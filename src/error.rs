//! Error types for tex2qmd library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tex2qmd operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a document.
///
/// Only document-level failures are errors. Local misses inside the
/// repair passes (an anchor that cannot be found, an unknown reference
/// key, unbalanced braces) leave the text unchanged instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The LaTeX source file does not exist.
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The transducer program could not be started.
    #[error("Cannot run transducer '{program}': {source}")]
    TransducerUnavailable {
        /// Program that was invoked
        program: String,
        /// Underlying spawn error
        #[source]
        source: io::Error,
    },

    /// The transducer ran but reported a failure.
    #[error("Transducer '{name}' failed (status {}): {stderr}", status.map_or_else(|| "unknown".to_string(), |s| s.to_string()))]
    Transducer {
        /// Transducer name
        name: String,
        /// Exit status, if the process exited normally
        status: Option<i32>,
        /// Diagnostic output
        stderr: String,
    },

    /// A configured pattern is not a valid regular expression.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The book manifest is inconsistent.
    #[error("Invalid manifest: {0}")]
    Manifest(String),

    /// A legislation entry carries an unparseable date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
