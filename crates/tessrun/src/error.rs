//! Error types for tessrun.
//!
//! All fallible operations return [`Result`]. The variants map one-to-one to
//! the ways an OCR run can go wrong:
//!
//! - `Io` (from `std::io::Error`) bubbles up unchanged - file system errors
//!   are real system problems and must surface as-is
//! - `Unavailable` is the expected negative result of the capability probe;
//!   the runner converts it into a successful empty result, never a failure
//! - `Timeout` and `Cancelled` are only returned after the engine process
//!   has been force-terminated and reaped
use thiserror::Error;

use crate::sink::SinkError;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error type for all tessrun operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine binary could not be invoked. Not a failure at the run
    /// level: recognition is optional enrichment and its absence yields an
    /// empty result.
    #[error("OCR engine is not available: {0}")]
    Unavailable(String),

    /// The engine executable exists but could not be spawned.
    #[error("failed to launch OCR engine '{program}'")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The bounded wait elapsed before the engine exited. The process was
    /// killed and reaped before this was returned.
    #[error("OCR engine timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The caller cancelled the run before the engine exited. The process
    /// was killed and reaped before this was returned; the cancellation
    /// token stays cancelled so upstream observers see it too.
    #[error("OCR run cancelled before the engine exited")]
    Cancelled,

    /// Image normalization could not produce a valid engine input file.
    #[error("image encoding failed: {message}")]
    Encoding {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The downstream document sink rejected an event mid-emission. The
    /// output file is closed and scratch cleanup still runs before this
    /// propagates.
    #[error("document sink rejected OCR output")]
    Sink {
        #[source]
        source: SinkError,
    },

    /// Invalid engine configuration.
    #[error("invalid engine configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create an Encoding error.
    pub fn encoding<S: Into<String>>(message: S) -> Self {
        Self::Encoding {
            message: message.into(),
            source: None,
        }
    }

    /// Create an Encoding error with source.
    pub fn encoding_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Encoding {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
