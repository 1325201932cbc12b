//! Downstream document-event contract.
//!
//! Recognized text leaves this crate as a flat event sequence:
//! `begin_region`, zero or more `text` chunks, `end_region`. Chunk
//! boundaries are a buffering detail of the emitter and carry no meaning;
//! concatenating the chunks reproduces the engine output exactly.
use thiserror::Error;

/// Error a sink returns when it rejects an event.
///
/// Sink rejections are fatal to the run, but cleanup (closing the output
/// file, releasing scratch files) completes before they propagate.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SinkError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SinkError {
    /// Create a sink error from a message.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a sink error wrapping an underlying error.
    pub fn with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Receiver for the structured-document events produced by an OCR run.
///
/// Implementations may buffer, forward, or transform the events. Returning
/// an error from any method aborts emission; the run surfaces it as a
/// sink-kind failure after its own cleanup has finished.
pub trait DocumentSink {
    /// A new document region is starting.
    fn begin_region(&mut self) -> Result<(), SinkError>;

    /// A chunk of recognized text. Never empty; never splits a code point.
    fn text(&mut self, chunk: &str) -> Result<(), SinkError>;

    /// The current document region is complete.
    fn end_region(&mut self) -> Result<(), SinkError>;
}

/// Sink that concatenates every text chunk into an owned `String`.
#[derive(Debug, Default)]
pub struct StringSink {
    content: String,
}

impl StringSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text accumulated so far.
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Consume the sink, returning the accumulated text.
    pub fn into_string(self) -> String {
        self.content
    }
}

impl DocumentSink for StringSink {
    fn begin_region(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn text(&mut self, chunk: &str) -> Result<(), SinkError> {
        self.content.push_str(chunk);
        Ok(())
    }

    fn end_region(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
