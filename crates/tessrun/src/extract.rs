//! Output extraction.
//!
//! Reads the engine's result file and replays it into a [`DocumentSink`] as
//! `begin_region` / `text`* / `end_region`.
use std::path::Path;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::sink::DocumentSink;

/// Buffering granularity for text events, in characters. Chunk boundaries
/// never split a code point and never alter the logical content.
pub const TEXT_CHUNK_CHARS: usize = 1024;

/// Emit the contents of the engine's output file into the sink.
///
/// A missing file is the engine's way of reporting "no recognizable text"
/// (blank page, for instance): it yields no events and no error. An existing
/// file - even an empty one - produces a `begin_region`/`end_region` pair
/// with its text in between.
///
/// The file is fully read and closed before the first sink call, so a sink
/// rejection can never leave it open; the error then propagates as
/// [`EngineError::Sink`].
pub async fn emit_output<S>(path: &Path, sink: &mut S) -> Result<()>
where
    S: DocumentSink + ?Sized,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "engine produced no output file");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let text = String::from_utf8_lossy(&bytes);

    sink.begin_region().map_err(|source| EngineError::Sink { source })?;
    let mut rest: &str = &text;
    while !rest.is_empty() {
        let boundary = chunk_boundary(rest);
        let (chunk, tail) = rest.split_at(boundary);
        sink.text(chunk).map_err(|source| EngineError::Sink { source })?;
        rest = tail;
    }
    sink.end_region().map_err(|source| EngineError::Sink { source })?;
    Ok(())
}

/// Byte offset of the boundary after at most [`TEXT_CHUNK_CHARS`] characters.
fn chunk_boundary(text: &str) -> usize {
    text.char_indices()
        .nth(TEXT_CHUNK_CHARS)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}
