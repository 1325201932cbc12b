//! Tessrun - bounded Tesseract subprocess orchestration.
//!
//! Tessrun runs the external `tesseract` OCR engine against raster images
//! and streams the recognized text into a structured document-event sink.
//! The engine is treated as an opaque, potentially hanging program: every
//! run is time-bounded, both of its pipes are drained concurrently so it can
//! never deadlock on a full buffer, and every scratch file is deleted on
//! every exit path - success, timeout, cancellation, or a missing engine.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tessrun::{EngineConfig, OcrRunner, StringSink};
//!
//! # async fn example() -> tessrun::Result<()> {
//! let runner = OcrRunner::new(EngineConfig::default())?;
//! let mut sink = StringSink::new();
//! runner.process_file("scanned.png".as_ref(), &mut sink).await?;
//! println!("Recognized: {}", sink.as_str());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `probe`: is the engine invocable at all? (absence is not an error)
//! - `raster`: flatten in-memory images to engine-compatible PNG files
//! - `scratch`: per-run scratch files, released on every exit path
//! - `invocation`: the typed engine command, testable without spawning
//! - `process`: spawn, pipe drains, and the timeout/cancellation watchdog
//! - `extract` / `sink`: replay the result file as document events
//! - `runner`: the orchestration entry point
//!
//! Recognition is treated as optional enrichment: an absent engine or an
//! input outside the configured size bounds yields a successful empty
//! result, not an error.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod extract;
pub mod invocation;
pub mod probe;
pub mod process;
pub mod raster;
pub mod runner;
pub mod scratch;
pub mod sink;

pub use config::{DEFAULT_TIMEOUT_SECS, EngineConfig, PsmMode};
pub use error::{EngineError, Result};
pub use extract::{TEXT_CHUNK_CHARS, emit_output};
pub use invocation::EngineInvocation;
pub use probe::{engine_available, require_engine};
pub use process::{EngineExit, run_engine};
pub use raster::normalize_to_png;
pub use runner::{OcrRunner, SUPPORTED_MEDIA_TYPES};
pub use scratch::ScratchArea;
pub use sink::{DocumentSink, SinkError, StringSink};
