//! Run orchestration.
//!
//! [`OcrRunner`] wires the components into the full flow: capability probe,
//! size gate, scratch allocation, bounded engine execution, output
//! extraction, release. Each call owns its scratch area, its process handle,
//! and its watchdog state; concurrent runs share nothing but the config.
use std::path::Path;
use std::time::Duration;

use image::DynamicImage;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::extract;
use crate::invocation::EngineInvocation;
use crate::probe;
use crate::process;
use crate::raster;
use crate::scratch::ScratchArea;
use crate::sink::DocumentSink;

/// Media types the OCR path accepts when wired into a document pipeline.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/tiff",
    "image/x-ms-bmp",
    "image/gif",
];

/// A configured OCR orchestrator.
///
/// Holds only the immutable [`EngineConfig`]; cloning is cheap and a single
/// runner can serve any number of concurrent runs.
#[derive(Debug, Clone)]
pub struct OcrRunner {
    config: EngineConfig,
}

impl OcrRunner {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recognize the image file at `input`, streaming text into `sink`.
    ///
    /// Produces a successful empty result (no events) when the engine is not
    /// installed or the input falls outside the configured size bounds.
    pub async fn process_file<S>(&self, input: &Path, sink: &mut S) -> Result<()>
    where
        S: DocumentSink + ?Sized,
    {
        self.process_file_with_cancel(input, sink, &CancellationToken::new())
            .await
    }

    /// [`process_file`](Self::process_file) with caller-controlled
    /// cancellation. Cancelling the token terminates the engine process and
    /// fails the run with [`EngineError::Cancelled`](crate::EngineError::Cancelled).
    pub async fn process_file_with_cancel<S>(
        &self,
        input: &Path,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        S: DocumentSink + ?Sized,
    {
        if !probe::engine_available(&self.config).await {
            return Ok(());
        }

        let size = tokio::fs::metadata(input).await?.len();
        if !self.config.size_in_bounds(size) {
            debug!(
                size,
                min = self.config.min_file_size,
                max = self.config.max_file_size,
                "input outside OCR size bounds, skipping"
            );
            return Ok(());
        }

        let mut scratch = ScratchArea::new();
        let outcome = self.recognize(input, sink, cancel, &mut scratch).await;
        scratch.release_all().await;
        outcome
    }

    /// Recognize an in-memory image, streaming text into `sink`.
    pub async fn process_image<S>(&self, image: &DynamicImage, sink: &mut S) -> Result<()>
    where
        S: DocumentSink + ?Sized,
    {
        self.process_image_with_cancel(image, sink, &CancellationToken::new())
            .await
    }

    /// [`process_image`](Self::process_image) with caller-controlled
    /// cancellation.
    pub async fn process_image_with_cancel<S>(
        &self,
        image: &DynamicImage,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        S: DocumentSink + ?Sized,
    {
        if !probe::engine_available(&self.config).await {
            return Ok(());
        }

        let mut scratch = ScratchArea::new();
        let outcome = async {
            let normalized = raster::normalize_to_png(image, &mut scratch).await?;
            self.process_file_with_cancel(&normalized, sink, cancel).await
        }
        .await;
        scratch.release_all().await;
        outcome
    }

    /// One engine run against an in-bounds input. The scratch area outlives
    /// the subprocess and the extraction, so release happens strictly after
    /// both are done.
    async fn recognize<S>(
        &self,
        input: &Path,
        sink: &mut S,
        cancel: &CancellationToken,
        scratch: &mut ScratchArea,
    ) -> Result<()>
    where
        S: DocumentSink + ?Sized,
    {
        let output_base = scratch.acquire().await?;
        let invocation = EngineInvocation::new(&self.config, input, &output_base);
        let timeout = Duration::from_secs(self.config.timeout_secs);

        // Exit status intentionally unused: the engine signals failure by
        // not writing the output file, not by its exit code.
        let _exit = process::run_engine(&invocation, timeout, cancel).await?;

        let output_file = EngineInvocation::output_file(&output_base);
        scratch.register(output_file.clone());
        extract::emit_output(&output_file, sink).await
    }
}
