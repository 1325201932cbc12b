//! Image normalization.
//!
//! The engine accepts a narrow set of raster formats; in-memory images of
//! arbitrary pixel layout are flattened to true-color PNG files before
//! recognition.
use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::error::{EngineError, Result};
use crate::scratch::ScratchArea;

/// Re-encode an in-memory raster into a true-color PNG scratch file.
///
/// Flattening to RGB discards alpha and indexed-color ambiguity; the source
/// image is not mutated. The returned path is owned by `scratch`, so no
/// partial file survives an error in the caller.
pub async fn normalize_to_png(image: &DynamicImage, scratch: &mut ScratchArea) -> Result<PathBuf> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EngineError::encoding(format!(
            "invalid image dimensions {width}x{height}"
        )));
    }

    let flattened = image.to_rgb8();
    let mut encoded = Cursor::new(Vec::new());
    flattened
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(|err| EngineError::encoding_with_source("PNG encoding failed", err))?;

    let path = scratch.acquire().await?;
    tokio::fs::write(&path, encoded.into_inner()).await?;
    Ok(path)
}
