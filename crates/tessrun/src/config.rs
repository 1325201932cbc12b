//! Engine configuration.
//!
//! [`EngineConfig`] is resolved once by the caller and shared immutably
//! across concurrent runs. Values are caller-supplied; apart from the size
//! bound ordering nothing is validated here - an invalid language code, for
//! example, is the engine's problem to report.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};

/// Default bounded-wait limit for one engine run, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Name of the engine executable, resolved against [`EngineConfig::tesseract_path`].
pub const ENGINE_BINARY: &str = "tesseract";

/// Page Segmentation Mode accepted by the engine's `-psm` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PsmMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertical = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
}

impl PsmMode {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(PsmMode::OsdOnly),
            1 => Ok(PsmMode::AutoOsd),
            2 => Ok(PsmMode::AutoOnly),
            3 => Ok(PsmMode::Auto),
            4 => Ok(PsmMode::SingleColumn),
            5 => Ok(PsmMode::SingleBlockVertical),
            6 => Ok(PsmMode::SingleBlock),
            7 => Ok(PsmMode::SingleLine),
            8 => Ok(PsmMode::SingleWord),
            9 => Ok(PsmMode::CircleWord),
            10 => Ok(PsmMode::SingleChar),
            _ => Err(EngineError::Config(format!("invalid PSM mode value: {value}"))),
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Token passed to the engine on the command line.
    pub fn as_arg(self) -> String {
        self.as_u8().to_string()
    }
}

impl Default for PsmMode {
    fn default() -> Self {
        PsmMode::Auto
    }
}

/// Immutable per-invocation configuration for the external OCR engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine install directory. Empty means "look up `tesseract` on the
    /// system search path". When non-empty it is also exported as
    /// `TESSDATA_PREFIX` so the engine finds its data files.
    pub tesseract_path: String,

    /// Recognition language code, e.g. `eng` or `eng+deu`.
    pub language: String,

    /// Page segmentation mode.
    pub page_seg_mode: PsmMode,

    /// Smallest input file eligible for recognition, in bytes.
    pub min_file_size: u64,

    /// Largest input file eligible for recognition, in bytes.
    pub max_file_size: u64,

    /// Bounded-wait limit for one engine run, in seconds.
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tesseract_path: String::new(),
            language: "eng".to_string(),
            page_seg_mode: PsmMode::default(),
            min_file_size: 0,
            max_file_size: u64::MAX,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    /// Enforce the single structural invariant: `min_file_size <= max_file_size`.
    pub fn validate(&self) -> Result<()> {
        if self.min_file_size > self.max_file_size {
            return Err(EngineError::Config(format!(
                "min_file_size ({}) exceeds max_file_size ({})",
                self.min_file_size, self.max_file_size
            )));
        }
        Ok(())
    }

    /// Whether an input of `size` bytes falls inside the configured bounds.
    pub fn size_in_bounds(&self, size: u64) -> bool {
        (self.min_file_size..=self.max_file_size).contains(&size)
    }

    /// Resolved engine executable: bare name for PATH lookup when no install
    /// path is configured, otherwise joined onto the install directory.
    pub fn engine_binary(&self) -> PathBuf {
        if self.tesseract_path.is_empty() {
            PathBuf::from(ENGINE_BINARY)
        } else {
            Path::new(&self.tesseract_path).join(ENGINE_BINARY)
        }
    }
}
