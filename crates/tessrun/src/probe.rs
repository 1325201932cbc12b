//! Capability probe.
//!
//! A cheap invocation that answers one question: can the configured engine
//! be executed at all? "Not installed" is the expected negative answer, not
//! an error - the runner skips recognition and carries on.
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Check whether the configured engine binary is invocable.
///
/// Success means the binary could be spawned and ran to completion; the exit
/// code is deliberately not inspected. Only a spawn failure (typically
/// "command not found") reports unavailability.
pub async fn engine_available(config: &EngineConfig) -> bool {
    let binary = config.engine_binary();
    let result = Command::new(&binary)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match result {
        Ok(_) => true,
        Err(err) => {
            debug!(
                engine = %binary.display(),
                error = %err,
                "OCR engine not invocable, recognition will be skipped"
            );
            false
        }
    }
}

/// [`engine_available`] as a hard requirement, for callers that treat a
/// missing engine as an error instead of a skip.
pub async fn require_engine(config: &EngineConfig) -> Result<()> {
    if engine_available(config).await {
        Ok(())
    } else {
        Err(EngineError::Unavailable(format!(
            "'{}' could not be executed; install Tesseract or point the engine install path at it",
            config.engine_binary().display()
        )))
    }
}
