//! Scratch-file broker.
//!
//! One [`ScratchArea`] is scoped to exactly one orchestration run. Every
//! intermediate file - the engine input, the output base, the `.txt` file
//! the engine appends - is either created through [`ScratchArea::acquire`]
//! or adopted via [`ScratchArea::register`], and all of them are removed
//! when the run finishes, whichever way it finishes.
use std::path::PathBuf;
use tokio::fs;

use crate::error::Result;

/// Per-run owner of scratch files under the OS temp directory.
///
/// Release runs twice by construction: [`release_all`](Self::release_all)
/// on the ordinary paths, and a `Drop` backstop for early returns and
/// propagated errors. Files already gone are not an error in either pass.
#[derive(Debug, Default)]
pub struct ScratchArea {
    files: Vec<PathBuf>,
}

impl ScratchArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty scratch file with a unique name and take ownership
    /// of it.
    pub async fn acquire(&mut self) -> Result<PathBuf> {
        let path = std::env::temp_dir().join(format!(
            "tessrun_{}_{}",
            std::process::id(),
            uuid::Uuid::new_v4()
        ));
        fs::write(&path, b"").await?;
        self.files.push(path.clone());
        Ok(path)
    }

    /// Adopt a path produced outside the broker, such as the output file the
    /// engine derives from the base path it was given.
    pub fn register(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    /// Paths currently owned by this broker.
    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    /// Delete every owned file. Files that no longer exist are skipped
    /// silently.
    pub async fn release_all(&mut self) {
        for path in self.files.drain(..) {
            let _ = fs::remove_file(&path).await;
        }
    }
}

impl Drop for ScratchArea {
    fn drop(&mut self) {
        // Empty after release_all(); only early returns land here. Blocking
        // removal keeps cleanup deterministic - the files are gone before
        // the error reaches the caller.
        for path in self.files.drain(..) {
            let _ = std::fs::remove_file(path);
        }
    }
}
