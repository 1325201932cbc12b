//! Typed engine invocation.
//!
//! The command is materialized once per run as a value - executable path,
//! ordered argument list, environment overlay - so it can be inspected and
//! tested without spawning anything. A single concatenated command string
//! never exists; paths with spaces need no quoting.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::EngineConfig;

/// Environment variable naming the engine's data-file root.
pub const DATA_PATH_VAR: &str = "TESSDATA_PREFIX";

/// Suffix the engine appends to the output base path it is given.
const OUTPUT_SUFFIX: &str = ".txt";

/// The materialized engine command for one run. Immutable once built.
#[derive(Debug, Clone)]
pub struct EngineInvocation {
    program: PathBuf,
    args: Vec<OsString>,
    env: Vec<(&'static str, OsString)>,
}

impl EngineInvocation {
    /// Build the invocation `<engine> <input> <output_base> -l <lang> -psm <psm>`
    /// from the config and the concrete scratch paths.
    pub fn new(config: &EngineConfig, input: &Path, output_base: &Path) -> Self {
        let args = vec![
            input.as_os_str().to_os_string(),
            output_base.as_os_str().to_os_string(),
            OsString::from("-l"),
            OsString::from(config.language.as_str()),
            OsString::from("-psm"),
            OsString::from(config.page_seg_mode.as_arg()),
        ];

        let mut env = Vec::new();
        if !config.tesseract_path.is_empty() {
            env.push((DATA_PATH_VAR, OsString::from(config.tesseract_path.as_str())));
        }

        Self {
            program: config.engine_binary(),
            args,
            env,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Environment overlay applied on top of the inherited environment.
    pub fn env(&self) -> &[(&'static str, OsString)] {
        &self.env
    }

    /// Where the engine writes its result for a given output base path.
    pub fn output_file(output_base: &Path) -> PathBuf {
        let mut os = output_base.as_os_str().to_os_string();
        os.push(OUTPUT_SUFFIX);
        PathBuf::from(os)
    }

    /// Turn the value into a spawnable command. Stdin is closed from the
    /// start - the engine never reads it, and an open pipe can stall some
    /// builds that poll for input.
    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}
