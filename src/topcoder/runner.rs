//! Execution of generated test conversion scripts.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Default interpreter for conversion scripts.
pub const DEFAULT_PYTHON: &str = "python3";

/// Wall-clock limit for converting one test.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised by a single script run.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to spawn {interpreter}: {message}")]
    Spawn { interpreter: String, message: String },

    #[error("Script timed out after {0:?}")]
    Timeout(Duration),

    #[error("Script exited with code {code}:\nstdout: {stdout}\nstderr: {stderr}")]
    Failed {
        code: i32,
        stdout: String,
        stderr: String,
    },
}

/// Runs `script input output`.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &Path, input: &Path, output: &Path) -> Result<(), ScriptError>;
}

/// Runs scripts with an external interpreter.
#[derive(Debug, Clone)]
pub struct InterpreterRunner {
    interpreter: String,
    timeout: Duration,
}

impl InterpreterRunner {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout: SCRIPT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}

impl Default for InterpreterRunner {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON)
    }
}

#[async_trait]
impl ScriptRunner for InterpreterRunner {
    async fn run(&self, script: &Path, input: &Path, output: &Path) -> Result<(), ScriptError> {
        debug!(
            interpreter = %self.interpreter,
            script = %script.display(),
            input = %input.display(),
            "Running conversion script"
        );

        let child = Command::new(&self.interpreter)
            .arg(script)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ScriptError::Spawn {
                interpreter: self.interpreter.clone(),
                message: e.to_string(),
            })?;

        let result = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ScriptError::Timeout(self.timeout))?;
        let output = result.map_err(|e| ScriptError::Spawn {
            interpreter: self.interpreter.clone(),
            message: e.to_string(),
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ScriptError::Failed {
                code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}
