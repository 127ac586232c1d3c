//! Invocation of the OpenClaw agent CLI.
//!
//! Each message becomes exactly one `openclaw agent ... --json` process. Its
//! output streams are captured in full before anything looks at them, and the
//! process is killed if it outlives the configured timeout.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Environment variable the agent reads its gateway token from.
pub const TOKEN_ENV: &str = "OPENCLAW_GATEWAY_TOKEN";

/// What happened to a single agent process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// Exited with status zero.
    Completed { stdout: String, stderr: String },
    /// Exited with a non-zero status, or was killed by a signal (`code` is `None`).
    Failed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// Still running when the timeout elapsed. The process has been killed.
    TimedOut { after: Duration },
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to collect agent output: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs one agent turn for a user message.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, message: &str) -> Result<AgentOutcome, AgentError>;
}

/// [`AgentRunner`] backed by the `openclaw` binary.
#[derive(Debug)]
pub struct OpenClawAgent {
    binary: PathBuf,
    token: SecretString,
    timeout: Duration,
}

impl OpenClawAgent {
    pub fn new(binary: impl Into<PathBuf>, token: SecretString, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            token,
            timeout,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The fixed argument list for a single local, JSON-formatted agent turn.
    pub fn args(message: &str) -> [&str; 7] {
        [
            "agent", "--agent", "main", "--message", message, "--local", "--json",
        ]
    }
}

#[async_trait]
impl AgentRunner for OpenClawAgent {
    async fn run(&self, message: &str) -> Result<AgentOutcome, AgentError> {
        let child = Command::new(&self.binary)
            .args(Self::args(message))
            .env(TOKEN_ENV, self.token.expose_secret())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AgentError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        tracing::debug!(pid = ?child.id(), "agent process started");

        // Dropping the pending future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "agent process timed out");
                return Ok(AgentOutcome::TimedOut {
                    after: self.timeout,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok(AgentOutcome::Completed { stdout, stderr })
        } else {
            tracing::warn!(code = ?output.status.code(), "agent process failed");
            Ok(AgentOutcome::Failed {
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}
