use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::artifact::ArtifactKind;

pub type PodResult<T> = Result<T, PodError>;

#[derive(Debug, Error)]
pub enum PodError {
    /// A subprocess exited with a non-zero status.
    #[error(
        "executing '{}' failed with code {exit_code}{}",
        .command.join(" "),
        render_streams(.stderr, .stdout, .tip.as_deref())
    )]
    Process {
        command: Vec<String>,
        exit_code: i32,
        stderr: String,
        stdout: String,
        tip: Option<String>,
    },

    #[error("executing '{}' timed out after {after:?}", .command.join(" "))]
    Timeout { command: Vec<String>, after: Duration },

    #[error("failed to start '{}': {source}", .command.join(" "))]
    Spawn {
        command: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("`{tool}` is not available: {hint}")]
    ToolMissing { tool: String, hint: String },

    #[error(
        "expected {expected} at {} was not produced{}",
        .path.display(),
        render_detail(.detail)
    )]
    Postcondition {
        path: PathBuf,
        expected: ArtifactKind,
        detail: String,
    },

    #[error("bad target {0}")]
    Configuration(String),

    #[error("build settings: {0}")]
    Settings(String),

    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PodError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PodError::Io {
            context: context.into(),
            source,
        }
    }

    /// Attach an advisory tip to a process failure. Other variants are returned unchanged.
    pub fn with_tip(self, tip: impl Into<String>) -> Self {
        match self {
            PodError::Process {
                command,
                exit_code,
                stderr,
                stdout,
                ..
            } => PodError::Process {
                command,
                exit_code,
                stderr,
                stdout,
                tip: Some(tip.into()),
            },
            other => other,
        }
    }
}

fn render_streams(stderr: &str, stdout: &str, tip: Option<&str>) -> String {
    let mut out = String::new();
    if !stderr.trim().is_empty() {
        out.push_str("\nstderr:\n");
        out.push_str(stderr.trim_end());
    }
    if !stdout.trim().is_empty() {
        out.push_str("\nstdout:\n");
        out.push_str(stdout.trim_end());
    }
    if let Some(tip) = tip {
        out.push_str("\nTip: ");
        out.push_str(tip);
    }
    out
}

fn render_detail(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!("\n{detail}")
    }
}
