pub mod mock;
pub mod process;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use podbridge_core::{PodError, PodResult};

pub use process::ProcessRunner;

/// How the child's output streams are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// Collect stdout/stderr silently.
    #[default]
    Capture,
    /// Forward stdout/stderr to ours as they arrive, and still collect them.
    Tee,
}

/// An external command: argument vector plus working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub argv: Vec<String>,
    pub cwd: PathBuf,
    pub mode: StreamMode,
}

impl CommandSpec {
    pub fn new<I, S>(argv: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
            mode: StreamMode::Capture,
        }
    }

    pub fn tee(mut self) -> Self {
        self.mode = StreamMode::Tee;
        self
    }

    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }

    /// True if every element of `needle` appears somewhere in the argument vector.
    pub fn mentions(&self, needle: &[&str]) -> bool {
        needle.iter().all(|n| self.argv.iter().any(|a| a == n))
    }
}

/// What a finished process left behind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The failure for `spec`. Streams that were already shown live are cut
    /// down to their last [`TEE_FAILURE_TAIL_LINES`] lines.
    pub fn into_failure(self, spec: &CommandSpec) -> PodError {
        let (stdout, stderr) = match spec.mode {
            StreamMode::Capture => (self.stdout, self.stderr),
            StreamMode::Tee => (
                tail_lines(&self.stdout, TEE_FAILURE_TAIL_LINES),
                tail_lines(&self.stderr, TEE_FAILURE_TAIL_LINES),
            ),
        };
        PodError::Process {
            command: spec.argv.clone(),
            exit_code: self.exit_code.unwrap_or(-1),
            stderr,
            stdout,
            tip: None,
        }
    }
}

pub const TEE_FAILURE_TAIL_LINES: usize = 50;

fn tail_lines(text: &str, keep: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= keep {
        return text.to_string();
    }
    let skipped = lines.len() - keep;
    format!(
        "[{skipped} earlier lines streamed above]\n{}",
        lines[skipped..].join("\n")
    )
}

/// Seam between the pipeline and the operating system.
///
/// `execute` reports any exit status as data; only a process that could not
/// be started or that timed out is an error here. Exit-code policy lives in
/// [`run`] and [`run_with`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, spec: &CommandSpec) -> PodResult<ProcessOutput>;
}

/// Run a command and return its stdout; a non-zero exit becomes
/// [`PodError::Process`] carrying the exact argument vector.
pub async fn run(runner: &dyn CommandRunner, spec: &CommandSpec) -> PodResult<String> {
    run_with(runner, spec, |output| Err(output.into_failure(spec))).await
}

/// Like [`run`], but a non-zero exit is handed to `on_failure`, which decides
/// the result instead of the default failure.
pub async fn run_with<F>(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
    on_failure: F,
) -> PodResult<String>
where
    F: FnOnce(ProcessOutput) -> PodResult<String>,
{
    tracing::debug!(cwd = %spec.cwd.display(), "running {}", spec.command_line());
    let output = runner.execute(spec).await?;
    if output.success() {
        Ok(output.stdout)
    } else {
        on_failure(output)
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockResponse, MockRunner};
    use super::*;

    #[test]
    fn spec_accessors() {
        let spec = CommandSpec::new(["git", "clone", "--depth", "1"], "/tmp");
        assert_eq!(spec.program(), "git");
        assert_eq!(spec.args(), ["clone", "--depth", "1"]);
        assert_eq!(spec.command_line(), "git clone --depth 1");
        assert_eq!(spec.mode, StreamMode::Capture);
        assert_eq!(spec.clone().tee().mode, StreamMode::Tee);
        assert!(spec.mentions(&["clone", "1"]));
        assert!(!spec.mentions(&["fetch"]));
    }

    #[test]
    fn empty_spec_has_no_program() {
        let spec = CommandSpec::new(Vec::<String>::new(), ".");
        assert_eq!(spec.program(), "");
        assert!(spec.args().is_empty());
    }

    #[tokio::test]
    async fn run_returns_stdout_on_success() {
        let runner =
            MockRunner::new().rule(&["pod", "--version"], MockResponse::success("1.15.2\n"));
        let out = run(&runner, &CommandSpec::new(["pod", "--version"], "."))
            .await
            .unwrap();
        assert_eq!(out, "1.15.2\n");
    }

    #[tokio::test]
    async fn non_zero_exit_is_process_failure_with_argv() {
        let runner = MockRunner::new().rule(&["install"], MockResponse::failure(31, "boom"));
        let spec = CommandSpec::new(["pod", "install", "--repo-update"], "/proj");
        let err = run(&runner, &spec).await.unwrap_err();
        match err {
            PodError::Process {
                command,
                exit_code,
                stderr,
                ..
            } => {
                assert_eq!(command, vec!["pod", "install", "--repo-update"]);
                assert_eq!(exit_code, 31);
                assert_eq!(stderr, "boom");
            }
            other => panic!("expected process failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn handler_replaces_default_failure() {
        let runner = MockRunner::new().rule(&["false"], MockResponse::failure(1, ""));
        let out = run_with(&runner, &CommandSpec::new(["false"], "."), |output| {
            Ok(format!("recovered from {:?}", output.exit_code))
        })
        .await
        .unwrap();
        assert_eq!(out, "recovered from Some(1)");
    }

    #[tokio::test]
    async fn handler_not_called_on_success() {
        let runner = MockRunner::new();
        let out = run_with(&runner, &CommandSpec::new(["true"], "."), |_| {
            panic!("handler must not run")
        })
        .await
        .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn tee_failure_keeps_only_the_tail() {
        let log: String = (1..=200).map(|i| format!("compile step {i}\n")).collect();
        let spec = CommandSpec::new(["xcodebuild"], ".").tee();
        let output = ProcessOutput {
            exit_code: Some(65),
            stdout: log.clone(),
            stderr: "** BUILD FAILED **\n".into(),
        };

        match output.clone().into_failure(&spec) {
            PodError::Process { stdout, stderr, .. } => {
                assert!(stdout.starts_with("[150 earlier lines streamed above]\n"));
                assert!(stdout.ends_with("compile step 200"));
                assert!(!stdout.contains("compile step 150\n"));
                assert_eq!(stdout.lines().count(), TEE_FAILURE_TAIL_LINES + 1);
                assert_eq!(stderr, "** BUILD FAILED **\n");
            }
            other => panic!("expected process failure, got {other:?}"),
        }

        let captured = CommandSpec::new(["xcodebuild"], ".");
        assert!(matches!(
            output.into_failure(&captured),
            PodError::Process { stdout, .. } if stdout == log
        ));
    }

    #[test]
    fn signal_exit_maps_to_minus_one() {
        let spec = CommandSpec::new(["xcodebuild"], ".");
        let err = ProcessOutput::default().into_failure(&spec);
        assert!(matches!(err, PodError::Process { exit_code: -1, .. }));
    }
}
