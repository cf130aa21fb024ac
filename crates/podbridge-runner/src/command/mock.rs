use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use podbridge_core::{PodError, PodResult};

use super::{CommandRunner, CommandSpec, ProcessOutput};

/// Canned reaction to a matched command.
#[derive(Debug, Clone)]
pub struct MockResponse {
    output: ProcessOutput,
    missing: bool,
    /// Directories to create before returning.
    dirs: Vec<PathBuf>,
    /// Files to write before returning, as (path, content).
    files: Vec<(PathBuf, String)>,
}

impl MockResponse {
    /// Exit 0 with the given stdout.
    pub fn success(stdout: &str) -> Self {
        Self {
            output: ProcessOutput {
                exit_code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
            missing: false,
            dirs: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: &str) -> Self {
        Self {
            output: ProcessOutput {
                exit_code: Some(exit_code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
            ..Self::success("")
        }
    }

    /// Behave as if the program is not installed.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::success("")
        }
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.output.stdout = stdout.to_string();
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.push(path.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.push((path.into(), content.to_string()));
        self
    }
}

type Hook = Box<dyn Fn(&CommandSpec) + Send + Sync>;

/// A scripted [`CommandRunner`] for tests: records every invocation and
/// answers with the first rule whose needle the command mentions. Unmatched
/// commands succeed with empty output.
#[derive(Default)]
pub struct MockRunner {
    rules: Vec<(Vec<String>, MockResponse)>,
    calls: Mutex<Vec<CommandSpec>>,
    hook: Option<Hook>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands mentioning every element of `needle` with `response`.
    pub fn rule(mut self, needle: &[&str], response: MockResponse) -> Self {
        self.rules
            .push((needle.iter().map(|s| s.to_string()).collect(), response));
        self
    }

    /// Called with each command before it is answered.
    pub fn with_hook(mut self, hook: impl Fn(&CommandSpec) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn invoked(&self, needle: &[&str]) -> bool {
        self.calls().iter().any(|c| c.mentions(needle))
    }

    fn respond(&self, spec: &CommandSpec) -> Option<&MockResponse> {
        self.rules
            .iter()
            .find(|(needle, _)| needle.iter().all(|n| spec.argv.contains(n)))
            .map(|(_, response)| response)
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn execute(&self, spec: &CommandSpec) -> PodResult<ProcessOutput> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(spec.clone());
        if let Some(hook) = &self.hook {
            hook(spec);
        }

        let Some(response) = self.respond(spec) else {
            return Ok(ProcessOutput {
                exit_code: Some(0),
                ..ProcessOutput::default()
            });
        };

        if response.missing {
            return Err(PodError::Spawn {
                command: spec.argv.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "No such file or directory",
                ),
            });
        }
        for dir in &response.dirs {
            std::fs::create_dir_all(dir)
                .map_err(|e| PodError::io(format!("mock create {}", dir.display()), e))?;
        }
        for (path, content) in &response.files {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PodError::io(format!("mock create {}", parent.display()), e))?;
            }
            std::fs::write(path, content)
                .map_err(|e| PodError::io(format!("mock write {}", path.display()), e))?;
        }
        Ok(response.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unmatched_commands_succeed() {
        let mock = MockRunner::new();
        let out = mock.execute(&CommandSpec::new(["git", "init"], ".")).await.unwrap();
        assert!(out.success());
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn first_matching_rule_wins() {
        let mock = MockRunner::new()
            .rule(&["git", "fetch"], MockResponse::failure(128, "no shallow"))
            .rule(&["git"], MockResponse::success("ok"));
        let fetch = mock
            .execute(&CommandSpec::new(["git", "fetch", "--depth", "1"], "."))
            .await
            .unwrap();
        assert_eq!(fetch.exit_code, Some(128));
        let other = mock.execute(&CommandSpec::new(["git", "init"], ".")).await.unwrap();
        assert_eq!(other.stdout, "ok");
        assert!(mock.invoked(&["fetch"]));
        assert!(!mock.invoked(&["clone"]));
    }

    #[tokio::test]
    async fn writes_dirs_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mock = MockRunner::new().rule(
            &["gen"],
            MockResponse::success("")
                .with_dir(tmp.path().join("out/Pods.xcodeproj"))
                .with_file(tmp.path().join("out/log.txt"), "generated"),
        );
        mock.execute(&CommandSpec::new(["pod", "gen"], tmp.path()))
            .await
            .unwrap();
        assert!(tmp.path().join("out/Pods.xcodeproj").is_dir());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("out/log.txt")).unwrap(),
            "generated"
        );
    }

    #[tokio::test]
    async fn missing_program() {
        let mock = MockRunner::new().rule(&["xcodebuild"], MockResponse::missing());
        let err = mock
            .execute(&CommandSpec::new(["xcodebuild", "-version"], "."))
            .await
            .unwrap_err();
        assert!(matches!(err, PodError::Spawn { .. }));
    }

    #[tokio::test]
    async fn hook_sees_every_call() {
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mock = MockRunner::new().with_hook(move |spec| {
            sink.lock().unwrap().push(spec.command_line());
        });
        mock.execute(&CommandSpec::new(["git", "init"], ".")).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["git init".to_string()]);
    }
}
