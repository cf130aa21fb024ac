use std::path::PathBuf;

use podbridge_core::{Artifact, PodResult};
use tracing::info;

use super::{parent_dir, StepOutcome, PODS_DIR, PODS_PROJECT};
use crate::command::{self, CommandRunner, CommandSpec};

/// `pod install` for the app-side Podfile.
#[derive(Debug, Clone)]
pub struct PodInstallStep {
    pub podfile: Option<PathBuf>,
}

impl PodInstallStep {
    pub fn new(podfile: Option<PathBuf>) -> Self {
        Self { podfile }
    }

    pub fn output(&self) -> Option<Artifact> {
        self.podfile.as_ref().map(|podfile| {
            Artifact::directory(parent_dir(podfile).join(PODS_DIR).join(PODS_PROJECT))
        })
    }

    pub fn command(&self) -> Option<CommandSpec> {
        self.podfile
            .as_ref()
            .map(|podfile| CommandSpec::new(["pod", "install"], parent_dir(podfile)))
    }

    pub async fn execute(&self, runner: &dyn CommandRunner) -> PodResult<StepOutcome> {
        let (Some(spec), Some(output)) = (self.command(), self.output()) else {
            info!("no Podfile configured, skipping pod install");
            return Ok(StepOutcome::Skipped);
        };

        let stdout = command::run(runner, &spec).await?;
        output.verify_with(&format!(
            "'{}' finished but did not create the Pods project. Output:\n{stdout}",
            spec.command_line()
        ))?;

        info!("pod install produced {}", output.path.display());
        Ok(StepOutcome::Produced(output.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::mock::{MockResponse, MockRunner};
    use podbridge_core::PodError;

    #[tokio::test]
    async fn skipped_without_podfile() {
        let runner = MockRunner::new();
        let outcome = PodInstallStep::new(None).execute(&runner).await.unwrap();
        assert_eq!(outcome, StepOutcome::Skipped);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn runs_in_podfile_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let app = tmp.path().join("iosApp");
        let project = app.join("Pods/Pods.xcodeproj");
        let runner = MockRunner::new().rule(
            &["pod", "install"],
            MockResponse::success("Pod installation complete!").with_dir(&project),
        );

        let outcome = PodInstallStep::new(Some(app.join("Podfile")))
            .execute(&runner)
            .await
            .unwrap();

        assert_eq!(outcome, StepOutcome::Produced(project));
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].argv, vec!["pod", "install"]);
        assert_eq!(calls[0].cwd, app);
    }

    #[tokio::test]
    async fn missing_project_is_postcondition_failure_with_output() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = MockRunner::new().rule(
            &["install"],
            MockResponse::success("Analyzing dependencies\nNothing to do"),
        );
        let err = PodInstallStep::new(Some(tmp.path().join("Podfile")))
            .execute(&runner)
            .await
            .unwrap_err();
        assert!(matches!(err, PodError::Postcondition { .. }));
        let msg = err.to_string();
        assert!(msg.contains("Pods.xcodeproj"));
        assert!(msg.contains("pod install"));
        assert!(msg.contains("Nothing to do"));
    }

    #[tokio::test]
    async fn install_failure_propagates() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = MockRunner::new().rule(
            &["install"],
            MockResponse::failure(1, "[!] Unable to find a specification for `Nope`"),
        );
        let err = PodInstallStep::new(Some(tmp.path().join("Podfile")))
            .execute(&runner)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unable to find a specification"));
    }
}
