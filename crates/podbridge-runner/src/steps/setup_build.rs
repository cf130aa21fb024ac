use std::path::PathBuf;

use podbridge_core::{Artifact, BuildSettings, PodResult, Target};
use tracing::info;

use super::{file_name, parent_dir, StepOutcome};
use crate::command::{self, CommandRunner, CommandSpec};

/// `xcodebuild -showBuildSettings` against the synthetic project, persisted
/// as a properties file for the build step.
#[derive(Debug, Clone)]
pub struct SetupBuildStep {
    /// The generated `Pods.xcodeproj` directory.
    pub project: PathBuf,
    pub framework_name: String,
    pub target: Target,
    pub settings_file: PathBuf,
}

impl SetupBuildStep {
    pub fn output(&self) -> Artifact {
        Artifact::file(&self.settings_file)
    }

    pub fn command(&self) -> PodResult<CommandSpec> {
        let sdk = self.target.sdk()?;
        Ok(CommandSpec::new(
            [
                "xcodebuild".to_string(),
                "-showBuildSettings".to_string(),
                "-project".to_string(),
                file_name(&self.project),
                "-scheme".to_string(),
                self.framework_name.clone(),
                "-sdk".to_string(),
                sdk.as_str().to_string(),
            ],
            parent_dir(&self.project),
        ))
    }

    /// Query, parse and persist. Returns the outcome together with the settings
    /// that were written.
    pub async fn execute(
        &self,
        runner: &dyn CommandRunner,
    ) -> PodResult<(StepOutcome, BuildSettings)> {
        Artifact::directory(&self.project).verify()?;
        let spec = self.command()?;

        let stdout = command::run(runner, &spec).await?;
        let settings = BuildSettings::parse(&stdout)?;
        settings.write_to(&self.settings_file)?;

        let output = self.output();
        output.verify()?;
        info!(
            "build settings for {} ({}) written to {}",
            self.target,
            settings.configuration,
            output.path.display()
        );
        Ok((StepOutcome::Produced(output.path), settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::mock::{MockResponse, MockRunner};
    use podbridge_core::PodError;

    const SHOW_BUILD_SETTINGS: &str = "\
Build settings for action build and target shared:
    BUILD_DIR = /tmp/DerivedData/Build/Products
    CONFIGURATION = Release
    OTHER_CFLAGS = -fembed-bitcode
    SDKROOT = /Applications/Xcode.app/iPhoneOS.sdk
";

    fn step(root: &std::path::Path, target: Target) -> SetupBuildStep {
        let project = root.join("synthetic/ios/shared/Pods/Pods.xcodeproj");
        std::fs::create_dir_all(&project).unwrap();
        SetupBuildStep {
            project,
            framework_name: "shared".into(),
            target,
            settings_file: root.join("buildSettings/build-settings-ios_arm64.properties"),
        }
    }

    #[tokio::test]
    async fn queries_settings_and_persists_them() {
        let tmp = tempfile::tempdir().unwrap();
        let setup = step(tmp.path(), Target::IosArm64);
        let runner = MockRunner::new()
            .rule(&["-showBuildSettings"], MockResponse::success(SHOW_BUILD_SETTINGS));

        let (outcome, settings) = setup.execute(&runner).await.unwrap();

        assert_eq!(outcome, StepOutcome::Produced(setup.settings_file.clone()));
        assert_eq!(settings.configuration, "Release");
        assert_eq!(BuildSettings::read_from(&setup.settings_file).unwrap(), settings);

        let calls = runner.calls();
        assert_eq!(
            calls[0].argv,
            vec![
                "xcodebuild",
                "-showBuildSettings",
                "-project",
                "Pods.xcodeproj",
                "-scheme",
                "shared",
                "-sdk",
                "iphoneos"
            ]
        );
        assert_eq!(calls[0].cwd, tmp.path().join("synthetic/ios/shared/Pods"));
    }

    #[tokio::test]
    async fn simulator_target_uses_simulator_sdk() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = step(tmp.path(), Target::IosSimulatorArm64).command().unwrap();
        assert!(spec.mentions(&["-sdk", "iphonesimulator"]));
    }

    #[tokio::test]
    async fn bad_target_fails_before_running_anything() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = MockRunner::new();
        let err = step(tmp.path(), Target::LinuxX64)
            .execute(&runner)
            .await
            .unwrap_err();
        assert!(matches!(err, PodError::Configuration(ref t) if t == "linux_x64"));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn unparseable_output_is_settings_error() {
        let tmp = tempfile::tempdir().unwrap();
        let setup = step(tmp.path(), Target::IosArm64);
        let runner = MockRunner::new()
            .rule(&["-showBuildSettings"], MockResponse::success("nothing useful"));
        let err = setup.execute(&runner).await.unwrap_err();
        assert!(matches!(err, PodError::Settings(_)));
        assert!(!setup.settings_file.exists());
    }

    #[tokio::test]
    async fn requires_generated_project() {
        let tmp = tempfile::tempdir().unwrap();
        let setup = SetupBuildStep {
            project: tmp.path().join("missing/Pods.xcodeproj"),
            ..step(tmp.path(), Target::IosArm64)
        };
        let err = setup.execute(&MockRunner::new()).await.unwrap_err();
        assert!(matches!(err, PodError::Postcondition { .. }));
    }
}
