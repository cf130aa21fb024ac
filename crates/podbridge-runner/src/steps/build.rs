use std::path::PathBuf;

use podbridge_core::{Artifact, BuildSettings, PodDependency, PodResult, Target};
use tracing::info;

use super::{file_name, parent_dir, StepOutcome};
use crate::command::{self, CommandRunner, CommandSpec};

/// `xcodebuild` for every declared pod, one scheme at a time.
#[derive(Debug, Clone)]
pub struct PodBuildStep {
    /// The generated `Pods.xcodeproj` directory.
    pub project: PathBuf,
    pub settings_file: PathBuf,
    pub target: Target,
    pub pods: Vec<PodDependency>,
}

impl PodBuildStep {
    /// Schemes in declaration order. Subspecs of one pod share a scheme and
    /// are built once.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = Vec::new();
        for pod in &self.pods {
            let scheme = pod.scheme_name();
            if !schemes.contains(&scheme) {
                schemes.push(scheme);
            }
        }
        schemes
    }

    pub fn command(&self, scheme: &str, settings: &BuildSettings) -> PodResult<CommandSpec> {
        let sdk = self.target.sdk()?;
        Ok(CommandSpec::new(
            [
                "xcodebuild".to_string(),
                "-project".to_string(),
                file_name(&self.project),
                "-scheme".to_string(),
                scheme.to_string(),
                "-sdk".to_string(),
                sdk.as_str().to_string(),
                "-configuration".to_string(),
                settings.configuration.clone(),
            ],
            parent_dir(&self.project),
        )
        .tee())
    }

    /// Build every scheme; the first failure stops the rest. The output is the
    /// settings' `BUILD_DIR`.
    pub async fn execute(&self, runner: &dyn CommandRunner) -> PodResult<StepOutcome> {
        if self.pods.is_empty() {
            info!("no pods declared, skipping pod build for {}", self.target);
            return Ok(StepOutcome::Skipped);
        }
        Artifact::directory(&self.project).verify()?;
        let settings = BuildSettings::read_from(&self.settings_file)?;
        self.target.sdk()?;

        for scheme in self.schemes() {
            info!("building pod scheme {scheme} for {}", self.target);
            command::run(runner, &self.command(scheme, &settings)?).await?;
        }

        let output = Artifact::directory(&settings.build_dir);
        output.verify_with("xcodebuild succeeded but BUILD_DIR does not exist")?;
        info!("pods built into {}", output.path.display());
        Ok(StepOutcome::Produced(output.path))
    }
}
