use std::path::{Path, PathBuf};

use podbridge_core::{absolutize, Artifact, Family, PodError, PodResult};
use tracing::info;

use super::{file_name, parent_dir, StepOutcome, PODS_DIR, PODS_PROJECT};
use crate::command::{self, CommandRunner, CommandSpec};

/// The public spec CDN. `pod gen` uses it on its own unless `--sources` is
/// given, so it is listed first whenever extra repos are passed.
pub const DEFAULT_SPEC_REPO: &str = "https://cdn.cocoapods.org";

/// `pod gen`: synthesize an Xcode project for the framework's podspec.
#[derive(Debug, Clone)]
pub struct PodGenStep {
    pub podspec: PathBuf,
    pub family: Family,
    /// Passed as `--gen-directory`.
    pub gen_dir: PathBuf,
    /// Podspec files or checkout directories for pods not in a registry.
    pub local_sources: Vec<String>,
    /// Spec repositories in addition to [`DEFAULT_SPEC_REPO`].
    pub spec_repos: Vec<String>,
    pub has_dependencies: bool,
}

impl PodGenStep {
    fn podspec_stem(&self) -> String {
        self.podspec
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Everything `pod gen` writes for this podspec; removed before regenerating.
    fn project_root(&self) -> PathBuf {
        self.gen_dir.join(self.podspec_stem())
    }

    pub fn output(&self) -> Artifact {
        Artifact::directory(self.project_root().join(PODS_DIR).join(PODS_PROJECT))
    }

    pub fn sources(&self) -> Vec<String> {
        if self.spec_repos.is_empty() {
            return Vec::new();
        }
        let mut sources = vec![DEFAULT_SPEC_REPO.to_string()];
        for repo in &self.spec_repos {
            if !sources.contains(repo) {
                sources.push(repo.clone());
            }
        }
        sources
    }

    /// `pod gen` runs in the podspec's directory, so every path it is given
    /// is made absolute first.
    pub fn command(&self) -> PodResult<CommandSpec> {
        let mut argv = vec![
            "pod".to_string(),
            "gen".to_string(),
            format!("--platforms={}", self.family.pod_platform()),
            format!("--gen-directory={}", absolutize(&self.gen_dir)?.display()),
        ];
        if !self.local_sources.is_empty() {
            let local_sources = self
                .local_sources
                .iter()
                .map(|source| Ok(absolutize(Path::new(source))?.display().to_string()))
                .collect::<PodResult<Vec<_>>>()?;
            argv.push(format!("--local-sources={}", local_sources.join(",")));
        }
        let sources = self.sources();
        if !sources.is_empty() {
            argv.push(format!("--sources={}", sources.join(",")));
        }
        argv.push(file_name(&self.podspec));
        Ok(CommandSpec::new(argv, parent_dir(&self.podspec)))
    }

    pub async fn execute(&self, runner: &dyn CommandRunner) -> PodResult<StepOutcome> {
        if !self.has_dependencies {
            info!("no pods declared, skipping pod gen for {}", self.family);
            return Ok(StepOutcome::Skipped);
        }

        let root = self.project_root();
        if root.exists() {
            std::fs::remove_dir_all(&root)
                .map_err(|e| PodError::io(format!("remove {}", root.display()), e))?;
        }
        std::fs::create_dir_all(&self.gen_dir)
            .map_err(|e| PodError::io(format!("create {}", self.gen_dir.display()), e))?;

        let spec = self.command()?;
        let stdout = command::run_with(runner, &spec, |output| {
            let tip = deployment_target_tip(
                &format!("{}\n{}", output.stdout, output.stderr),
                self.family,
                &file_name(&self.podspec),
            );
            let failure = output.into_failure(&spec);
            Err(match tip {
                Some(tip) => failure.with_tip(tip),
                None => failure,
            })
        })
        .await?;

        let output = self.output();
        output.verify_with(&format!(
            "'{}' finished but did not create the synthetic project. Output:\n{stdout}",
            spec.command_line()
        ))?;

        info!("pod gen produced {}", output.path.display());
        Ok(StepOutcome::Produced(output.path))
    }
}

/// Advice for the usual cause of a `pod gen` failure: a pod that needs a newer
/// platform than the podspec declares.
fn deployment_target_tip(tool_output: &str, family: Family, podspec: &str) -> Option<String> {
    let lowered = tool_output.to_lowercase();
    let mentions_platform = lowered.contains("deployment target")
        || lowered.contains("requested platforms")
        || lowered.contains("platform of the target")
        || lowered.contains("not compatible with");
    mentions_platform.then(|| {
        format!(
            "declare a deployment target for {family} that satisfies every pod, \
             e.g. `spec.{}.deployment_target = '13.0'` in {podspec}",
            family.pod_platform()
        )
    })
}
