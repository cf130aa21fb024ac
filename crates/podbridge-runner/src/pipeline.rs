use std::path::PathBuf;

use chrono::{DateTime, Utc};
use podbridge_core::{PodError, PodLocation, PodManifest, PodResult, Target};
use serde::Serialize;
use tracing::info;

use crate::command::CommandRunner;
use crate::download;
use crate::git::{self, Strategy};
use crate::layout::BuildLayout;
use crate::steps::{PodBuildStep, PodGenStep, PodInstallStep, SetupBuildStep, StepOutcome};

/// A git checkout or downloaded podspec made by [`Pipeline::fetch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchedSource {
    pub pod: String,
    pub path: PathBuf,
    /// Set for git checkouts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: &'static str,
    pub outcome: StepOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// What [`Pipeline::run`] did, printed as JSON by `podbridge run`.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub framework_name: String,
    pub target: Target,
    pub sources: Vec<FetchedSource>,
    pub steps: Vec<StepRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineReport {
    pub fn step(&self, name: &str) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.name == name)
    }
}

/// Wires the manifest and the build layout into the four steps.
pub struct Pipeline<'a> {
    manifest: PodManifest,
    layout: BuildLayout,
    runner: &'a dyn CommandRunner,
    http: reqwest::Client,
}

impl<'a> Pipeline<'a> {
    pub fn new(manifest: PodManifest, layout: BuildLayout, runner: &'a dyn CommandRunner) -> Self {
        Self {
            manifest,
            layout,
            runner,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn manifest(&self) -> &PodManifest {
        &self.manifest
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// `--local-sources` for `pod gen`: declared paths as given, git and URL
    /// sources at the place [`Pipeline::fetch`] puts them.
    pub fn local_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for pod in &self.manifest.pods {
            let path = match &pod.source {
                Some(PodLocation::Path(path)) => path.clone(),
                Some(PodLocation::Git(_)) => self.layout.git_source_dir(pod.scheme_name()),
                Some(PodLocation::Url(_)) => self.layout.url_source_dir(pod.scheme_name()),
                None => continue,
            };
            let path = path.display().to_string();
            if !sources.contains(&path) {
                sources.push(path);
            }
        }
        sources
    }

    /// Retrieve every git checkout and download every URL podspec. Subspecs
    /// sharing a source are fetched once; subspecs of one pod declaring
    /// different sources are rejected.
    pub async fn fetch(&self) -> PodResult<Vec<FetchedSource>> {
        let mut fetched: Vec<FetchedSource> = Vec::new();
        let mut seen: Vec<(&str, &PodLocation)> = Vec::new();
        for pod in &self.manifest.pods {
            let dir_name = pod.scheme_name();
            let Some(source) = pod.source.as_ref() else {
                continue;
            };
            if matches!(source, PodLocation::Path(_)) {
                continue;
            }
            if let Some((_, first)) = seen.iter().find(|(name, _)| *name == dir_name) {
                if *first != source {
                    return Err(PodError::InvalidInput(format!(
                        "pod {} declares a different source than another {dir_name} subspec",
                        pod.name
                    )));
                }
                continue;
            }
            seen.push((dir_name, source));

            let (path, strategy) = match source {
                PodLocation::Git(location) => {
                    let dest = self.layout.git_source_dir(dir_name);
                    let strategy = git::retrieve(self.runner, location, &dest).await?;
                    (dest, Some(strategy))
                }
                PodLocation::Url(url) => {
                    let dest = self.layout.url_source_dir(dir_name);
                    download::download_podspec(&self.http, url, &dest, dir_name).await?;
                    (dest, None)
                }
                PodLocation::Path(_) => continue,
            };
            fetched.push(FetchedSource {
                pod: dir_name.to_string(),
                path,
                strategy,
            });
        }
        info!("fetched {} external pod source(s)", fetched.len());
        Ok(fetched)
    }

    pub async fn install(&self) -> PodResult<StepOutcome> {
        PodInstallStep::new(self.manifest.podfile.clone())
            .execute(self.runner)
            .await
    }

    pub fn gen_step(&self, target: Target) -> PodResult<PodGenStep> {
        let family = target.require_family()?;
        Ok(PodGenStep {
            podspec: self.manifest.podspec.clone(),
            family,
            gen_dir: self.layout.synthetic_dir(family),
            local_sources: self.local_sources(),
            spec_repos: self.manifest.spec_repos.clone(),
            has_dependencies: self.manifest.has_pods(),
        })
    }

    pub async fn generate(&self, target: Target) -> PodResult<StepOutcome> {
        self.gen_step(target)?.execute(self.runner).await
    }

    pub fn setup_build_step(&self, target: Target) -> PodResult<SetupBuildStep> {
        Ok(SetupBuildStep {
            project: self.gen_step(target)?.output().path,
            framework_name: self.manifest.framework_name.clone(),
            target,
            settings_file: self.layout.build_settings_file(target),
        })
    }

    /// Skipped along with generation when no pods are declared.
    pub async fn setup_build(&self, target: Target) -> PodResult<StepOutcome> {
        let step = self.setup_build_step(target)?;
        if !self.manifest.has_pods() {
            info!("no pods declared, skipping build settings for {target}");
            return Ok(StepOutcome::Skipped);
        }
        let (outcome, _) = step.execute(self.runner).await?;
        Ok(outcome)
    }

    pub fn build_step(&self, target: Target) -> PodResult<PodBuildStep> {
        let setup = self.setup_build_step(target)?;
        Ok(PodBuildStep {
            project: setup.project,
            settings_file: setup.settings_file,
            target,
            pods: self.manifest.pods.clone(),
        })
    }

    pub async fn build(&self, target: Target) -> PodResult<StepOutcome> {
        self.build_step(target)?.execute(self.runner).await
    }

    /// Fetch, then install, generate, extract settings and build, stopping at
    /// the first failure.
    pub async fn run(&self, target: Target) -> PodResult<PipelineReport> {
        let started_at = Utc::now();
        // Fail on a bad target before anything touches the network.
        target.sdk()?;
        let sources = self.fetch().await?;

        let mut steps = Vec::new();
        steps.push(timed("install", self.install()).await?);
        steps.push(timed("gen", self.generate(target)).await?);
        steps.push(timed("setup_build", self.setup_build(target)).await?);
        steps.push(timed("build", self.build(target)).await?);

        let report = PipelineReport {
            framework_name: self.manifest.framework_name.clone(),
            target,
            sources,
            steps,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            "pipeline for {} ({target}) finished in {}ms",
            report.framework_name,
            (report.finished_at - report.started_at).num_milliseconds()
        );
        Ok(report)
    }
}

async fn timed<F>(name: &'static str, step: F) -> PodResult<StepRecord>
where
    F: std::future::Future<Output = PodResult<StepOutcome>>,
{
    info!("step {name} starting");
    let started_at = Utc::now();
    let outcome = step.await?;
    Ok(StepRecord {
        name,
        outcome,
        started_at,
        finished_at: Utc::now(),
    })
}
