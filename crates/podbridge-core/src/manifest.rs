use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dependency::{PodDependency, PodLocation};
use crate::error::{PodError, PodResult};
use crate::paths::absolutize;

/// The dependency-set configuration the pipeline runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodManifest {
    /// Scheme used when querying build settings.
    pub framework_name: String,
    /// App-side Podfile; `pod install` is skipped without one.
    #[serde(default)]
    pub podfile: Option<PathBuf>,
    /// Podspec the synthetic project is generated from.
    pub podspec: PathBuf,
    /// Extra spec repositories besides the public CDN.
    #[serde(default)]
    pub spec_repos: Vec<String>,
    #[serde(default)]
    pub pods: Vec<PodDependency>,
}

impl PodManifest {
    /// Load a JSON manifest, resolving relative paths against its directory.
    pub fn load(path: &Path) -> PodResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| PodError::io(format!("read manifest {}", path.display()), e))?;
        let manifest: PodManifest = serde_json::from_str(&text)
            .map_err(|e| PodError::InvalidInput(format!("manifest {}: {e}", path.display())))?;
        let base = absolutize(
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new(".")),
        )?;
        manifest.resolved_against(&base).validate()
    }

    pub fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        self.podspec = resolve(&self.podspec);
        self.podfile = self.podfile.as_deref().map(resolve);
        for pod in &mut self.pods {
            if let Some(PodLocation::Path(local)) = &mut pod.source {
                *local = resolve(local.as_path());
            }
        }
        self
    }

    pub fn validate(self) -> PodResult<Self> {
        if self.framework_name.trim().is_empty() {
            return Err(PodError::InvalidInput("framework_name must not be empty".into()));
        }
        if let Some(pod) = self.pods.iter().find(|p| p.name.trim().is_empty()) {
            return Err(PodError::InvalidInput(format!(
                "pod with empty name in manifest (source: {:?})",
                pod.source
            )));
        }
        Ok(self)
    }

    pub fn has_pods(&self) -> bool {
        !self.pods.is_empty()
    }
}
