//! The four pipeline steps. Each declares one output [`Artifact`] that is
//! verified after its command runs, and that the next step only reads.
//!
//! [`Artifact`]: podbridge_core::Artifact

pub mod build;
pub mod generate;
pub mod install;
pub mod setup_build;

use std::path::{Path, PathBuf};

use serde::Serialize;

pub use build::PodBuildStep;
pub use generate::PodGenStep;
pub use install::PodInstallStep;
pub use setup_build::SetupBuildStep;

pub(crate) const PODS_DIR: &str = "Pods";
pub(crate) const PODS_PROJECT: &str = "Pods.xcodeproj";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "output", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Preconditions said there was nothing to do.
    Skipped,
    /// The step ran and its declared output was verified.
    Produced(PathBuf),
}

impl StepOutcome {
    pub fn output(&self) -> Option<&Path> {
        match self {
            StepOutcome::Produced(path) => Some(path),
            StepOutcome::Skipped => None,
        }
    }
}

/// Parent directory of `path`, `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

/// Last component of `path` as a string, for `-project` style arguments.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
