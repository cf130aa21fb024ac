use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PodError, PodResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Directory,
    File,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Directory => f.write_str("directory"),
            ArtifactKind::File => f.write_str("file"),
        }
    }
}

/// The declared output of a pipeline step: a path that must exist with the
/// given kind once the step has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ArtifactKind::Directory,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ArtifactKind::File,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        match self.kind {
            ArtifactKind::Directory => self.path.is_dir(),
            ArtifactKind::File => self.path.is_file(),
        }
    }

    pub fn verify(&self) -> PodResult<()> {
        self.verify_with("")
    }

    /// Like [`Artifact::verify`], appending `detail` (usually tool output) to the failure.
    pub fn verify_with(&self, detail: &str) -> PodResult<()> {
        if self.exists() {
            return Ok(());
        }
        Err(PodError::Postcondition {
            path: self.path.clone(),
            expected: self.kind,
            detail: detail.trim_end().to_string(),
        })
    }
}
