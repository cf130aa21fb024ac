use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A pod the framework depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodDependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Where the podspec comes from. `None` means a spec registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PodLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodLocation {
    Path(PathBuf),
    Url(String),
    Git(GitLocation),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLocation {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// The ref a git location asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitRef<'a> {
    Commit(&'a str),
    /// A branch or tag name.
    Named(&'a str),
    Default,
}

impl GitLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: None,
            tag: None,
            commit: None,
        }
    }

    /// Commit wins over tag, tag wins over branch.
    pub fn selected_ref(&self) -> GitRef<'_> {
        fn non_empty(s: &Option<String>) -> Option<&str> {
            s.as_deref().filter(|v| !v.trim().is_empty())
        }

        if let Some(commit) = non_empty(&self.commit) {
            GitRef::Commit(commit)
        } else if let Some(name) = non_empty(&self.tag).or_else(|| non_empty(&self.branch)) {
            GitRef::Named(name)
        } else {
            GitRef::Default
        }
    }
}

impl PodDependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            source: None,
        }
    }

    pub fn with_source(mut self, source: PodLocation) -> Self {
        self.source = Some(source);
        self
    }

    /// Build scheme for this pod: the name up to the first `/`, so a subspec
    /// like `Foo/Bar` builds the `Foo` scheme.
    pub fn scheme_name(&self) -> &str {
        self.name.split('/').next().unwrap_or(&self.name)
    }
}
