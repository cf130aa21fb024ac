use std::path::{Path, PathBuf};

use podbridge_core::{absolutize, Family, PodResult, Target};

/// Where each step keeps its output under the build root.
#[derive(Debug, Clone)]
pub struct BuildLayout {
    root: PathBuf,
}

impl BuildLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at `root` made absolute, for roots given on the command line.
    pub fn resolve(root: &Path) -> PodResult<Self> {
        Ok(Self::new(absolutize(root)?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git_source_dir(&self, pod_dir_name: &str) -> PathBuf {
        self.root.join("externalSources").join("git").join(pod_dir_name)
    }

    pub fn url_source_dir(&self, pod_dir_name: &str) -> PathBuf {
        self.root.join("externalSources").join("url").join(pod_dir_name)
    }

    /// `--gen-directory` for `pod gen`.
    pub fn synthetic_dir(&self, family: Family) -> PathBuf {
        self.root.join("synthetic").join(family.as_str())
    }

    pub fn build_settings_file(&self, target: Target) -> PathBuf {
        self.root
            .join("buildSettings")
            .join(format!("build-settings-{}.properties", target.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_root() {
        let layout = BuildLayout::new("/work/build/cocoapods");
        assert_eq!(
            layout.git_source_dir("Foo"),
            PathBuf::from("/work/build/cocoapods/externalSources/git/Foo")
        );
        assert_eq!(
            layout.url_source_dir("Bar"),
            PathBuf::from("/work/build/cocoapods/externalSources/url/Bar")
        );
        assert_eq!(
            layout.synthetic_dir(Family::Ios),
            PathBuf::from("/work/build/cocoapods/synthetic/ios")
        );
        assert_eq!(
            layout.build_settings_file(Target::IosSimulatorArm64),
            PathBuf::from(
                "/work/build/cocoapods/buildSettings/build-settings-ios_simulator_arm64.properties"
            )
        );
    }

    #[test]
    fn resolve_makes_root_absolute() {
        let layout = BuildLayout::resolve(Path::new("build/cocoapods")).unwrap();
        assert!(layout.root().is_absolute());
        assert!(layout.synthetic_dir(Family::Ios).ends_with("build/cocoapods/synthetic/ios"));
    }
}
