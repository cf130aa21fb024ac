use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{PodError, PodResult};
use crate::properties;

pub const BUILD_DIR: &str = "BUILD_DIR";
pub const CONFIGURATION: &str = "CONFIGURATION";
pub const OTHER_CFLAGS: &str = "OTHER_CFLAGS";
pub const HEADER_SEARCH_PATHS: &str = "HEADER_SEARCH_PATHS";
pub const FRAMEWORK_SEARCH_PATHS: &str = "FRAMEWORK_SEARCH_PATHS";

/// The subset of Xcode build settings the pod build needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSettings {
    pub build_dir: String,
    pub configuration: String,
    pub other_cflags: Option<String>,
    pub header_search_paths: Option<String>,
    pub framework_search_paths: Option<String>,
}

impl BuildSettings {
    /// Parse `KEY = value` text as printed by `xcodebuild -showBuildSettings`
    /// (the spaces around `=` are optional). Lines without `=` are ignored and a
    /// later duplicate key overrides an earlier one.
    pub fn parse(text: &str) -> PodResult<Self> {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                continue;
            }
            entries.insert(key.to_string(), value.trim().to_string());
        }
        Self::from_entries(&entries)
    }

    pub fn from_entries(entries: &BTreeMap<String, String>) -> PodResult<Self> {
        let required = |key: &str| {
            entries
                .get(key)
                .cloned()
                .ok_or_else(|| PodError::Settings(format!("missing required key {key}")))
        };
        Ok(Self {
            build_dir: required(BUILD_DIR)?,
            configuration: required(CONFIGURATION)?,
            other_cflags: entries.get(OTHER_CFLAGS).cloned(),
            header_search_paths: entries.get(HEADER_SEARCH_PATHS).cloned(),
            framework_search_paths: entries.get(FRAMEWORK_SEARCH_PATHS).cloned(),
        })
    }

    /// Present keys in a stable order; absent optional keys are omitted.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            (BUILD_DIR, self.build_dir.as_str()),
            (CONFIGURATION, self.configuration.as_str()),
        ];
        let optional = [
            (OTHER_CFLAGS, &self.other_cflags),
            (HEADER_SEARCH_PATHS, &self.header_search_paths),
            (FRAMEWORK_SEARCH_PATHS, &self.framework_search_paths),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                out.push((key, value.as_str()));
            }
        }
        out
    }

    pub fn to_properties(&self) -> String {
        properties::render(self.entries(), Some(" Pod build settings"))
    }

    pub fn from_properties(text: &str) -> PodResult<Self> {
        Self::from_entries(&properties::parse(text))
    }

    /// Persist to `path`, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> PodResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PodError::io(format!("create {}", parent.display()), e))?;
        }
        let mut file = fs::File::create(path).map_err(|e| {
            PodError::io(
                format!("unable to create build settings file {}", path.display()),
                e,
            )
        })?;
        file.write_all(self.to_properties().as_bytes())
            .map_err(|e| PodError::io(format!("write {}", path.display()), e))
    }

    pub fn read_from(path: &Path) -> PodResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| PodError::io(format!("read {}", path.display()), e))?;
        Self::from_properties(&text).map_err(|e| match e {
            PodError::Settings(reason) => {
                PodError::Settings(format!("{}: {reason}", path.display()))
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> BuildSettings {
        BuildSettings {
            build_dir: "/Users/dev/Library/Developer/Xcode/DerivedData/Pods/Build/Products".into(),
            configuration: "Release".into(),
            other_cflags: Some("-fembed-bitcode -DNDEBUG=1".into()),
            header_search_paths: Some("\"$(inherited)\" \"${PODS_ROOT}/Headers/Public\"".into()),
            framework_search_paths: Some("  /leading/space".into()),
        }
    }

    #[test]
    fn parses_minimal_key_values() {
        let settings = BuildSettings::parse("BUILD_DIR=/out\nCONFIGURATION=Debug\n").unwrap();
        assert_eq!(settings.build_dir, "/out");
        assert_eq!(settings.configuration, "Debug");
        assert_eq!(settings.other_cflags, None);
        assert_eq!(settings.header_search_paths, None);
        assert_eq!(settings.framework_search_paths, None);
    }

    #[test]
    fn parses_xcodebuild_output() {
        let text = "\
Command line invocation:
    /usr/bin/xcodebuild -showBuildSettings -project Pods.xcodeproj -scheme shared -sdk iphoneos

Build settings for action build and target shared:
    ACTION = build
    BUILD_DIR = /tmp/DerivedData/Build/Products
    CONFIGURATION = Release
    OTHER_CFLAGS =  -fmodules
    HEADER_SEARCH_PATHS = $(inherited) /tmp/Pods/Headers/Public
";
        let settings = BuildSettings::parse(text).unwrap();
        assert_eq!(settings.build_dir, "/tmp/DerivedData/Build/Products");
        assert_eq!(settings.configuration, "Release");
        assert_eq!(settings.other_cflags.as_deref(), Some("-fmodules"));
        assert_eq!(
            settings.header_search_paths.as_deref(),
            Some("$(inherited) /tmp/Pods/Headers/Public")
        );
        assert_eq!(settings.framework_search_paths, None);
    }

    #[test]
    fn missing_required_key_fails() {
        let err = BuildSettings::parse("BUILD_DIR=/out\n").unwrap_err();
        assert!(matches!(err, PodError::Settings(ref m) if m.contains(CONFIGURATION)));
    }

    #[test]
    fn unknown_keys_are_ignored_on_read() {
        let settings =
            BuildSettings::from_properties("BUILD_DIR=/b\nCONFIGURATION=Debug\nSDKROOT=/sdk\n")
                .unwrap();
        assert_eq!(settings.entries().len(), 2);
    }

    #[test]
    fn absent_optionals_are_omitted_on_write() {
        let settings = BuildSettings::parse("BUILD_DIR=/out\nCONFIGURATION=Debug\n").unwrap();
        let text = settings.to_properties();
        assert!(text.contains("BUILD_DIR=/out\n"));
        assert!(!text.contains(OTHER_CFLAGS));
        assert!(!text.contains(FRAMEWORK_SEARCH_PATHS));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/buildSettings/build-settings-ios_arm64.properties");
        let settings = full();
        settings.write_to(&path).unwrap();
        assert_eq!(BuildSettings::read_from(&path).unwrap(), settings);
    }

    #[test]
    fn partial_round_trip() {
        let settings = BuildSettings {
            other_cflags: None,
            framework_search_paths: None,
            ..full()
        };
        let reread = BuildSettings::from_properties(&settings.to_properties()).unwrap();
        assert_eq!(reread, settings);
    }

    #[test]
    fn write_into_a_directory_path_fails_explicitly() {
        let dir = tempfile::tempdir().unwrap();
        let err = full().write_to(dir.path()).unwrap_err();
        assert!(err.to_string().contains("unable to create build settings file"));
    }

    #[test]
    fn incomplete_file_names_path_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build-settings-ios_arm64.properties");
        std::fs::write(&path, "BUILD_DIR=/out\n").unwrap();

        let err = BuildSettings::read_from(&path).unwrap_err();

        let msg = err.to_string();
        assert!(matches!(err, PodError::Settings(_)));
        assert!(msg.contains(&path.display().to_string()));
        assert!(msg.contains(CONFIGURATION));
        assert_eq!(msg.matches("build settings:").count(), 1, "{msg}");
    }
}
