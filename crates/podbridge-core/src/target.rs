use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PodError, PodResult};

/// Apple OS family a target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Ios,
    Macos,
    Tvos,
    Watchos,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Ios => "ios",
            Family::Macos => "macos",
            Family::Tvos => "tvos",
            Family::Watchos => "watchos",
        }
    }

    /// Platform name understood by `pod gen --platforms`.
    pub fn pod_platform(&self) -> &'static str {
        match self {
            Family::Ios => "ios",
            Family::Macos => "osx",
            Family::Tvos => "tvos",
            Family::Watchos => "watchos",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SDK identifier passed to `xcodebuild -sdk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sdk {
    IphoneOs,
    IphoneSimulator,
    WatchOs,
    WatchSimulator,
    AppleTvOs,
    AppleTvSimulator,
    MacOsx,
}

impl Sdk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sdk::IphoneOs => "iphoneos",
            Sdk::IphoneSimulator => "iphonesimulator",
            Sdk::WatchOs => "watchos",
            Sdk::WatchSimulator => "watchsimulator",
            Sdk::AppleTvOs => "appletvos",
            Sdk::AppleTvSimulator => "appletvsimulator",
            Sdk::MacOsx => "macosx",
        }
    }
}

impl fmt::Display for Sdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native compilation target (OS + architecture).
///
/// Non-Apple targets parse so that a multiplatform build can name them, but
/// have no family and no SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    IosX64,
    IosSimulatorArm64,
    IosArm32,
    IosArm64,
    WatchosX86,
    WatchosX64,
    WatchosSimulatorArm64,
    WatchosArm32,
    WatchosArm64,
    WatchosDeviceArm64,
    TvosX64,
    TvosSimulatorArm64,
    TvosArm64,
    MacosX64,
    MacosArm64,
    LinuxX64,
    LinuxArm64,
    MingwX64,
    AndroidArm64,
    AndroidX64,
}

impl Target {
    pub const ALL: [Target; 20] = [
        Target::IosX64,
        Target::IosSimulatorArm64,
        Target::IosArm32,
        Target::IosArm64,
        Target::WatchosX86,
        Target::WatchosX64,
        Target::WatchosSimulatorArm64,
        Target::WatchosArm32,
        Target::WatchosArm64,
        Target::WatchosDeviceArm64,
        Target::TvosX64,
        Target::TvosSimulatorArm64,
        Target::TvosArm64,
        Target::MacosX64,
        Target::MacosArm64,
        Target::LinuxX64,
        Target::LinuxArm64,
        Target::MingwX64,
        Target::AndroidArm64,
        Target::AndroidX64,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::IosX64 => "ios_x64",
            Target::IosSimulatorArm64 => "ios_simulator_arm64",
            Target::IosArm32 => "ios_arm32",
            Target::IosArm64 => "ios_arm64",
            Target::WatchosX86 => "watchos_x86",
            Target::WatchosX64 => "watchos_x64",
            Target::WatchosSimulatorArm64 => "watchos_simulator_arm64",
            Target::WatchosArm32 => "watchos_arm32",
            Target::WatchosArm64 => "watchos_arm64",
            Target::WatchosDeviceArm64 => "watchos_device_arm64",
            Target::TvosX64 => "tvos_x64",
            Target::TvosSimulatorArm64 => "tvos_simulator_arm64",
            Target::TvosArm64 => "tvos_arm64",
            Target::MacosX64 => "macos_x64",
            Target::MacosArm64 => "macos_arm64",
            Target::LinuxX64 => "linux_x64",
            Target::LinuxArm64 => "linux_arm64",
            Target::MingwX64 => "mingw_x64",
            Target::AndroidArm64 => "android_arm64",
            Target::AndroidX64 => "android_x64",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        Target::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn family(&self) -> Option<Family> {
        match self {
            Target::IosX64 | Target::IosSimulatorArm64 | Target::IosArm32 | Target::IosArm64 => {
                Some(Family::Ios)
            }
            Target::WatchosX86
            | Target::WatchosX64
            | Target::WatchosSimulatorArm64
            | Target::WatchosArm32
            | Target::WatchosArm64
            | Target::WatchosDeviceArm64 => Some(Family::Watchos),
            Target::TvosX64 | Target::TvosSimulatorArm64 | Target::TvosArm64 => {
                Some(Family::Tvos)
            }
            Target::MacosX64 | Target::MacosArm64 => Some(Family::Macos),
            Target::LinuxX64
            | Target::LinuxArm64
            | Target::MingwX64
            | Target::AndroidArm64
            | Target::AndroidX64 => None,
        }
    }

    /// Family of an Apple target; any other target is a configuration failure.
    pub fn require_family(&self) -> PodResult<Family> {
        self.family()
            .ok_or_else(|| PodError::Configuration(self.as_str().to_string()))
    }

    pub fn sdk(&self) -> PodResult<Sdk> {
        let sdk = match self {
            Target::IosX64 | Target::IosSimulatorArm64 => Sdk::IphoneSimulator,
            Target::IosArm32 | Target::IosArm64 => Sdk::IphoneOs,
            Target::WatchosX86 | Target::WatchosX64 | Target::WatchosSimulatorArm64 => {
                Sdk::WatchSimulator
            }
            Target::WatchosArm32 | Target::WatchosArm64 | Target::WatchosDeviceArm64 => {
                Sdk::WatchOs
            }
            Target::TvosX64 | Target::TvosSimulatorArm64 => Sdk::AppleTvSimulator,
            Target::TvosArm64 => Sdk::AppleTvOs,
            Target::MacosX64 | Target::MacosArm64 => Sdk::MacOsx,
            _ => return Err(PodError::Configuration(self.as_str().to_string())),
        };
        Ok(sdk)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = PodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Target::parse_str(&normalized)
            .ok_or_else(|| PodError::InvalidInput(format!("unknown target '{s}'")))
    }
}
