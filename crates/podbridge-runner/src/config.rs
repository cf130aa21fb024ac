use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use podbridge_core::Target;

#[derive(Debug, Parser)]
#[command(name = "podbridge", about = "CocoaPods build orchestration for Apple targets")]
pub struct Cli {
    /// JSON manifest describing the framework and its pods
    #[arg(long, global = true, env = "PODBRIDGE_MANIFEST", default_value = "podbridge.json")]
    pub manifest: PathBuf,

    /// Directory that holds checkouts, generated projects and build settings
    #[arg(long, global = true, env = "PODBRIDGE_BUILD_ROOT", default_value = "build/cocoapods")]
    pub build_root: PathBuf,

    /// Timeout for each external command (seconds).
    #[arg(long, global = true, env = "PODBRIDGE_COMMAND_TIMEOUT", default_value = "3600")]
    pub command_timeout: u64,

    /// Grace period after SIGTERM before SIGKILL (seconds).
    #[arg(long, global = true, env = "PODBRIDGE_KILL_GRACE", default_value = "10")]
    pub kill_grace: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that git, pod and xcodebuild are installed
    Preflight,
    /// Retrieve git checkouts and download URL podspecs
    Fetch,
    /// Run `pod install` for the configured Podfile
    Install,
    /// Synthesize the Pods project with `pod gen`
    Gen(TargetArgs),
    /// Extract and persist build settings for a target
    SetupBuild(TargetArgs),
    /// Build every pod for a target
    Build(TargetArgs),
    /// Fetch, install, gen, setup-build and build; prints a JSON report
    Run(TargetArgs),
}

#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Target name, e.g. ios_simulator_arm64
    #[arg(long, env = "PODBRIDGE_TARGET")]
    pub target: Target,
}

impl Cli {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout)
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_secs(self.kill_grace)
    }
}
