use std::path::Path;

use podbridge_core::{PodError, PodResult};
use tracing::info;

use crate::command::{self, CommandRunner, CommandSpec};

/// Run all preflight checks before touching the build root.
pub async fn run_all(runner: &dyn CommandRunner) -> PodResult<()> {
    check_tool(runner, &["git", "--version"], "Install git and try again.").await?;
    check_tool(
        runner,
        &["pod", "--version"],
        "Install CocoaPods and the generate plugin: gem install cocoapods cocoapods-generate",
    )
    .await?;
    check_tool(
        runner,
        &["xcodebuild", "-version"],
        "Install Xcode and select it with xcode-select.",
    )
    .await?;
    info!("all preflight checks passed");
    Ok(())
}

async fn check_tool(runner: &dyn CommandRunner, argv: &[&str], hint: &str) -> PodResult<()> {
    let spec = CommandSpec::new(argv.iter().copied(), Path::new("."));
    let stdout = command::run(runner, &spec).await.map_err(|e| match e {
        PodError::Spawn { .. } => PodError::ToolMissing {
            tool: spec.program().to_string(),
            hint: hint.to_string(),
        },
        other => other,
    })?;
    info!(
        "{}: {}",
        spec.program(),
        stdout.lines().next().unwrap_or("").trim()
    );
    Ok(())
}
