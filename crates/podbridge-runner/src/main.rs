use anyhow::{Context, Result};
use clap::Parser;
use podbridge_core::PodManifest;
use podbridge_runner::config::{Cli, Command};
use podbridge_runner::{preflight, BuildLayout, Pipeline, ProcessRunner};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runner = ProcessRunner::new(cli.command_timeout(), cli.kill_grace());
    info!("podbridge starting");

    if let Command::Preflight = cli.command {
        preflight::run_all(&runner).await?;
        return Ok(());
    }

    let manifest = PodManifest::load(&cli.manifest)
        .with_context(|| format!("failed to load manifest {}", cli.manifest.display()))?;
    info!(
        "framework {} with {} pod(s), build root {}",
        manifest.framework_name,
        manifest.pods.len(),
        cli.build_root.display()
    );
    let layout = BuildLayout::resolve(&cli.build_root)
        .with_context(|| format!("invalid build root {}", cli.build_root.display()))?;
    let pipeline = Pipeline::new(manifest, layout, &runner);

    match &cli.command {
        Command::Preflight => {}
        Command::Fetch => {
            let fetched = pipeline.fetch().await.context("fetch failed")?;
            for source in fetched {
                println!("{}\t{}", source.pod, source.path.display());
            }
        }
        Command::Install => {
            let outcome = pipeline.install().await.context("pod install failed")?;
            info!("install: {outcome:?}");
        }
        Command::Gen(args) => {
            let outcome = pipeline
                .generate(args.target)
                .await
                .context("pod gen failed")?;
            info!("gen: {outcome:?}");
        }
        Command::SetupBuild(args) => {
            let outcome = pipeline
                .setup_build(args.target)
                .await
                .context("build settings extraction failed")?;
            info!("setup-build: {outcome:?}");
        }
        Command::Build(args) => {
            let outcome = pipeline
                .build(args.target)
                .await
                .context("pod build failed")?;
            info!("build: {outcome:?}");
        }
        Command::Run(args) => {
            let report = pipeline
                .run(args.target)
                .await
                .with_context(|| format!("pipeline for {} failed", args.target))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
