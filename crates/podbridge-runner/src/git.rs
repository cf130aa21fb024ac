use std::path::{Path, PathBuf};

use podbridge_core::{GitLocation, GitRef, PodError, PodResult};
use serde::Serialize;
use tracing::{info, warn};

use crate::command::{self, CommandRunner, CommandSpec};

/// How a checkout was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `git init` + shallow fetch of one commit + checkout.
    Commit,
    /// Shallow clone of a branch or tag.
    ShallowRef,
    /// Shallow clone of the default branch.
    ShallowDefault,
    /// Full clone, used when the shallow strategy failed.
    FullClone,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Commit => "commit",
            Strategy::ShallowRef => "shallow_ref",
            Strategy::ShallowDefault => "shallow_default",
            Strategy::FullClone => "full_clone",
        }
    }
}

/// Check out `location` into `dest`, replacing anything already there.
///
/// Tries the cheapest strategy for the requested ref. Whatever goes wrong with
/// it, the destination is wiped and a full clone is made instead.
pub async fn retrieve(
    runner: &dyn CommandRunner,
    location: &GitLocation,
    dest: &Path,
) -> PodResult<Strategy> {
    let (parent, dir_name) = split_dest(dest)?;
    std::fs::create_dir_all(&parent)
        .map_err(|e| PodError::io(format!("create {}", parent.display()), e))?;
    remove_dir(dest)?;

    let (strategy, attempt) = match location.selected_ref() {
        GitRef::Commit(commit) => (
            Strategy::Commit,
            fetch_commit(runner, &location.url, commit, dest).await,
        ),
        GitRef::Named(name) => (
            Strategy::ShallowRef,
            clone_shallow(runner, &location.url, Some(name), &parent, &dir_name).await,
        ),
        GitRef::Default => (
            Strategy::ShallowDefault,
            clone_shallow(runner, &location.url, None, &parent, &dir_name).await,
        ),
    };

    match attempt {
        Ok(()) => {
            info!(
                "retrieved {} into {} ({})",
                location.url,
                dest.display(),
                strategy.as_str()
            );
            Ok(strategy)
        }
        Err(e) => {
            warn!(
                "{} retrieval of {} failed, falling back to a full clone: {e}",
                strategy.as_str(),
                location.url
            );
            clone_full(runner, location, &parent, &dir_name).await?;
            info!("retrieved {} into {} (full clone)", location.url, dest.display());
            Ok(Strategy::FullClone)
        }
    }
}

async fn fetch_commit(
    runner: &dyn CommandRunner,
    url: &str,
    commit: &str,
    dest: &Path,
) -> PodResult<()> {
    std::fs::create_dir_all(dest)
        .map_err(|e| PodError::io(format!("create {}", dest.display()), e))?;
    command::run(runner, &CommandSpec::new(["git", "init"], dest)).await?;
    command::run(
        runner,
        &CommandSpec::new(["git", "fetch", "--depth", "1", url, commit], dest),
    )
    .await?;
    command::run(runner, &CommandSpec::new(["git", "checkout", "FETCH_HEAD"], dest)).await?;
    Ok(())
}

async fn clone_shallow(
    runner: &dyn CommandRunner,
    url: &str,
    name: Option<&str>,
    parent: &Path,
    dir_name: &str,
) -> PodResult<()> {
    let mut argv = vec!["git", "clone", url, dir_name];
    if let Some(name) = name {
        argv.extend(["--branch", name]);
    }
    argv.extend(["--depth", "1"]);
    command::run(runner, &CommandSpec::new(argv, parent)).await?;
    Ok(())
}

async fn clone_full(
    runner: &dyn CommandRunner,
    location: &GitLocation,
    parent: &Path,
    dir_name: &str,
) -> PodResult<()> {
    // Drop whatever the failed attempt left behind.
    let dest = parent.join(dir_name);
    remove_dir(&dest)?;

    command::run(
        runner,
        &CommandSpec::new(["git", "clone", location.url.as_str(), dir_name], parent),
    )
    .await?;

    let wanted = match location.selected_ref() {
        GitRef::Commit(rev) | GitRef::Named(rev) => rev,
        GitRef::Default => return Ok(()),
    };
    command::run(runner, &CommandSpec::new(["git", "checkout", wanted], &dest)).await?;
    Ok(())
}

fn split_dest(dest: &Path) -> PodResult<(PathBuf, String)> {
    let dir_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            PodError::InvalidInput(format!("checkout destination {} has no name", dest.display()))
        })?;
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok((parent, dir_name))
}

fn remove_dir(dir: &Path) -> PodResult<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)
            .map_err(|e| PodError::io(format!("remove {}", dir.display()), e))?;
    }
    Ok(())
}
