use std::path::{Component, Path, PathBuf};

use crate::error::{PodError, PodResult};

/// `path` joined onto the current directory when relative, with `.`
/// components dropped. External tools run in other directories, so every
/// path handed to them goes through here.
pub fn absolutize(path: &Path) -> PodResult<PathBuf> {
    if path.is_absolute() {
        return Ok(strip_cur_dir(path));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| PodError::io("resolve current directory", e))?;
    Ok(strip_cur_dir(&cwd.join(path)))
}

fn strip_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
