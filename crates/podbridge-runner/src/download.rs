use std::path::{Path, PathBuf};

use podbridge_core::{PodError, PodResult};
use tracing::info;

/// File name a podspec fetched from `url` is stored under: the URL's last
/// path segment when it already names a podspec, otherwise `<pod>.podspec`.
pub fn podspec_file_name(url: &str, pod_dir_name: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| last.ends_with(".podspec") || last.ends_with(".podspec.json"))
        .unwrap_or_else(|| format!("{pod_dir_name}.podspec"))
}

/// Download a podspec into `dest_dir`, returning the path of the written file.
pub async fn download_podspec(
    client: &reqwest::Client,
    url: &str,
    dest_dir: &Path,
    pod_dir_name: &str,
) -> PodResult<PathBuf> {
    let download_error = |reason: String| PodError::Download {
        url: url.to_string(),
        reason,
    };

    let parsed = url::Url::parse(url).map_err(|e| download_error(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(download_error(format!("unsupported scheme '{}'", parsed.scheme())));
    }

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| download_error(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(download_error(format!("server answered {status}")));
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| download_error(e.to_string()))?;

    if dest_dir.exists() {
        std::fs::remove_dir_all(dest_dir)
            .map_err(|e| PodError::io(format!("remove {}", dest_dir.display()), e))?;
    }
    std::fs::create_dir_all(dest_dir)
        .map_err(|e| PodError::io(format!("create {}", dest_dir.display()), e))?;
    let path = dest_dir.join(podspec_file_name(url, pod_dir_name));
    std::fs::write(&path, &body)
        .map_err(|e| PodError::io(format!("write {}", path.display()), e))?;

    info!("downloaded {url} to {}", path.display());
    Ok(path)
}
