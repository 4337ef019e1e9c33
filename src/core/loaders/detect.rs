use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::model::{LoaderInfo, LoaderType};

const VERSIONS_DIR: &str = "versions";
const LIBRARIES_DIR: &str = "libraries";
const LAUNCHER_PROFILES: &str = "launcher_profiles.json";

/// Checks every known loader against `minecraft_dir`.
pub fn detect(minecraft_dir: &Path) -> Vec<LoaderInfo> {
    LoaderType::ALL
        .into_iter()
        .map(|loader| LoaderInfo {
            loader,
            name: loader.display_name().to_string(),
            installed: is_installed(minecraft_dir, loader),
            installer_url: loader.installer_url().to_string(),
        })
        .collect()
}

/// A loader counts as installed when a version folder is named after it,
/// the launcher profiles mention it, or its libraries are present.
pub fn is_installed(minecraft_dir: &Path, loader: LoaderType) -> bool {
    let found = in_versions_dir(minecraft_dir, loader)
        || in_launcher_profiles(minecraft_dir, loader)
        || minecraft_dir
            .join(LIBRARIES_DIR)
            .join(loader.library_path())
            .is_dir();
    debug!("Loader {} installed in {:?}: {}", loader, minecraft_dir, found);
    found
}

fn in_versions_dir(minecraft_dir: &Path, loader: LoaderType) -> bool {
    let Ok(entries) = fs::read_dir(minecraft_dir.join(VERSIONS_DIR)) else {
        return false;
    };
    entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .any(|e| loader.mentioned_in(&e.file_name().to_string_lossy()))
}

fn in_launcher_profiles(minecraft_dir: &Path, loader: LoaderType) -> bool {
    let path = minecraft_dir.join(LAUNCHER_PROFILES);
    if !path.is_file() {
        return false;
    }
    match fs::read_to_string(&path) {
        Ok(text) => loader.mentioned_in(&text),
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            false
        }
    }
}
