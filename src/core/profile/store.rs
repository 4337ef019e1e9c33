use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::fsops;
use super::model::{PackManifest, PackType};
use crate::core::error::{SwitcherError, SwitcherResult};

const MARKER_FILE: &str = ".active_profile";
const MANIFEST_PREFIX: &str = ".packs_";

/// Where everything lives on disk.
///
/// - `<mods_dir>/`                   : active location (loose jars)
/// - `<mods_dir>/<profile>/`         : inactive profile storage
/// - `<mods_dir>/<profile>/<packs>/` : stored resource / shader packs
/// - `<minecraft_dir>/<packs>/`      : shared pack folders read by the game
/// - `<mods_dir>/.active_profile`    : active marker
/// - `<mods_dir>/.packs_<profile>`   : pack manifest per profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    mods_dir: PathBuf,
    minecraft_dir: PathBuf,
}

impl StoreLayout {
    pub fn new(mods_dir: impl Into<PathBuf>, minecraft_dir: impl Into<PathBuf>) -> Self {
        Self {
            mods_dir: mods_dir.into(),
            minecraft_dir: minecraft_dir.into(),
        }
    }

    /// Layout for a standard `.minecraft` directory.
    pub fn for_minecraft_dir(minecraft_dir: impl Into<PathBuf>) -> Self {
        let minecraft_dir = minecraft_dir.into();
        Self {
            mods_dir: minecraft_dir.join("mods"),
            minecraft_dir,
        }
    }

    /// Path to the active location.
    pub fn active_dir(&self) -> &Path {
        &self.mods_dir
    }

    pub fn minecraft_dir(&self) -> &Path {
        &self.minecraft_dir
    }

    pub fn profile_dir(&self, name: &str) -> PathBuf {
        self.mods_dir.join(name)
    }

    pub fn profile_pack_dir(&self, name: &str, pack_type: PackType) -> PathBuf {
        self.profile_dir(name).join(pack_type.dir_name())
    }

    pub fn shared_pack_dir(&self, pack_type: PackType) -> PathBuf {
        self.minecraft_dir.join(pack_type.dir_name())
    }

    pub fn marker_path(&self) -> PathBuf {
        self.mods_dir.join(MARKER_FILE)
    }

    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.mods_dir.join(format!("{MANIFEST_PREFIX}{name}"))
    }
}

/// Durable cross-call state: the active marker and the per-profile pack
/// manifests. The marker is loaded once and cached; manifests are read on
/// demand because only the engine writes them.
#[derive(Debug)]
pub struct ProfileStore {
    layout: StoreLayout,
    active: Option<String>,
}

impl ProfileStore {
    /// Opens the store, creating the active location if it is missing.
    pub fn load(layout: StoreLayout) -> SwitcherResult<Self> {
        fsops::ensure_dir(layout.active_dir())?;
        let active = read_marker(&layout.marker_path())?;
        debug!("Loaded profile store at {:?} (active: {:?})", layout.active_dir(), active);
        Ok(Self { layout, active })
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.as_deref() == Some(name)
    }

    /// Persists the marker. `None` deletes the marker file.
    pub fn set_active(&mut self, name: Option<&str>) -> SwitcherResult<()> {
        let path = self.layout.marker_path();
        match name {
            Some(name) => {
                fs::write(&path, name).map_err(|e| SwitcherError::io(&path, e))?;
            }
            None => {
                fsops::remove_file_if_exists(&path)?;
            }
        }
        self.active = name.map(str::to_string);
        Ok(())
    }

    pub fn read_manifest(&self, name: &str) -> SwitcherResult<PackManifest> {
        let path = self.layout.manifest_path(name);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(PackManifest::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PackManifest::new()),
            Err(e) => Err(SwitcherError::io(path, e)),
        }
    }

    /// Persists a manifest. An empty manifest removes the file.
    pub fn write_manifest(&self, name: &str, manifest: &PackManifest) -> SwitcherResult<()> {
        let path = self.layout.manifest_path(name);
        if manifest.is_empty() {
            fsops::remove_file_if_exists(&path)?;
            return Ok(());
        }
        fs::write(&path, manifest.render()).map_err(|e| SwitcherError::io(path, e))
    }

    pub fn clear_manifest(&self, name: &str) -> SwitcherResult<()> {
        fsops::remove_file_if_exists(&self.layout.manifest_path(name))?;
        Ok(())
    }

    /// Moves a manifest to a new profile name, replacing any manifest there.
    pub fn rename_manifest(&self, old: &str, new: &str) -> SwitcherResult<()> {
        let from = self.layout.manifest_path(old);
        if from.is_file() {
            fsops::move_file(&from, &self.layout.manifest_path(new))?;
        }
        Ok(())
    }
}

fn read_marker(path: &Path) -> SwitcherResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let name = text.trim();
            Ok((!name.is_empty()).then(|| name.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SwitcherError::io(path, e)),
    }
}
