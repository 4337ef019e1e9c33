use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use super::content::validate_file_name;
use super::fsops;
use crate::core::error::{SwitcherError, SwitcherResult};

/// Timestamped copies of the loose jars in the active location.
pub struct BackupManager {
    root: PathBuf,
}

impl BackupManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copies every loose jar of `active_dir` into a new backup folder and
    /// returns its path.
    pub fn backup_current_mods(&self, active_dir: &Path) -> SwitcherResult<PathBuf> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut dir = self.root.join(&stamp);
        let mut suffix = 1;
        while dir.exists() {
            dir = self.root.join(format!("{stamp}_{suffix}"));
            suffix += 1;
        }
        fsops::ensure_dir(&dir)?;

        let jars = fsops::list_mod_files(active_dir)?;
        for jar in &jars {
            fsops::copy_file(jar, &dir.join(fsops::file_name_of(jar)))?;
        }

        info!("Backed up {} mod(s) to {:?}", jars.len(), dir);
        Ok(dir)
    }

    /// Replaces the loose jars of `active_dir` with the backup's jars.
    /// Returns how many were restored.
    pub fn restore(&self, name: &str, active_dir: &Path) -> SwitcherResult<usize> {
        let name = validate_file_name(name)?;
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(SwitcherError::BackupNotFound(name.to_string()));
        }

        for jar in fsops::list_mod_files(active_dir)? {
            fsops::remove_file_if_exists(&jar)?;
        }

        let jars = fsops::list_mod_files(&dir)?;
        for jar in &jars {
            fsops::copy_file(jar, &active_dir.join(fsops::file_name_of(jar)))?;
        }

        info!("Restored {} mod(s) from backup '{}'", jars.len(), name);
        Ok(jars.len())
    }

    /// Backup names, newest first.
    pub fn list_backups(&self) -> SwitcherResult<Vec<String>> {
        let mut names = fsops::list_visible_subdirs(&self.root)?;
        names.reverse();
        Ok(names)
    }
}
