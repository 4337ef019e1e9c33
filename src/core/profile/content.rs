use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::info;

use super::fsops::{self, MOD_EXTENSION, PACK_EXTENSION};
use super::model::{validate_profile_name, PackEntry, PackType, ProfileItem};
use super::switcher::ProfileSwitcher;
use crate::core::error::{SwitcherError, SwitcherResult};

/// Tells a shader pack from a resource pack by looking inside the archive.
///
/// Shader packs carry a `shaders/` folder at the root (or one level down
/// when zipped with a wrapper folder). Resource packs carry `pack.mcmeta`.
pub fn classify_pack_archive(path: &Path) -> SwitcherResult<PackType> {
    let file = File::open(path).map_err(|e| SwitcherError::io(path, e))?;
    let archive = zip::ZipArchive::new(file)?;

    let mut has_mcmeta = false;
    for name in archive.file_names() {
        let mut parts = name.split('/').filter(|p| !p.is_empty());
        let first = parts.next();
        let second = parts.next();
        let has_more = parts.next().is_some() || name.ends_with('/');

        let shaders_at_root = first == Some("shaders") && (second.is_some() || has_more);
        let shaders_nested = second == Some("shaders") && has_more;
        if shaders_at_root || shaders_nested {
            return Ok(PackType::Shader);
        }

        if name.rsplit('/').next() == Some("pack.mcmeta") {
            has_mcmeta = true;
        }
    }

    if has_mcmeta {
        Ok(PackType::Resource)
    } else {
        Err(SwitcherError::UnknownPackType(path.to_path_buf()))
    }
}

/// Rejects names that would escape the folder they are joined onto.
pub fn validate_file_name(name: &str) -> SwitcherResult<&str> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(SwitcherError::InvalidFileName(name.to_string()));
    }
    Ok(name)
}

enum Placement {
    Mod,
    Pack(PackType),
}

impl ProfileSwitcher {
    /// Copies mods and packs into a profile.
    ///
    /// Jars land in the profile folder, or loose in the active location when
    /// the profile is active. Zips are packs; `pack_type` overrides the
    /// archive inspection. Packs added to the active profile go straight to
    /// the shared folder and are tracked in its manifest. Every file is
    /// checked before any copy happens.
    pub fn add_files_to_profile(
        &self,
        profile: &str,
        files: &[PathBuf],
        pack_type: Option<PackType>,
    ) -> SwitcherResult<Vec<ProfileItem>> {
        let name = validate_profile_name(profile)?.to_string();
        let active = self.store.is_active(&name);
        let profile_dir = self.layout().profile_dir(&name);
        if !active && !profile_dir.is_dir() {
            return Err(SwitcherError::ProfileNotFound(name));
        }

        let mut plan = Vec::with_capacity(files.len());
        for file in files {
            let placement = if fsops::has_extension(file, MOD_EXTENSION) {
                Placement::Mod
            } else if fsops::has_extension(file, PACK_EXTENSION) {
                Placement::Pack(match pack_type {
                    Some(kind) => kind,
                    None => classify_pack_archive(file)?,
                })
            } else {
                return Err(SwitcherError::UnsupportedFile(file.clone()));
            };
            plan.push((file, placement));
        }

        let mut manifest = if active {
            Some(self.store.read_manifest(&name)?)
        } else {
            None
        };
        let mut added = Vec::with_capacity(plan.len());

        for (file, placement) in plan {
            let file_name = fsops::file_name_of(file);
            match placement {
                Placement::Mod => {
                    let dest_dir = if active {
                        self.layout().active_dir().to_path_buf()
                    } else {
                        profile_dir.clone()
                    };
                    fsops::copy_file(file, &dest_dir.join(&file_name))?;
                    info!("Added mod '{}' to '{}'", file_name, name);
                    added.push(ProfileItem::Mod { file_name });
                }
                Placement::Pack(kind) => {
                    let dest_dir = if active {
                        self.layout().shared_pack_dir(kind)
                    } else {
                        self.layout().profile_pack_dir(&name, kind)
                    };
                    fsops::ensure_dir(&dest_dir)?;

                    let dest = dest_dir.join(&file_name);
                    if dest.exists() && !self.conflicts.should_overwrite(&file_name, kind) {
                        info!("Skipped {} '{}': already present", kind.label(), file_name);
                        continue;
                    }

                    fsops::copy_file(file, &dest)?;
                    info!("Added {} '{}' to '{}'", kind.label(), file_name, name);

                    let entry = PackEntry::new(kind, file_name);
                    if let Some(manifest) = manifest.as_mut() {
                        manifest.push(entry.clone());
                    }
                    added.push(ProfileItem::Pack(entry));
                }
            }
        }

        if let Some(manifest) = manifest {
            self.store.write_manifest(&name, &manifest)?;
        }
        Ok(added)
    }

    /// Deletes one mod or pack from a profile. Returns whether a file was
    /// actually removed.
    pub fn remove_file_from_profile(&self, profile: &str, item: &ProfileItem) -> SwitcherResult<bool> {
        let name = validate_profile_name(profile)?;
        let active = self.store.is_active(name);

        match item {
            ProfileItem::Mod { file_name } => {
                let file_name = validate_file_name(file_name)?;
                let dir = if active {
                    self.layout().active_dir().to_path_buf()
                } else {
                    self.layout().profile_dir(name)
                };
                fsops::remove_file_if_exists(&dir.join(file_name))
            }
            ProfileItem::Pack(entry) => {
                validate_file_name(&entry.file_name)?;
                if !active {
                    let path = self
                        .layout()
                        .profile_pack_dir(name, entry.pack_type)
                        .join(&entry.file_name);
                    let removed = fsops::remove_file_if_exists(&path)?;
                    fsops::remove_dir_if_empty(&self.layout().profile_pack_dir(name, entry.pack_type))?;
                    return Ok(removed);
                }

                let mut manifest = self.store.read_manifest(name)?;
                if !manifest.remove(entry) {
                    // Not ours to delete.
                    return Ok(false);
                }
                let path = self
                    .layout()
                    .shared_pack_dir(entry.pack_type)
                    .join(&entry.file_name);
                let removed = fsops::remove_file_if_exists(&path)?;
                self.store.write_manifest(name, &manifest)?;
                Ok(removed)
            }
        }
    }

    /// Folder that downloaded mods for `profile` should be written to.
    pub fn download_dir_for(&self, profile: &str) -> SwitcherResult<PathBuf> {
        let name = validate_profile_name(profile)?;
        if self.store.is_active(name) {
            return Ok(self.layout().active_dir().to_path_buf());
        }
        let dir = self.layout().profile_dir(name);
        if !dir.is_dir() {
            return Err(SwitcherError::ProfileNotFound(name.to_string()));
        }
        Ok(dir)
    }
}
