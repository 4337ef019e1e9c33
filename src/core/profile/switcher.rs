use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::conflict::{ConflictResolver, OverwriteExisting};
use super::fsops;
use super::model::{validate_profile_name, PackEntry, PackManifest, PackType};
use super::store::{ProfileStore, StoreLayout};
use crate::core::error::{SwitcherError, SwitcherResult};

/// Moves mod jars and asset packs between the active location and
/// per-profile storage.
///
/// At most one profile's jars are loose in the active location at a time;
/// the marker names it. Operations are blocking and must run one at a time
/// to completion against a given store. There is no locking: concurrent
/// callers on the same `.minecraft` race.
///
/// Multi-step operations are best-effort. If a move fails halfway, the
/// error is returned and nothing is rolled back. The marker and manifests
/// are written as the last steps, so they still describe the state before
/// the failed operation. Naming the partial set after the target with
/// [`ProfileSwitcher::set_active_profile_name`] and switching again
/// finishes the job.
pub struct ProfileSwitcher {
    pub(super) store: ProfileStore,
    pub(super) conflicts: Arc<dyn ConflictResolver>,
}

impl ProfileSwitcher {
    pub fn open(layout: StoreLayout) -> SwitcherResult<Self> {
        Ok(Self {
            store: ProfileStore::load(layout)?,
            conflicts: Arc::new(OverwriteExisting),
        })
    }

    pub fn with_conflict_resolver(mut self, resolver: impl ConflictResolver + 'static) -> Self {
        self.conflicts = Arc::new(resolver);
        self
    }

    /// Replaces the policy consulted before a deployed pack overwrites a
    /// shared file.
    pub fn set_conflict_resolver(&mut self, resolver: Arc<dyn ConflictResolver>) {
        self.conflicts = resolver;
    }

    pub fn layout(&self) -> &StoreLayout {
        self.store.layout()
    }

    /// Name of the profile whose jars are loose in the active location.
    pub fn active_profile_name(&self) -> Option<&str> {
        self.store.active()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.store.is_active(name.trim())
    }

    pub fn profile_exists(&self, name: &str) -> bool {
        validate_profile_name(name)
            .map(|n| self.layout().profile_dir(n).is_dir())
            .unwrap_or(false)
    }

    // ── Switching ───────────────────────────────────────

    /// Stashes whatever is active, then activates `target`.
    ///
    /// `name_for_current` names the loose jars when no marker is set.
    pub fn switch_to(&mut self, target: &str, name_for_current: Option<&str>) -> SwitcherResult<()> {
        let target = validate_profile_name(target)?.to_string();
        let target_dir = self.layout().profile_dir(&target);
        if !target_dir.is_dir() {
            return Err(SwitcherError::ProfileNotFound(target));
        }

        let loose = fsops::list_mod_files(self.layout().active_dir())?;
        if !loose.is_empty() {
            let stash_name = self.stash_name(name_for_current)?;
            self.stash(&stash_name, &loose)?;
            info!("Stashed {} mod(s) into profile '{}'", loose.len(), stash_name);
        }

        let (jar_count, manifest) = self.activate(&target, &target_dir)?;

        self.store.write_manifest(&target, &manifest)?;
        self.store.set_active(Some(&target))?;

        info!(
            "Switched to profile '{}' ({} mod(s), {} pack(s))",
            target,
            jar_count,
            manifest.len()
        );
        Ok(())
    }

    /// Stashes the active jars and tracked packs into profile storage and
    /// leaves no profile active.
    pub fn deactivate(&mut self, name_override: Option<&str>) -> SwitcherResult<()> {
        let name_override = name_override.map(str::trim).filter(|n| !n.is_empty());
        let loose = fsops::list_mod_files(self.layout().active_dir())?;

        let name = name_override
            .map(str::to_string)
            .or_else(|| self.store.active().map(str::to_string));
        let has_tracked_packs = match &name {
            Some(n) => !self.store.read_manifest(n)?.is_empty(),
            None => false,
        };

        if loose.is_empty() && !has_tracked_packs && name_override.is_none() {
            debug!("Nothing to deactivate");
            return Ok(());
        }

        let name = name.ok_or(SwitcherError::AmbiguousActiveState)?;
        let name = validate_profile_name(&name)?.to_string();

        self.stash(&name, &loose)?;
        self.store.set_active(None)?;

        info!("Deactivated; {} mod(s) saved as profile '{}'", loose.len(), name);
        Ok(())
    }

    /// Rewrites the marker without moving any file. Blank clears it.
    pub fn set_active_profile_name(&mut self, name: &str) -> SwitcherResult<()> {
        if name.trim().is_empty() {
            return self.store.set_active(None);
        }
        let name = validate_profile_name(name)?;
        self.store.set_active(Some(name))
    }

    fn stash_name(&self, name_for_current: Option<&str>) -> SwitcherResult<String> {
        if let Some(active) = self.store.active() {
            return Ok(active.to_string());
        }
        match name_for_current.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => Ok(validate_profile_name(name)?.to_string()),
            None => Err(SwitcherError::AmbiguousActiveState),
        }
    }

    /// Moves `loose` jars into the profile folder, then brings back the
    /// packs its manifest tracks. Stashing always overwrites.
    fn stash(&self, name: &str, loose: &[PathBuf]) -> SwitcherResult<()> {
        let stash_dir = self.layout().profile_dir(name);
        fsops::ensure_dir(&stash_dir)?;

        for jar in loose {
            fsops::move_file(jar, &stash_dir.join(fsops::file_name_of(jar)))?;
        }

        self.stash_packs(name)
    }

    fn stash_packs(&self, name: &str) -> SwitcherResult<()> {
        let manifest = self.store.read_manifest(name)?;
        if manifest.is_empty() {
            return Ok(());
        }

        for entry in manifest.entries() {
            let shared = self
                .layout()
                .shared_pack_dir(entry.pack_type)
                .join(&entry.file_name);
            if !shared.is_file() {
                debug!("Tracked {} {:?} is gone, skipping", entry.pack_type.label(), shared);
                continue;
            }

            let dest_dir = self.layout().profile_pack_dir(name, entry.pack_type);
            fsops::ensure_dir(&dest_dir)?;
            fsops::move_file(&shared, &dest_dir.join(&entry.file_name))?;
        }

        self.store.clear_manifest(name)
    }

    /// Moves the target's jars and packs out of storage. Returns the jar
    /// count and the fresh manifest of deployed packs.
    fn activate(&self, target: &str, target_dir: &Path) -> SwitcherResult<(usize, PackManifest)> {
        // Packs left deployed by an interrupted earlier activation go back
        // to storage first so they are redeployed and tracked again.
        self.stash_packs(target)?;

        let active_dir = self.layout().active_dir();
        let jars = fsops::list_mod_files(target_dir)?;
        for jar in &jars {
            fsops::move_file(jar, &active_dir.join(fsops::file_name_of(jar)))?;
        }

        let mut manifest = PackManifest::new();
        if let Err(err) = self.deploy_packs(target, &mut manifest) {
            // Keep what was deployed so a later stash can still reverse it.
            self.store.write_manifest(target, &manifest)?;
            return Err(err);
        }

        if fsops::remove_dir_if_empty(target_dir)? {
            debug!("Removed emptied profile folder {:?}", target_dir);
        }

        Ok((jars.len(), manifest))
    }

    fn deploy_packs(&self, target: &str, manifest: &mut PackManifest) -> SwitcherResult<()> {
        for pack_type in PackType::ALL {
            let src_dir = self.layout().profile_pack_dir(target, pack_type);
            if !src_dir.is_dir() {
                continue;
            }

            let dest_dir = self.layout().shared_pack_dir(pack_type);
            fsops::ensure_dir(&dest_dir)?;

            for file in fsops::list_files(&src_dir)? {
                let file_name = fsops::file_name_of(&file);
                let dest = dest_dir.join(&file_name);

                if dest.exists() && !self.conflicts.should_overwrite(&file_name, pack_type) {
                    info!(
                        "Kept existing {} '{}'; profile copy stays in storage",
                        pack_type.label(),
                        file_name
                    );
                    continue;
                }

                fsops::move_file(&file, &dest)?;
                manifest.push(PackEntry::new(pack_type, file_name));
            }

            fsops::remove_dir_if_empty(&src_dir)?;
        }

        Ok(())
    }

    // ── Folder management ───────────────────────────────

    pub fn create_profile_folder(&self, name: &str) -> SwitcherResult<()> {
        let name = validate_profile_name(name)?;
        let dir = self.layout().profile_dir(name);
        if dir.exists() {
            return Err(SwitcherError::AlreadyExists(name.to_string()));
        }
        fs::create_dir_all(&dir).map_err(|e| SwitcherError::io(&dir, e))?;
        info!("Created profile folder '{}'", name);
        Ok(())
    }

    /// Renames a profile folder. If `old` is the active profile, only the
    /// marker and its manifest are relabelled when it has no folder; its
    /// jars stay loose in the active location either way.
    pub fn rename_profile_folder(&mut self, old: &str, new: &str) -> SwitcherResult<()> {
        let old = validate_profile_name(old)?.to_string();
        let new = validate_profile_name(new)?.to_string();
        let old_dir = self.layout().profile_dir(&old);
        let new_dir = self.layout().profile_dir(&new);
        let was_active = self.store.is_active(&old);

        if !old_dir.is_dir() && !was_active {
            return Err(SwitcherError::ProfileNotFound(old));
        }
        if new_dir.exists() {
            return Err(SwitcherError::AlreadyExists(new));
        }

        if old_dir.is_dir() {
            fs::rename(&old_dir, &new_dir).map_err(|e| SwitcherError::io(&old_dir, e))?;
        }

        if was_active {
            self.store.rename_manifest(&old, &new)?;
            self.store.set_active(Some(&new))?;
        }

        info!("Renamed profile '{}' -> '{}'", old, new);
        Ok(())
    }

    pub fn delete_profile_folder(&self, name: &str) -> SwitcherResult<()> {
        let name = validate_profile_name(name)?;
        if self.store.is_active(name) {
            return Err(SwitcherError::CannotDeleteActive(name.to_string()));
        }

        let dir = self.layout().profile_dir(name);
        if !dir.is_dir() {
            return Err(SwitcherError::ProfileNotFound(name.to_string()));
        }

        fs::remove_dir_all(&dir).map_err(|e| SwitcherError::io(&dir, e))?;
        if let Err(e) = self.store.clear_manifest(name) {
            warn!("Could not remove stale pack manifest of '{}': {}", name, e);
        }
        info!("Deleted profile folder '{}'", name);
        Ok(())
    }

    // ── Listing ─────────────────────────────────────────

    /// Profile storage folders, sorted. Dot entries are skipped.
    pub fn list_inactive_profiles(&self) -> SwitcherResult<Vec<String>> {
        fsops::list_visible_subdirs(self.layout().active_dir())
    }

    pub fn list_profile_jars(&self, name: &str) -> SwitcherResult<Vec<String>> {
        let name = validate_profile_name(name)?;
        jar_names(&self.layout().profile_dir(name))
    }

    pub fn list_active_jars(&self) -> SwitcherResult<Vec<String>> {
        jar_names(self.layout().active_dir())
    }

    pub fn active_jar_count(&self) -> SwitcherResult<usize> {
        Ok(fsops::list_mod_files(self.layout().active_dir())?.len())
    }

    /// Packs stored inside a profile folder, resource packs first.
    pub fn list_profile_packs(&self, name: &str) -> SwitcherResult<Vec<PackEntry>> {
        let name = validate_profile_name(name)?;
        let mut packs = Vec::new();
        for pack_type in PackType::ALL {
            for file in fsops::list_files(&self.layout().profile_pack_dir(name, pack_type))? {
                packs.push(PackEntry::new(pack_type, fsops::file_name_of(&file)));
            }
        }
        Ok(packs)
    }

    /// Packs the active profile is tracked as owning. Other files in the
    /// shared pack folders are not reported.
    pub fn list_active_profile_packs(&self) -> SwitcherResult<Vec<PackEntry>> {
        match self.store.active() {
            Some(name) => Ok(self.store.read_manifest(name)?.into_entries()),
            None => Ok(Vec::new()),
        }
    }
}

fn jar_names(dir: &Path) -> SwitcherResult<Vec<String>> {
    Ok(fsops::list_mod_files(dir)?
        .iter()
        .map(|p| fsops::file_name_of(p))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::conflict::KeepExisting;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        _root: TempDir,
        layout: StoreLayout,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let layout = StoreLayout::for_minecraft_dir(root.path().join(".minecraft"));
        fs::create_dir_all(layout.active_dir()).unwrap();
        Fixture {
            _root: root,
            layout,
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, fsops::file_name_of(path)).unwrap();
    }

    fn file_names(dir: &Path) -> Vec<String> {
        fsops::list_files(dir)
            .unwrap()
            .iter()
            .map(|p| fsops::file_name_of(p))
            .collect()
    }

    #[test]
    fn switch_stashes_marked_profile_and_activates_target() {
        let fx = fixture();
        let active = fx.layout.active_dir().to_path_buf();
        touch(&active.join("old-a.jar"));
        touch(&active.join("old-b.jar"));
        fs::write(fx.layout.marker_path(), "old").unwrap();
        for jar in ["n1.jar", "n2.jar", "n3.jar"] {
            touch(&fx.layout.profile_dir("new").join(jar));
        }

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.switch_to("new", None).unwrap();

        assert_eq!(switcher.active_profile_name(), Some("new"));
        assert_eq!(fs::read_to_string(fx.layout.marker_path()).unwrap(), "new");
        assert_eq!(switcher.list_active_jars().unwrap(), vec!["n1.jar", "n2.jar", "n3.jar"]);
        assert_eq!(
            switcher.list_profile_jars("old").unwrap(),
            vec!["old-a.jar", "old-b.jar"]
        );
        assert!(!fx.layout.profile_dir("new").exists());
        assert_eq!(switcher.list_inactive_profiles().unwrap(), vec!["old"]);
    }

    #[test]
    fn switch_with_unnamed_loose_jars_is_ambiguous_and_moves_nothing() {
        let fx = fixture();
        touch(&fx.layout.active_dir().join("mystery.jar"));
        touch(&fx.layout.profile_dir("new").join("n1.jar"));

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        let err = switcher.switch_to("new", None).unwrap_err();

        assert!(matches!(err, SwitcherError::AmbiguousActiveState));
        assert_eq!(switcher.list_active_jars().unwrap(), vec!["mystery.jar"]);
        assert_eq!(switcher.list_profile_jars("new").unwrap(), vec!["n1.jar"]);
        assert_eq!(switcher.active_profile_name(), None);
    }

    #[test]
    fn switch_uses_supplied_name_for_unnamed_loose_jars() {
        let fx = fixture();
        touch(&fx.layout.active_dir().join("mystery.jar"));
        touch(&fx.layout.profile_dir("new").join("n1.jar"));

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.switch_to("new", Some("unnamed")).unwrap();

        assert_eq!(switcher.list_profile_jars("unnamed").unwrap(), vec!["mystery.jar"]);
        assert_eq!(switcher.list_active_jars().unwrap(), vec!["n1.jar"]);
    }

    #[test]
    fn switch_to_missing_profile_fails_before_touching_anything() {
        let fx = fixture();
        touch(&fx.layout.active_dir().join("a.jar"));
        fs::write(fx.layout.marker_path(), "current").unwrap();

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        let err = switcher.switch_to("ghost", None).unwrap_err();

        assert!(matches!(err, SwitcherError::ProfileNotFound(name) if name == "ghost"));
        assert_eq!(switcher.list_active_jars().unwrap(), vec!["a.jar"]);
        assert!(!fx.layout.profile_dir("current").exists());
    }

    #[test]
    fn stash_overwrites_stale_copies_in_storage() {
        let fx = fixture();
        fs::write(fx.layout.active_dir().join("lib.jar"), b"fresh").unwrap();
        fs::write(fx.layout.marker_path(), "old").unwrap();
        fs::create_dir_all(fx.layout.profile_dir("old")).unwrap();
        fs::write(fx.layout.profile_dir("old").join("lib.jar"), b"stale").unwrap();
        touch(&fx.layout.profile_dir("new").join("n.jar"));

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.switch_to("new", None).unwrap();

        assert_eq!(fs::read(fx.layout.profile_dir("old").join("lib.jar")).unwrap(), b"fresh");
    }

    #[test]
    fn non_jar_leftovers_keep_the_target_folder() {
        let fx = fixture();
        touch(&fx.layout.profile_dir("new").join("n.jar"));
        touch(&fx.layout.profile_dir("new").join("README.txt"));

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.switch_to("new", None).unwrap();

        assert_eq!(file_names(&fx.layout.profile_dir("new")), vec!["README.txt"]);
        assert_eq!(switcher.list_active_jars().unwrap(), vec!["n.jar"]);
    }

    #[test]
    fn packs_round_trip_through_deploy_and_deactivate() {
        let fx = fixture();
        touch(&fx.layout.profile_dir("pvp").join("fps.jar"));
        touch(&fx.layout.profile_pack_dir("pvp", PackType::Resource).join("Faithful.zip"));
        touch(&fx.layout.profile_pack_dir("pvp", PackType::Shader).join("BSL.zip"));

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.switch_to("pvp", None).unwrap();

        assert_eq!(
            file_names(&fx.layout.shared_pack_dir(PackType::Resource)),
            vec!["Faithful.zip"]
        );
        assert_eq!(
            file_names(&fx.layout.shared_pack_dir(PackType::Shader)),
            vec!["BSL.zip"]
        );
        assert_eq!(
            switcher.list_active_profile_packs().unwrap(),
            vec![
                PackEntry::new(PackType::Resource, "Faithful.zip"),
                PackEntry::new(PackType::Shader, "BSL.zip"),
            ]
        );

        switcher.deactivate(None).unwrap();

        assert_eq!(switcher.active_profile_name(), None);
        assert!(!fx.layout.marker_path().exists());
        assert!(!fx.layout.manifest_path("pvp").exists());
        assert!(switcher.list_active_jars().unwrap().is_empty());
        assert_eq!(switcher.list_profile_jars("pvp").unwrap(), vec!["fps.jar"]);
        assert_eq!(
            switcher.list_profile_packs("pvp").unwrap(),
            vec![
                PackEntry::new(PackType::Resource, "Faithful.zip"),
                PackEntry::new(PackType::Shader, "BSL.zip"),
            ]
        );
        assert!(file_names(&fx.layout.shared_pack_dir(PackType::Resource)).is_empty());
    }

    #[test]
    fn declined_conflict_leaves_pack_in_storage_untracked() {
        let fx = fixture();
        let shared = fx.layout.shared_pack_dir(PackType::Resource).join("Faithful.zip");
        fs::create_dir_all(shared.parent().unwrap()).unwrap();
        fs::write(&shared, b"user copy").unwrap();
        touch(&fx.layout.profile_dir("pvp").join("fps.jar"));
        let stored = fx.layout.profile_pack_dir("pvp", PackType::Resource).join("Faithful.zip");
        fs::create_dir_all(stored.parent().unwrap()).unwrap();
        fs::write(&stored, b"profile copy").unwrap();

        let mut switcher = ProfileSwitcher::open(fx.layout.clone())
            .unwrap()
            .with_conflict_resolver(KeepExisting);
        switcher.switch_to("pvp", None).unwrap();

        assert_eq!(fs::read(&shared).unwrap(), b"user copy");
        assert_eq!(fs::read(&stored).unwrap(), b"profile copy");
        assert!(switcher.list_active_profile_packs().unwrap().is_empty());
        assert!(!fx.layout.manifest_path("pvp").exists());

        // Deactivating must not carry off the user's own copy.
        switcher.deactivate(None).unwrap();
        assert_eq!(fs::read(&shared).unwrap(), b"user copy");
        assert_eq!(fs::read(&stored).unwrap(), b"profile copy");
    }

    #[test]
    fn resolver_sees_file_name_and_pack_type_and_default_overwrites() {
        let fx = fixture();
        let shared = fx.layout.shared_pack_dir(PackType::Shader).join("BSL.zip");
        fs::create_dir_all(shared.parent().unwrap()).unwrap();
        fs::write(&shared, b"old").unwrap();
        let stored = fx.layout.profile_pack_dir("pvp", PackType::Shader).join("BSL.zip");
        fs::create_dir_all(stored.parent().unwrap()).unwrap();
        fs::write(&stored, b"new").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut switcher = ProfileSwitcher::open(fx.layout.clone())
            .unwrap()
            .with_conflict_resolver(move |name: &str, kind: PackType| {
                assert_eq!((name, kind), ("BSL.zip", PackType::Shader));
                seen.fetch_add(1, Ordering::SeqCst);
                true
            });
        switcher.switch_to("pvp", None).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(fs::read(&shared).unwrap(), b"new");
        assert!(!fx.layout.profile_dir("pvp").exists());
    }

    #[test]
    fn stash_skips_tracked_packs_that_disappeared() {
        let fx = fixture();
        touch(&fx.layout.profile_dir("pvp").join("fps.jar"));
        touch(&fx.layout.profile_pack_dir("pvp", PackType::Resource).join("A.zip"));
        touch(&fx.layout.profile_pack_dir("pvp", PackType::Resource).join("B.zip"));

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.switch_to("pvp", None).unwrap();
        fs::remove_file(fx.layout.shared_pack_dir(PackType::Resource).join("A.zip")).unwrap();

        switcher.deactivate(None).unwrap();

        assert_eq!(
            switcher.list_profile_packs("pvp").unwrap(),
            vec![PackEntry::new(PackType::Resource, "B.zip")]
        );
        assert!(!fx.layout.manifest_path("pvp").exists());
    }

    #[test]
    fn switching_between_profiles_keeps_ownership_disjoint() {
        let fx = fixture();
        touch(&fx.layout.profile_dir("a").join("a.jar"));
        touch(&fx.layout.profile_pack_dir("a", PackType::Resource).join("a.zip"));
        touch(&fx.layout.profile_dir("b").join("b.jar"));

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.switch_to("a", None).unwrap();
        switcher.switch_to("b", None).unwrap();

        assert_eq!(switcher.active_profile_name(), Some("b"));
        assert_eq!(switcher.list_active_jars().unwrap(), vec!["b.jar"]);
        assert_eq!(switcher.list_profile_jars("a").unwrap(), vec!["a.jar"]);
        assert_eq!(
            switcher.list_profile_packs("a").unwrap(),
            vec![PackEntry::new(PackType::Resource, "a.zip")]
        );
        assert!(file_names(&fx.layout.shared_pack_dir(PackType::Resource)).is_empty());
        assert_eq!(switcher.list_inactive_profiles().unwrap(), vec!["a"]);

        switcher.switch_to("a", None).unwrap();
        assert_eq!(switcher.list_active_jars().unwrap(), vec!["a.jar"]);
        assert_eq!(switcher.list_profile_jars("b").unwrap(), vec!["b.jar"]);
        assert_eq!(
            file_names(&fx.layout.shared_pack_dir(PackType::Resource)),
            vec!["a.zip"]
        );
    }

    #[test]
    fn deactivate_is_a_noop_with_nothing_loose_and_no_override() {
        let fx = fixture();
        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.deactivate(None).unwrap();
        assert!(switcher.list_inactive_profiles().unwrap().is_empty());
    }

    #[test]
    fn deactivate_override_with_nothing_loose_creates_folder_and_clears_marker() {
        let fx = fixture();
        fs::write(fx.layout.marker_path(), "old").unwrap();
        touch(&fx.layout.profile_dir("kept").join("k.jar"));
        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();

        switcher.deactivate(Some("empty")).unwrap();
        assert!(fx.layout.profile_dir("empty").is_dir());
        assert!(!fx.layout.marker_path().exists());
        assert_eq!(switcher.active_profile_name(), None);

        switcher.deactivate(Some("kept")).unwrap();
        assert_eq!(switcher.list_profile_jars("kept").unwrap(), vec!["k.jar"]);
        assert_eq!(switcher.list_inactive_profiles().unwrap(), vec!["empty", "kept"]);
    }

    #[test]
    fn deactivate_unnamed_loose_jars_requires_a_name() {
        let fx = fixture();
        touch(&fx.layout.active_dir().join("a.jar"));
        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();

        assert!(matches!(
            switcher.deactivate(None),
            Err(SwitcherError::AmbiguousActiveState)
        ));

        switcher.deactivate(Some("saved")).unwrap();
        assert_eq!(switcher.list_profile_jars("saved").unwrap(), vec!["a.jar"]);
        assert!(switcher.list_active_jars().unwrap().is_empty());
    }

    #[test]
    fn set_active_profile_name_is_idempotent_and_blank_clears() {
        let fx = fixture();
        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();

        switcher.set_active_profile_name("creative").unwrap();
        let once = fs::read(fx.layout.marker_path()).unwrap();
        switcher.set_active_profile_name("creative").unwrap();
        assert_eq!(fs::read(fx.layout.marker_path()).unwrap(), once);

        switcher.set_active_profile_name("  ").unwrap();
        assert!(!fx.layout.marker_path().exists());
        assert_eq!(switcher.active_profile_name(), None);
    }

    #[test]
    fn folder_management_checks_existence() {
        let fx = fixture();
        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();

        switcher.create_profile_folder("one").unwrap();
        assert!(matches!(
            switcher.create_profile_folder("one"),
            Err(SwitcherError::AlreadyExists(_))
        ));

        switcher.create_profile_folder("two").unwrap();
        assert!(matches!(
            switcher.rename_profile_folder("one", "two"),
            Err(SwitcherError::AlreadyExists(_))
        ));
        assert!(matches!(
            switcher.rename_profile_folder("ghost", "three"),
            Err(SwitcherError::ProfileNotFound(_))
        ));

        switcher.rename_profile_folder("one", "three").unwrap();
        assert_eq!(switcher.list_inactive_profiles().unwrap(), vec!["three", "two"]);

        switcher.delete_profile_folder("two").unwrap();
        assert!(matches!(
            switcher.delete_profile_folder("two"),
            Err(SwitcherError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn renaming_the_active_profile_relabels_marker_and_manifest() {
        let fx = fixture();
        touch(&fx.layout.profile_dir("old").join("a.jar"));
        touch(&fx.layout.profile_pack_dir("old", PackType::Shader).join("BSL.zip"));

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.switch_to("old", None).unwrap();
        switcher.rename_profile_folder("old", "renamed").unwrap();

        assert_eq!(switcher.active_profile_name(), Some("renamed"));
        assert_eq!(switcher.list_active_jars().unwrap(), vec!["a.jar"]);
        assert_eq!(
            switcher.list_active_profile_packs().unwrap(),
            vec![PackEntry::new(PackType::Shader, "BSL.zip")]
        );

        switcher.deactivate(None).unwrap();
        assert_eq!(switcher.list_profile_jars("renamed").unwrap(), vec!["a.jar"]);
        assert_eq!(
            switcher.list_profile_packs("renamed").unwrap(),
            vec![PackEntry::new(PackType::Shader, "BSL.zip")]
        );
    }

    #[test]
    fn deleting_the_active_profile_is_rejected() {
        let fx = fixture();
        fs::create_dir_all(fx.layout.profile_dir("live")).unwrap();
        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.set_active_profile_name("live").unwrap();

        assert!(matches!(
            switcher.delete_profile_folder("live"),
            Err(SwitcherError::CannotDeleteActive(_))
        ));
        assert!(fx.layout.profile_dir("live").is_dir());
    }

    #[test]
    fn active_pack_listing_ignores_untracked_shared_files() {
        let fx = fixture();
        touch(&fx.layout.shared_pack_dir(PackType::Resource).join("vanilla-tweaks.zip"));
        touch(&fx.layout.profile_pack_dir("pvp", PackType::Resource).join("Faithful.zip"));

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        switcher.switch_to("pvp", None).unwrap();

        assert_eq!(
            switcher.list_active_profile_packs().unwrap(),
            vec![PackEntry::new(PackType::Resource, "Faithful.zip")]
        );
    }

    #[test]
    fn interrupted_jar_activation_recovers_by_naming_and_switching_again() {
        let fx = fixture();
        touch(&fx.layout.profile_dir("new").join("a.jar"));
        touch(&fx.layout.profile_dir("new").join("b.jar"));
        // A directory squatting on the destination name makes the second move fail.
        let obstacle = fx.layout.active_dir().join("b.jar");
        fs::create_dir_all(&obstacle).unwrap();

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        assert!(switcher.switch_to("new", None).is_err());

        // Partially migrated, marker untouched.
        assert_eq!(switcher.list_active_jars().unwrap(), vec!["a.jar"]);
        assert_eq!(switcher.list_profile_jars("new").unwrap(), vec!["b.jar"]);
        assert_eq!(switcher.active_profile_name(), None);

        fs::remove_dir(&obstacle).unwrap();
        switcher.set_active_profile_name("new").unwrap();
        switcher.switch_to("new", None).unwrap();

        assert_eq!(switcher.list_active_jars().unwrap(), vec!["a.jar", "b.jar"]);
        assert_eq!(switcher.active_profile_name(), Some("new"));
        assert!(!fx.layout.profile_dir("new").exists());
    }

    #[test]
    fn interrupted_pack_deploy_keeps_partial_manifest_for_recovery() {
        let fx = fixture();
        touch(&fx.layout.profile_dir("pvp").join("fps.jar"));
        touch(&fx.layout.profile_pack_dir("pvp", PackType::Resource).join("A.zip"));
        touch(&fx.layout.profile_pack_dir("pvp", PackType::Resource).join("B.zip"));
        let obstacle = fx.layout.shared_pack_dir(PackType::Resource).join("B.zip");
        fs::create_dir_all(&obstacle).unwrap();

        let mut switcher = ProfileSwitcher::open(fx.layout.clone()).unwrap();
        assert!(switcher.switch_to("pvp", None).is_err());
        assert_eq!(switcher.active_profile_name(), None);
        assert_eq!(
            fs::read_to_string(fx.layout.manifest_path("pvp")).unwrap(),
            "resourcepacks|A.zip\n"
        );

        fs::remove_dir(&obstacle).unwrap();
        switcher.set_active_profile_name("pvp").unwrap();
        switcher.switch_to("pvp", None).unwrap();

        assert_eq!(switcher.list_active_jars().unwrap(), vec!["fps.jar"]);
        assert_eq!(
            switcher.list_active_profile_packs().unwrap(),
            vec![
                PackEntry::new(PackType::Resource, "A.zip"),
                PackEntry::new(PackType::Resource, "B.zip"),
            ]
        );
        assert!(!fx.layout.profile_dir("pvp").exists());
    }
}
