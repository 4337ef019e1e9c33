//! Async command surface driven by a front end.
//!
//! Every command takes the shared state and returns `Result<T, SwitcherError>`
//! with serializable payloads. Profile operations run on blocking threads;
//! network work happens after the state lock is released.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::downloader::{DownloadEntry, ProgressFn};
use crate::core::error::{SwitcherError, SwitcherResult};
use crate::core::loaders::{self, LoaderInfo};
use crate::core::profile::content::validate_file_name;
use crate::core::profile::fsops::file_name_of;
use crate::core::profile::{ConflictResolver, PackEntry, PackType, ProfileItem, ProfileSwitcher};
use crate::core::registry::VersionFilter;
use crate::core::resolver::{extract, ResolvedMod};
use crate::core::state::{lock_switcher, AppSettings, AppState};

pub type SharedState = Arc<Mutex<AppState>>;

/// What the active location and profile storage hold right now.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileOverview {
    pub active_profile: Option<String>,
    pub active_mods: Vec<String>,
    pub active_packs: Vec<PackEntry>,
    pub inactive_profiles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileContents {
    pub name: String,
    pub active: bool,
    pub mods: Vec<String>,
    pub packs: Vec<PackEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub downloaded: Vec<String>,
    pub failed: Vec<ImportFailure>,
    pub cancelled: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadUrlResponse {
    Downloaded { file_name: String },
    /// The registry only offers a version for another game version or
    /// loader. Call again with `confirm_mismatch` to take it anyway.
    NeedsConfirmation { resolved: ResolvedMod },
}

async fn with_switcher<T, F>(state: &SharedState, op: F) -> SwitcherResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut ProfileSwitcher) -> SwitcherResult<T> + Send + 'static,
{
    let switcher = state.lock().await.switcher.clone();
    tokio::task::spawn_blocking(move || {
        let mut guard = lock_switcher(&switcher)?;
        op(&mut guard)
    })
    .await
    .map_err(|e| SwitcherError::Other(format!("profile task failed: {e}")))?
}

fn overview(switcher: &ProfileSwitcher) -> SwitcherResult<ProfileOverview> {
    Ok(ProfileOverview {
        active_profile: switcher.active_profile_name().map(str::to_string),
        active_mods: switcher.list_active_jars()?,
        active_packs: switcher.list_active_profile_packs()?,
        inactive_profiles: switcher.list_inactive_profiles()?,
    })
}

// ── Profiles ────────────────────────────────────────────

pub async fn list_profiles(state: &SharedState) -> SwitcherResult<ProfileOverview> {
    with_switcher(state, |s| overview(s)).await
}

pub async fn profile_contents(state: &SharedState, name: String) -> SwitcherResult<ProfileContents> {
    with_switcher(state, move |s| {
        if s.is_active(&name) {
            return Ok(ProfileContents {
                mods: s.list_active_jars()?,
                packs: s.list_active_profile_packs()?,
                active: true,
                name,
            });
        }
        if !s.profile_exists(&name) {
            return Err(SwitcherError::ProfileNotFound(name));
        }
        Ok(ProfileContents {
            mods: s.list_profile_jars(&name)?,
            packs: s.list_profile_packs(&name)?,
            active: false,
            name,
        })
    })
    .await
}

pub async fn switch_profile(
    state: &SharedState,
    target: String,
    name_for_current: Option<String>,
) -> SwitcherResult<ProfileOverview> {
    with_switcher(state, move |s| {
        s.switch_to(&target, name_for_current.as_deref())?;
        overview(s)
    })
    .await
}

pub async fn deactivate_profile(
    state: &SharedState,
    name_override: Option<String>,
) -> SwitcherResult<ProfileOverview> {
    with_switcher(state, move |s| {
        s.deactivate(name_override.as_deref())?;
        overview(s)
    })
    .await
}

/// Relabels whatever sits in the active location without moving files.
pub async fn set_active_profile_name(state: &SharedState, name: String) -> SwitcherResult<()> {
    with_switcher(state, move |s| s.set_active_profile_name(&name)).await
}

pub async fn create_profile(state: &SharedState, name: String) -> SwitcherResult<()> {
    with_switcher(state, move |s| s.create_profile_folder(&name)).await
}

pub async fn rename_profile(state: &SharedState, old: String, new: String) -> SwitcherResult<()> {
    with_switcher(state, move |s| s.rename_profile_folder(&old, &new)).await
}

pub async fn delete_profile(state: &SharedState, name: String) -> SwitcherResult<()> {
    with_switcher(state, move |s| s.delete_profile_folder(&name)).await
}

/// Installs the policy asked before a deployed pack replaces a file the
/// user already has in a shared pack folder. Usually a dialog callback.
pub async fn set_conflict_resolver(
    state: &SharedState,
    resolver: Arc<dyn ConflictResolver>,
) -> SwitcherResult<()> {
    state.lock().await.set_conflict_resolver(resolver).await
}

// ── Profile content ─────────────────────────────────────

pub async fn add_files(
    state: &SharedState,
    profile: String,
    files: Vec<PathBuf>,
    pack_type: Option<PackType>,
) -> SwitcherResult<Vec<ProfileItem>> {
    with_switcher(state, move |s| s.add_files_to_profile(&profile, &files, pack_type)).await
}

pub async fn remove_file(state: &SharedState, profile: String, item: ProfileItem) -> SwitcherResult<bool> {
    with_switcher(state, move |s| s.remove_file_from_profile(&profile, &item)).await
}

// ── Backups ─────────────────────────────────────────────

/// Backs up the loose active mods and returns the backup name.
pub async fn backup_mods(state: &SharedState) -> SwitcherResult<String> {
    let backups = state.lock().await.backups.clone();
    with_switcher(state, move |s| {
        if s.active_jar_count()? == 0 {
            return Err(SwitcherError::Other("No active mods to back up".into()));
        }
        let dir = backups.backup_current_mods(s.layout().active_dir())?;
        Ok(dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default())
    })
    .await
}

pub async fn restore_backup(state: &SharedState, name: String) -> SwitcherResult<usize> {
    let backups = state.lock().await.backups.clone();
    with_switcher(state, move |s| backups.restore(&name, s.layout().active_dir())).await
}

pub async fn list_backups(state: &SharedState) -> SwitcherResult<Vec<String>> {
    let backups = state.lock().await.backups.clone();
    tokio::task::spawn_blocking(move || backups.list_backups())
        .await
        .map_err(|e| SwitcherError::Other(format!("backup task failed: {e}")))?
}

// ── Environment ─────────────────────────────────────────

pub async fn get_game_versions(state: &SharedState) -> SwitcherResult<Vec<String>> {
    let catalog = state.lock().await.game_versions.clone();
    Ok(catalog.release_versions().await)
}

pub async fn detect_loaders(state: &SharedState) -> SwitcherResult<Vec<LoaderInfo>> {
    let minecraft_dir = state.lock().await.minecraft_dir();
    tokio::task::spawn_blocking(move || loaders::detect(&minecraft_dir))
        .await
        .map_err(|e| SwitcherError::Other(format!("loader detection failed: {e}")))
}

pub async fn get_settings(state: &SharedState) -> SwitcherResult<AppSettings> {
    Ok(state.lock().await.settings.clone())
}

pub async fn update_settings(state: &SharedState, settings: AppSettings) -> SwitcherResult<AppSettings> {
    let mut state = state.lock().await;
    state.update_settings(settings).await?;
    Ok(state.settings.clone())
}

// ── Modrinth import ─────────────────────────────────────

/// Resolves pasted text. Without an explicit filter the saved loader and
/// game version are used.
pub async fn resolve_collection(
    state: &SharedState,
    text: String,
    filter: Option<VersionFilter>,
) -> SwitcherResult<Vec<ResolvedMod>> {
    let (resolver, default_filter) = {
        let state = state.lock().await;
        (state.resolver.clone(), state.settings.version_filter())
    };
    let filter = filter.unwrap_or(default_filter);
    Ok(resolver.resolve(&text, &filter).await)
}

/// Downloads the selected mods into `profile`, one after another.
/// Progress covers the whole batch.
pub async fn import_resolved(
    state: &SharedState,
    profile: String,
    mods: Vec<ResolvedMod>,
    on_progress: ProgressFn<'_>,
    cancel: &CancellationToken,
) -> SwitcherResult<ImportReport> {
    let downloader = state.lock().await.downloader.clone();
    let dest_dir = with_switcher(state, move |s| s.download_dir_for(&profile)).await?;

    let mut failed = Vec::new();
    let mut entries = Vec::new();
    for m in mods.into_iter().filter(|m| m.selected && m.is_downloadable()) {
        match validate_file_name(&m.file_name) {
            Ok(name) => entries.push(DownloadEntry {
                url: m.download_url.clone(),
                dest: dest_dir.join(name),
                sha1: m.sha1.clone(),
            }),
            Err(e) => failed.push(ImportFailure {
                file_name: m.file_name.clone(),
                error: e.to_string(),
            }),
        }
    }

    let report = downloader.download_batch(&entries, on_progress, cancel).await;
    failed.extend(report.failed.into_iter().map(|(entry, e)| ImportFailure {
        file_name: file_name_of(&entry.dest),
        error: e.to_string(),
    }));

    let downloaded: Vec<String> = report.completed.iter().map(|p| file_name_of(p)).collect();
    info!(
        "Imported {} mod(s) into {:?}, {} failed",
        downloaded.len(),
        dest_dir,
        failed.len()
    );

    Ok(ImportReport {
        downloaded,
        failed,
        cancelled: report.cancelled,
    })
}

/// Downloads one mod by URL into `profile`. Modrinth project URLs are
/// resolved with the saved filter first; anything else is fetched as is.
pub async fn download_mod_url(
    state: &SharedState,
    profile: String,
    url: String,
    confirm_mismatch: bool,
    on_progress: ProgressFn<'_>,
    cancel: &CancellationToken,
) -> SwitcherResult<DownloadUrlResponse> {
    let url = url.trim().to_string();
    if url.is_empty() {
        return Err(SwitcherError::Other("No URL given".into()));
    }

    let (downloader, resolver, filter) = {
        let state = state.lock().await;
        (
            state.downloader.clone(),
            state.resolver.clone(),
            state.settings.version_filter(),
        )
    };
    let dest_dir = with_switcher(state, move |s| s.download_dir_for(&profile)).await?;

    let (download_url, file_name, sha1) = match extract::project_slugs(&url).first() {
        Some(slug) => {
            let resolved = resolver
                .resolve_identifier(slug, &filter)
                .await
                .ok_or_else(|| SwitcherError::Registry(format!("'{slug}' has no downloadable files")))?;
            if resolved.is_not_found() {
                return Err(SwitcherError::Registry(format!(
                    "'{slug}' could not be found or has no versions"
                )));
            }
            if !confirm_mismatch && !resolved.is_compatible() {
                return Ok(DownloadUrlResponse::NeedsConfirmation { resolved });
            }
            (resolved.download_url, resolved.file_name, resolved.sha1)
        }
        None => (url.clone(), jar_name_from_url(&url)?, None),
    };

    let name = validate_file_name(&file_name)?;
    downloader
        .download_file(&download_url, &dest_dir.join(name), sha1.as_deref(), on_progress, cancel)
        .await?;

    info!("Downloaded {} -> {:?}", download_url, dest_dir.join(name));
    Ok(DownloadUrlResponse::Downloaded {
        file_name: name.to_string(),
    })
}

/// Decoded last path segment of `url`, with `.jar` appended when missing.
fn jar_name_from_url(url: &str) -> SwitcherResult<String> {
    let parsed = Url::parse(url).map_err(|e| SwitcherError::Other(format!("Invalid URL {url}: {e}")))?;
    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SwitcherError::Other(format!("No file name in URL {url}")))?;
    let decoded = urlencoding::decode(segment)
        .map_err(|e| SwitcherError::Other(format!("Undecodable file name in URL {url}: {e}")))?;
    let name = validate_file_name(&decoded)?;

    if name.to_lowercase().ends_with(".jar") {
        Ok(name.to_string())
    } else {
        warn!("URL {} does not name a jar, saving as {}.jar", url, name);
        Ok(format!("{name}.jar"))
    }
}
