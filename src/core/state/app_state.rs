use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::downloader::Downloader;
use crate::core::error::{SwitcherError, SwitcherResult};
use crate::core::http::build_http_client;
use crate::core::loaders::LoaderType;
use crate::core::profile::{BackupManager, ConflictResolver, OverwriteExisting, ProfileSwitcher, StoreLayout};
use crate::core::registry::{GameVersionCatalog, ModRegistry, ModrinthClient, VersionFilter};
use crate::core::resolver::CollectionResolver;

const APP_DIR_NAME: &str = "ModProfileSwitcher";
const SETTINGS_FILE: &str = "settings.json";

/// User settings persisted as `settings.json` in the app data directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    /// Overrides the platform's default `.minecraft` location.
    pub minecraft_dir: Option<PathBuf>,
    pub game_version: Option<String>,
    pub loader: Option<LoaderType>,
}

impl AppSettings {
    pub fn version_filter(&self) -> VersionFilter {
        VersionFilter::new(self.loader.map(LoaderType::id), self.game_version.as_deref())
    }

    pub fn resolved_minecraft_dir(&self) -> PathBuf {
        self.minecraft_dir
            .clone()
            .unwrap_or_else(default_minecraft_dir)
    }
}

pub struct AppState {
    pub data_dir: PathBuf,
    pub settings: AppSettings,
    /// Switching runs on blocking threads, so the engine sits behind its own
    /// handle that those threads can own.
    pub switcher: Arc<Mutex<ProfileSwitcher>>,
    /// Policy for shared pack conflicts. Reapplied whenever the store is
    /// reopened.
    pub conflicts: Arc<dyn ConflictResolver>,
    pub backups: Arc<BackupManager>,
    pub resolver: Arc<CollectionResolver>,
    pub game_versions: Arc<GameVersionCatalog>,
    pub downloader: Arc<Downloader>,
}

impl AppState {
    pub fn new() -> SwitcherResult<Self> {
        let data_dir = default_data_dir();
        let settings = load_settings_from_disk(&data_dir).unwrap_or_default();
        let http_client = build_http_client()?;
        let registry: Arc<dyn ModRegistry> = Arc::new(ModrinthClient::new(http_client.clone()));
        Self::with_parts(data_dir, settings, http_client, registry)
    }

    /// Builds the state from explicit parts instead of the user's data
    /// directory and the live registry.
    pub fn with_parts(
        data_dir: PathBuf,
        settings: AppSettings,
        http_client: Client,
        registry: Arc<dyn ModRegistry>,
    ) -> SwitcherResult<Self> {
        let minecraft_dir = settings.resolved_minecraft_dir();
        info!("Using minecraft directory {:?}", minecraft_dir);
        let conflicts: Arc<dyn ConflictResolver> = Arc::new(OverwriteExisting);
        let switcher = open_switcher(&minecraft_dir, conflicts.clone())?;

        Ok(Self {
            backups: Arc::new(BackupManager::new(data_dir.join("backups"))),
            data_dir,
            settings,
            switcher: Arc::new(Mutex::new(switcher)),
            conflicts,
            resolver: Arc::new(CollectionResolver::new(registry.clone())),
            game_versions: Arc::new(GameVersionCatalog::new(registry)),
            downloader: Arc::new(Downloader::new(http_client)),
        })
    }

    pub fn minecraft_dir(&self) -> PathBuf {
        self.settings.resolved_minecraft_dir()
    }

    pub fn save_settings(&self) -> SwitcherResult<()> {
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| SwitcherError::io(&self.data_dir, e))?;
        let settings_path = self.data_dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&settings_path, json).map_err(|e| SwitcherError::io(&settings_path, e))
    }

    /// Applies and persists new settings. A changed minecraft directory
    /// reopens the profile store there, on a blocking thread.
    pub async fn update_settings(&mut self, settings: AppSettings) -> SwitcherResult<()> {
        let new_dir = settings.resolved_minecraft_dir();
        if new_dir != self.minecraft_dir() {
            let switcher = self.switcher.clone();
            let conflicts = self.conflicts.clone();
            let dir = new_dir.clone();
            tokio::task::spawn_blocking(move || {
                let reopened = open_switcher(&dir, conflicts)?;
                *lock_switcher(&switcher)? = reopened;
                Ok::<_, SwitcherError>(())
            })
            .await
            .map_err(|e| SwitcherError::Other(format!("profile task failed: {e}")))??;
            info!("Profile store moved to {:?}", new_dir);
        }
        self.settings = settings;
        self.save_settings()
    }

    /// Installs the conflict policy on the open store and keeps it for any
    /// store opened later.
    pub async fn set_conflict_resolver(&mut self, resolver: Arc<dyn ConflictResolver>) -> SwitcherResult<()> {
        self.conflicts = resolver.clone();
        let switcher = self.switcher.clone();
        tokio::task::spawn_blocking(move || {
            lock_switcher(&switcher)?.set_conflict_resolver(resolver);
            Ok(())
        })
        .await
        .map_err(|e| SwitcherError::Other(format!("profile task failed: {e}")))?
    }
}

fn open_switcher(minecraft_dir: &Path, conflicts: Arc<dyn ConflictResolver>) -> SwitcherResult<ProfileSwitcher> {
    let mut switcher = ProfileSwitcher::open(StoreLayout::for_minecraft_dir(minecraft_dir))?;
    switcher.set_conflict_resolver(conflicts);
    Ok(switcher)
}

pub fn lock_switcher(switcher: &Mutex<ProfileSwitcher>) -> SwitcherResult<MutexGuard<'_, ProfileSwitcher>> {
    switcher
        .lock()
        .map_err(|_| SwitcherError::Other("profile store lock poisoned".into()))
}

fn load_settings_from_disk(data_dir: &Path) -> Option<AppSettings> {
    let path = data_dir.join(SETTINGS_FILE);
    let raw = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!("Ignoring unreadable settings {:?}: {}", path, e);
            None
        }
    }
}

fn default_data_dir() -> PathBuf {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME);

    if !dir.exists() {
        let _ = std::fs::create_dir_all(&dir);
    }

    dir
}

/// The vanilla launcher's game directory for this platform.
pub fn default_minecraft_dir() -> PathBuf {
    if cfg!(target_os = "windows") || cfg!(target_os = "macos") {
        let name = if cfg!(target_os = "windows") { ".minecraft" } else { "minecraft" };
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(name)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    }
}
