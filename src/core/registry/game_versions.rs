use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::client::ModRegistry;

/// Shown when the registry cannot be reached.
pub const FALLBACK_GAME_VERSIONS: &[&str] = &[
    "1.21.4", "1.21.3", "1.21.2", "1.21.1", "1.21", "1.20.6", "1.20.4", "1.20.3", "1.20.2",
    "1.20.1", "1.20", "1.19.4", "1.19.3", "1.19.2", "1.19.1", "1.19", "1.18.2", "1.18.1", "1.18",
    "1.17.1", "1.17", "1.16.5", "1.16.4", "1.16.3", "1.16.2", "1.16.1", "1.16",
];

/// Release game versions, fetched once and cached for the process.
pub struct GameVersionCatalog {
    registry: Arc<dyn ModRegistry>,
    cache: Mutex<Option<Vec<String>>>,
}

impl GameVersionCatalog {
    pub fn new(registry: Arc<dyn ModRegistry>) -> Self {
        Self {
            registry,
            cache: Mutex::new(None),
        }
    }

    /// Release versions in registry order. Never fails: a failed or empty
    /// fetch yields the fallback list, which is then cached like a real one.
    pub async fn release_versions(&self) -> Vec<String> {
        let mut cache = self.cache.lock().await;
        if let Some(versions) = cache.as_ref() {
            return versions.clone();
        }

        let versions = match self.registry.game_versions().await {
            Ok(tags) => {
                let releases: Vec<String> = tags
                    .into_iter()
                    .filter(|t| t.version_type == "release")
                    .map(|t| t.version)
                    .collect();
                if releases.is_empty() {
                    warn!("Registry returned no release versions, using fallback list");
                    fallback()
                } else {
                    debug!("Fetched {} release game versions", releases.len());
                    releases
                }
            }
            Err(e) => {
                warn!("Failed to fetch game versions, using fallback list: {}", e);
                fallback()
            }
        };

        *cache = Some(versions.clone());
        versions
    }

    pub async fn clear_cache(&self) {
        *self.cache.lock().await = None;
    }
}

fn fallback() -> Vec<String> {
    FALLBACK_GAME_VERSIONS.iter().map(|v| v.to_string()).collect()
}
