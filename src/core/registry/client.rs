use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::model::{Collection, GameVersionTag, Project, ProjectVersion, VersionFilter};
use crate::core::error::{SwitcherError, SwitcherResult};

const MODRINTH_API_V2: &str = "https://api.modrinth.com/v2";
const MODRINTH_API_V3: &str = "https://api.modrinth.com/v3";

/// Read-only view of a mod registry.
#[async_trait]
pub trait ModRegistry: Send + Sync {
    async fn project(&self, id: &str) -> SwitcherResult<Project>;

    /// Versions of a project, best match first, narrowed by `filter`.
    async fn project_versions(
        &self,
        id: &str,
        filter: &VersionFilter,
    ) -> SwitcherResult<Vec<ProjectVersion>>;

    /// Member project ids of a collection.
    async fn collection_projects(&self, collection_id: &str) -> SwitcherResult<Vec<String>>;

    async fn game_versions(&self) -> SwitcherResult<Vec<GameVersionTag>>;
}

/// Modrinth REST client.
pub struct ModrinthClient {
    client: Client,
    api_v2: String,
    api_v3: String,
}

impl ModrinthClient {
    /// Uses the public API, or the base given in `MODRINTH_API_BASE`.
    pub fn new(client: Client) -> Self {
        let api_v2 = std::env::var("MODRINTH_API_BASE")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| MODRINTH_API_V2.to_string());
        let api_v3 = match api_v2.strip_suffix("/v2") {
            Some(root) => format!("{root}/v3"),
            None if api_v2 == MODRINTH_API_V2 => MODRINTH_API_V3.to_string(),
            None => api_v2.clone(),
        };
        Self::with_base_urls(client, api_v2, api_v3)
    }

    pub fn with_base_urls(client: Client, api_v2: impl Into<String>, api_v3: impl Into<String>) -> Self {
        Self {
            client,
            api_v2: api_v2.into().trim_end_matches('/').to_string(),
            api_v3: api_v3.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(base: &str, segments: &[&str]) -> SwitcherResult<Url> {
        let mut url = Url::parse(base)
            .map_err(|e| SwitcherError::Registry(format!("invalid API base {base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SwitcherError::Registry(format!("API base cannot take a path: {base}")))?
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> SwitcherResult<T> {
        debug!("GET {}", url);
        let resp = self.client.get(url.clone()).send().await?;

        if !resp.status().is_success() {
            return Err(SwitcherError::Registry(format!(
                "Modrinth returned {} for {}",
                resp.status(),
                url
            )));
        }

        Ok(resp.json::<T>().await?)
    }
}

/// Modrinth expects list filters as JSON arrays in the query string.
fn list_param(value: &str) -> String {
    serde_json::json!([value]).to_string()
}

#[async_trait]
impl ModRegistry for ModrinthClient {
    async fn project(&self, id: &str) -> SwitcherResult<Project> {
        let url = Self::endpoint(&self.api_v2, &["project", id])?;
        self.get_json(url).await
    }

    async fn project_versions(
        &self,
        id: &str,
        filter: &VersionFilter,
    ) -> SwitcherResult<Vec<ProjectVersion>> {
        let mut url = Self::endpoint(&self.api_v2, &["project", id, "version"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(loader) = &filter.loader {
                query.append_pair("loaders", &list_param(loader));
            }
            if let Some(game_version) = &filter.game_version {
                query.append_pair("game_versions", &list_param(game_version));
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.get_json(url).await
    }

    async fn collection_projects(&self, collection_id: &str) -> SwitcherResult<Vec<String>> {
        let url = Self::endpoint(&self.api_v3, &["collection", collection_id])?;
        let collection: Collection = self.get_json(url).await?;
        Ok(collection.projects)
    }

    async fn game_versions(&self) -> SwitcherResult<Vec<GameVersionTag>> {
        let url = Self::endpoint(&self.api_v2, &["tag", "game_version"])?;
        self.get_json(url).await
    }
}
