use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::extract::{self, IdentifierSet, TEXT_EXTRACTORS};
use super::model::{ResolveStatus, ResolvedMod};
use crate::core::error::SwitcherResult;
use crate::core::registry::{ModRegistry, ProjectVersion, VersionFilter};

const DEFAULT_CONCURRENCY: usize = 6;

/// Turns pasted text into registry-resolved mods.
pub struct CollectionResolver {
    registry: Arc<dyn ModRegistry>,
    concurrency: usize,
}

impl CollectionResolver {
    pub fn new(registry: Arc<dyn ModRegistry>) -> Self {
        Self {
            registry,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Caps how many identifiers are resolved at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Identifiers found in `text`, first occurrence order.
    pub async fn extract_identifiers(&self, text: &str) -> Vec<String> {
        let mut ids = IdentifierSet::new();

        if let Some(collection) = extract::collection_id(text) {
            match self.registry.collection_projects(&collection).await {
                Ok(members) => {
                    debug!("Collection {} has {} project(s)", collection, members.len());
                    ids.extend(members);
                }
                Err(e) => warn!("Failed to fetch collection {}: {}", collection, e),
            }
        }

        for extractor in TEXT_EXTRACTORS {
            ids.extend(extractor(text));
        }

        if ids.is_empty() {
            ids.extend(extract::bare_identifiers(text));
        }

        ids.into_vec()
    }

    /// Resolves every identifier in `text`. Output follows input order;
    /// identifiers whose chosen version has no files are left out.
    pub async fn resolve(&self, text: &str, filter: &VersionFilter) -> Vec<ResolvedMod> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let ids = self.extract_identifiers(text).await;
        info!("Resolving {} identifier(s) with {:?}", ids.len(), filter);

        let resolved: Vec<Option<ResolvedMod>> = stream::iter(ids)
            .map(move |id| async move { self.resolve_identifier(&id, filter).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        resolved.into_iter().flatten().collect()
    }

    /// Resolves one slug or project id. Registry failures become
    /// `NotFound`; `None` means the chosen version had no files.
    pub async fn resolve_identifier(&self, id: &str, filter: &VersionFilter) -> Option<ResolvedMod> {
        match self.try_resolve(id, filter).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Failed to resolve '{}': {}", id, e);
                Some(ResolvedMod::not_found(id, id))
            }
        }
    }

    async fn try_resolve(
        &self,
        id: &str,
        filter: &VersionFilter,
    ) -> SwitcherResult<Option<ResolvedMod>> {
        let title = match self.registry.project(id).await {
            Ok(project) if !project.title.is_empty() => project.title,
            Ok(_) => id.to_string(),
            Err(e) => {
                debug!("No project metadata for '{}': {}", id, e);
                id.to_string()
            }
        };

        let matching = self.registry.project_versions(id, filter).await?;
        if let Some(best) = matching.first() {
            return Ok(build(id, &title, best, ResolveStatus::Compatible, true));
        }

        let all = if filter.is_unconstrained() {
            matching
        } else {
            self.registry
                .project_versions(id, &VersionFilter::any())
                .await?
        };

        let Some(fallback) = all.first() else {
            return Ok(Some(ResolvedMod::not_found(id, &title)));
        };

        let status = ResolveStatus::VersionMismatch {
            actual_game_versions: fallback.game_versions.join(", "),
            actual_loaders: fallback.loaders.join(", "),
        };
        Ok(build(id, &title, fallback, status, false))
    }
}

fn build(
    id: &str,
    title: &str,
    version: &ProjectVersion,
    status: ResolveStatus,
    selected: bool,
) -> Option<ResolvedMod> {
    let Some(file) = version.preferred_file() else {
        warn!("Version {} of '{}' has no files, skipping", version.id, id);
        return None;
    };

    Some(ResolvedMod {
        slug: id.to_string(),
        project_id: version.project_id.clone(),
        title: title.to_string(),
        version_id: version.id.clone(),
        file_name: file.filename.clone(),
        download_url: file.url.clone(),
        sha1: file.sha1().map(str::to_string),
        selected,
        status,
    })
}
