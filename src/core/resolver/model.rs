use serde::{Deserialize, Serialize};

/// How well the chosen version matches the requested loader / game version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveStatus {
    Compatible,
    /// No version satisfied the filter; the registry's newest version was
    /// offered instead. Both fields are comma-joined lists.
    VersionMismatch {
        actual_game_versions: String,
        actual_loaders: String,
    },
    NotFound,
}

/// One identifier resolved against the registry, ready for import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMod {
    pub slug: String,
    pub project_id: String,
    pub title: String,
    pub version_id: String,
    pub file_name: String,
    pub download_url: String,
    pub sha1: Option<String>,
    pub selected: bool,
    pub status: ResolveStatus,
}

impl ResolvedMod {
    pub fn not_found(slug: &str, title: &str) -> Self {
        Self {
            slug: slug.to_string(),
            project_id: String::new(),
            title: title.to_string(),
            version_id: String::new(),
            file_name: String::new(),
            download_url: String::new(),
            sha1: None,
            selected: false,
            status: ResolveStatus::NotFound,
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.status == ResolveStatus::Compatible
    }

    pub fn is_not_found(&self) -> bool {
        self.status == ResolveStatus::NotFound
    }

    /// True when there is a file to fetch.
    pub fn is_downloadable(&self) -> bool {
        !self.is_not_found() && !self.download_url.is_empty() && !self.file_name.is_empty()
    }
}
