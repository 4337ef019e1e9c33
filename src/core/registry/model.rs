use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Project metadata, used for its display title.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
}

/// One published version of a project. The registry lists these best
/// match first.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProjectVersion {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub version_number: String,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub files: Vec<VersionFile>,
}

impl ProjectVersion {
    /// The primary file, else the first listed one.
    pub fn preferred_file(&self) -> Option<&VersionFile> {
        self.files
            .iter()
            .find(|f| f.primary)
            .or_else(|| self.files.first())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct VersionFile {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub hashes: HashMap<String, String>,
}

impl VersionFile {
    pub fn sha1(&self) -> Option<&str> {
        self.hashes.get("sha1").map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub projects: Vec<String>,
}

/// Entry of the game-version tag list.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GameVersionTag {
    pub version: String,
    pub version_type: String,
    #[serde(default)]
    pub major: bool,
}

/// Loader / game-version constraint for a version query. Blank values
/// mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFilter {
    pub loader: Option<String>,
    pub game_version: Option<String>,
}

impl VersionFilter {
    pub fn new(loader: Option<&str>, game_version: Option<&str>) -> Self {
        fn clean(v: Option<&str>) -> Option<String> {
            v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
        }
        Self {
            loader: clean(loader),
            game_version: clean(game_version),
        }
    }

    /// No constraint at all.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.loader.is_none() && self.game_version.is_none()
    }
}
