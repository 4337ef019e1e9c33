use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Mod loaders the switcher knows how to detect and filter by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoaderType {
    Fabric,
    Forge,
    Quilt,
    NeoForge,
}

impl LoaderType {
    pub const ALL: [LoaderType; 4] = [
        LoaderType::Fabric,
        LoaderType::Forge,
        LoaderType::Quilt,
        LoaderType::NeoForge,
    ];

    /// Lowercase id, as used by registry loader filters.
    pub fn id(self) -> &'static str {
        match self {
            LoaderType::Fabric => "fabric",
            LoaderType::Forge => "forge",
            LoaderType::Quilt => "quilt",
            LoaderType::NeoForge => "neoforge",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LoaderType::Fabric => "Fabric",
            LoaderType::Forge => "Forge",
            LoaderType::Quilt => "Quilt",
            LoaderType::NeoForge => "NeoForge",
        }
    }

    /// Page where the user can get the loader's installer.
    pub fn installer_url(self) -> &'static str {
        match self {
            LoaderType::Fabric => "https://fabricmc.net/use/installer/",
            LoaderType::Forge => "https://files.minecraftforge.net/net/minecraftforge/forge/",
            LoaderType::Quilt => "https://quiltmc.org/en/install/",
            LoaderType::NeoForge => "https://neoforged.net/",
        }
    }

    /// Maven group folder under `libraries/` that only this loader creates.
    pub fn library_path(self) -> PathBuf {
        let (org, name) = match self {
            LoaderType::Fabric => ("net", "fabricmc"),
            LoaderType::Forge => ("net", "minecraftforge"),
            LoaderType::Quilt => ("org", "quiltmc"),
            LoaderType::NeoForge => ("net", "neoforged"),
        };
        PathBuf::from(org).join(name)
    }

    /// Whether `text` mentions this loader. "forge" inside "neoforge" does
    /// not count as Forge.
    pub fn mentioned_in(self, text: &str) -> bool {
        let text = text.to_lowercase();
        match self {
            LoaderType::Forge => text.replace("neoforge", "").contains("forge"),
            other => text.contains(other.id()),
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.id().eq_ignore_ascii_case(id.trim()))
    }
}

impl std::fmt::Display for LoaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Detection result for one loader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoaderInfo {
    pub loader: LoaderType,
    pub name: String,
    pub installed: bool,
    pub installer_url: String,
}
