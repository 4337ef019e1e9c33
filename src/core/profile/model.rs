use serde::{Deserialize, Serialize};

use crate::core::error::{SwitcherError, SwitcherResult};

/// The two kinds of asset pack a profile can carry.
///
/// The serialized form is the folder name used both inside `.minecraft`
/// and inside each profile storage directory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackType {
    #[serde(rename = "resourcepacks")]
    Resource,
    #[serde(rename = "shaderpacks")]
    Shader,
}

impl PackType {
    pub const ALL: [PackType; 2] = [PackType::Resource, PackType::Shader];

    /// Folder name, e.g. `resourcepacks`.
    pub fn dir_name(self) -> &'static str {
        match self {
            PackType::Resource => "resourcepacks",
            PackType::Shader => "shaderpacks",
        }
    }

    /// Human label used when asking the user about a conflict.
    pub fn label(self) -> &'static str {
        match self {
            PackType::Resource => "resource pack",
            PackType::Shader => "shader pack",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "resourcepacks" => Some(PackType::Resource),
            "shaderpacks" => Some(PackType::Shader),
            _ => None,
        }
    }
}

impl std::fmt::Display for PackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One pack file, identified by its type and file name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PackEntry {
    pub pack_type: PackType,
    pub file_name: String,
}

impl PackEntry {
    pub fn new(pack_type: PackType, file_name: impl Into<String>) -> Self {
        Self {
            pack_type,
            file_name: file_name.into(),
        }
    }
}

/// A single file owned by a profile: a mod jar or an asset pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileItem {
    Mod { file_name: String },
    Pack(PackEntry),
}

/// Ordered record of the shared pack files a profile deployed while active.
///
/// Persisted as one `packType|fileName` line per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackManifest {
    entries: Vec<PackEntry>,
}

impl PackManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses manifest text. Lines that do not split into exactly two
    /// fields, or that name an unknown pack type, are skipped.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let line = line.trim_end_matches('\r');
                let mut parts = line.split('|');
                let (kind, file_name) = (parts.next()?, parts.next()?);
                if parts.next().is_some() || file_name.is_empty() {
                    return None;
                }
                let pack_type = PackType::from_dir_name(kind)?;
                Some(PackEntry::new(pack_type, file_name))
            })
            .collect();
        Self { entries }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(entry.pack_type.dir_name());
            out.push('|');
            out.push_str(&entry.file_name);
            out.push('\n');
        }
        out
    }

    /// Records an entry; an identical entry already present is not duplicated.
    pub fn push(&mut self, entry: PackEntry) {
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    pub fn remove(&mut self, entry: &PackEntry) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e != entry);
        before != self.entries.len()
    }

    pub fn entries(&self) -> &[PackEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<PackEntry> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Rejects names that cannot be a profile storage folder.
///
/// Dot-prefixed names are reserved for the marker and manifest files.
pub fn validate_profile_name(name: &str) -> SwitcherResult<&str> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed.contains(['/', '\\'])
        || trimmed.chars().any(char::is_control);

    if invalid {
        return Err(SwitcherError::InvalidProfileName(name.to_string()));
    }
    Ok(trimmed)
}
