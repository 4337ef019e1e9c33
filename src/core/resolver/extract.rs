//! Pulls registry identifiers out of pasted text.
//!
//! Text extractors run in a fixed order and feed one ordered,
//! case-insensitively deduplicated set. Bare-line parsing only kicks in
//! when nothing else matched.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

static COLLECTION_URL: OnceLock<Regex> = OnceLock::new();
static PROJECT_URL: OnceLock<Regex> = OnceLock::new();
static BARE_IDENTIFIER: OnceLock<Regex> = OnceLock::new();

fn collection_url() -> &'static Regex {
    COLLECTION_URL.get_or_init(|| {
        Regex::new(r"(?i)modrinth\.com/collection/(?P<id>[A-Za-z0-9]+)")
            .expect("collection pattern is valid")
    })
}

fn project_url() -> &'static Regex {
    PROJECT_URL.get_or_init(|| {
        Regex::new(
            r"(?i)modrinth\.com/(?:mod|plugin|project|datapack|shader|resourcepack)/(?P<slug>[A-Za-z0-9_-]+)",
        )
        .expect("project pattern is valid")
    })
}

fn bare_identifier() -> &'static Regex {
    BARE_IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("identifier pattern is valid"))
}

/// Ordered identifiers, deduplicated ignoring case. The first spelling seen
/// is kept.
#[derive(Debug, Default)]
pub struct IdentifierSet {
    seen: HashSet<String>,
    ids: Vec<String>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str) -> bool {
        if id.is_empty() || !self.seen.insert(id.to_lowercase()) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    pub fn extend<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.insert(id.as_ref());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ids
    }
}

/// Extractors that need nothing but the text, in the order they run after
/// collection expansion.
pub const TEXT_EXTRACTORS: &[fn(&str) -> Vec<String>] = &[project_slugs, json_identifiers];

/// Id of the first collection URL in `text`.
pub fn collection_id(text: &str) -> Option<String> {
    collection_url()
        .captures(text)
        .map(|caps| caps["id"].to_string())
}

/// Slugs of every direct project URL, in order of appearance.
pub fn project_slugs(text: &str) -> Vec<String> {
    project_url()
        .captures_iter(text)
        .map(|caps| caps["slug"].to_string())
        .collect()
}

/// Identifiers from a JSON array, or from the `mods` array of a JSON
/// object. Anything that is not JSON yields nothing.
pub fn json_identifiers(text: &str) -> Vec<String> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('[') && !trimmed.starts_with('{') {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => identifiers_from_value(&value),
        Err(_) => Vec::new(),
    }
}

fn identifiers_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(identifier_of_item).collect(),
        Value::Object(map) => map
            .get("mods")
            .filter(|mods| mods.is_array())
            .map(identifiers_from_value)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn identifier_of_item(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => ["slug", "id", "project_id"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|v| !v.is_null())
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Each line that looks like a bare slug or id, once stripped of
/// whitespace and enclosing slashes.
pub fn bare_identifiers(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.trim().trim_matches('/'))
        .filter(|line| bare_identifier().is_match(line))
        .map(str::to_string)
        .collect()
}
