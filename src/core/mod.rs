// ─── Mod Profile Switcher Core ───
//
// Architecture:
//   core/
//     profile/    : profile store, switching engine, content, backups
//     registry/   : Modrinth client + game version catalog
//     resolver/   : pasted text → resolved mods
//     downloader/ : streaming downloads with SHA-1 validation
//     loaders/    : installed mod loader detection
//     state/      : settings + shared services

pub mod downloader;
pub mod error;
pub mod http;
pub mod loaders;
pub mod profile;
pub mod registry;
pub mod resolver;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
