pub mod client;
pub mod game_versions;
pub mod model;

pub use client::{ModRegistry, ModrinthClient};
pub use game_versions::{GameVersionCatalog, FALLBACK_GAME_VERSIONS};
pub use model::{GameVersionTag, Project, ProjectVersion, VersionFile, VersionFilter};
