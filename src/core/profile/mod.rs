pub mod backup;
pub mod conflict;
pub mod content;
pub(crate) mod fsops;
pub mod model;
pub mod store;
pub mod switcher;

pub use backup::BackupManager;
pub use conflict::{ConflictResolver, KeepExisting, OverwriteExisting};
pub use content::classify_pack_archive;
pub use model::{PackEntry, PackManifest, PackType, ProfileItem};
pub use store::{ProfileStore, StoreLayout};
pub use switcher::ProfileSwitcher;
