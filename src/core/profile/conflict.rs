use super::model::PackType;

/// Decides whether a pack being deployed may replace a same-named file
/// already sitting in the shared pack folder.
///
/// Only consulted when deploying. Stashing always overwrites, since it
/// restores the profile's own earlier content.
pub trait ConflictResolver: Send + Sync {
    fn should_overwrite(&self, file_name: &str, pack_type: PackType) -> bool;
}

/// Default policy: the incoming pack wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverwriteExisting;

impl ConflictResolver for OverwriteExisting {
    fn should_overwrite(&self, _file_name: &str, _pack_type: PackType) -> bool {
        true
    }
}

/// The file already in the shared folder wins; the incoming pack stays in
/// profile storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepExisting;

impl ConflictResolver for KeepExisting {
    fn should_overwrite(&self, _file_name: &str, _pack_type: PackType) -> bool {
        false
    }
}

impl<F> ConflictResolver for F
where
    F: Fn(&str, PackType) -> bool + Send + Sync,
{
    fn should_overwrite(&self, file_name: &str, pack_type: PackType) -> bool {
        self(file_name, pack_type)
    }
}
