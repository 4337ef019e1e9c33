use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the switcher backend.
/// Every module returns `Result<T, SwitcherError>`.
#[derive(Debug, Error)]
pub enum SwitcherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Download cancelled: {0}")]
    Cancelled(String),

    #[error("Registry error: {0}")]
    Registry(String),

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip read error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Profiles ────────────────────────────────────────
    #[error("Profile folder '{0}' not found")]
    ProfileNotFound(String),

    #[error("Profile folder '{0}' already exists")]
    AlreadyExists(String),

    #[error("Invalid profile name: {0:?}")]
    InvalidProfileName(String),

    #[error(
        "There are loose mods in the active folder but no active profile name is set; \
         name the current set of mods first so they can be saved"
    )]
    AmbiguousActiveState,

    #[error("Cannot delete the active profile '{0}'; deactivate or switch first")]
    CannotDeleteActive(String),

    #[error("Backup not found: {0}")]
    BackupNotFound(String),

    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("Unsupported file type: {0:?}")]
    UnsupportedFile(PathBuf),

    #[error("Cannot tell whether {0:?} is a resource pack or a shader pack")]
    UnknownPackType(PathBuf),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type SwitcherResult<T> = Result<T, SwitcherError>;

impl SwitcherError {
    /// Wraps an IO error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SwitcherError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for SwitcherError {
    fn from(source: std::io::Error) -> Self {
        SwitcherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

// ── Serialization for the command surface ──────────────
// Front ends receive errors as their display string.
impl serde::Serialize for SwitcherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
