// Small blocking filesystem helpers shared by the switcher, content and
// backup code. Every error carries the path it happened at.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{SwitcherError, SwitcherResult};

pub const MOD_EXTENSION: &str = "jar";
pub const PACK_EXTENSION: &str = "zip";

pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Regular files directly inside `dir`, sorted by path. Missing dir ⇒ empty.
pub fn list_files(dir: &Path) -> SwitcherResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }

    for entry in fs::read_dir(dir).map_err(|e| SwitcherError::io(dir, e))? {
        let path = entry.map_err(|e| SwitcherError::io(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Mod jars directly inside `dir`, sorted.
pub fn list_mod_files(dir: &Path) -> SwitcherResult<Vec<PathBuf>> {
    Ok(list_files(dir)?
        .into_iter()
        .filter(|p| has_extension(p, MOD_EXTENSION))
        .collect())
}

/// Names of the visible subdirectories of `dir`, sorted.
pub fn list_visible_subdirs(dir: &Path) -> SwitcherResult<Vec<String>> {
    let mut names = Vec::new();
    if !dir.is_dir() {
        return Ok(names);
    }

    for entry in fs::read_dir(dir).map_err(|e| SwitcherError::io(dir, e))? {
        let entry = entry.map_err(|e| SwitcherError::io(dir, e))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with('.') {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

pub fn ensure_dir(dir: &Path) -> SwitcherResult<()> {
    fs::create_dir_all(dir).map_err(|e| SwitcherError::io(dir, e))
}

pub fn is_dir_empty(dir: &Path) -> SwitcherResult<bool> {
    if !dir.is_dir() {
        return Ok(true);
    }
    let mut entries = fs::read_dir(dir).map_err(|e| SwitcherError::io(dir, e))?;
    Ok(entries.next().is_none())
}

/// Removes `dir` if it exists and holds nothing. Returns whether it was removed.
pub fn remove_dir_if_empty(dir: &Path) -> SwitcherResult<bool> {
    if !dir.is_dir() || !is_dir_empty(dir)? {
        return Ok(false);
    }
    fs::remove_dir(dir).map_err(|e| SwitcherError::io(dir, e))?;
    Ok(true)
}

pub fn remove_file_if_exists(path: &Path) -> SwitcherResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SwitcherError::io(path, e)),
    }
}

/// Moves `src` to `dest`, replacing whatever file is at `dest`.
///
/// Falls back to copy + delete when a plain rename is refused, e.g. when
/// the two paths live on different volumes.
pub fn move_file(src: &Path, dest: &Path) -> SwitcherResult<()> {
    if dest.is_file() {
        fs::remove_file(dest).map_err(|e| SwitcherError::io(dest, e))?;
    }

    if let Err(rename_err) = fs::rename(src, dest) {
        debug!("rename {:?} -> {:?} failed ({}), copying", src, dest, rename_err);
        fs::copy(src, dest).map_err(|_| SwitcherError::io(src, rename_err))?;
        fs::remove_file(src).map_err(|e| SwitcherError::io(src, e))?;
    }

    debug!("Moved {:?} -> {:?}", src, dest);
    Ok(())
}

/// Copies `src` to `dest`, overwriting.
pub fn copy_file(src: &Path, dest: &Path) -> SwitcherResult<()> {
    fs::copy(src, dest).map_err(|e| SwitcherError::io(dest, e))?;
    Ok(())
}
