//! Folder management
//!
//! Handles company folder mapping into a cached tree, directory listing,
//! per-view navigation history and path utilities.

mod listing;
mod navigator;
mod tree;

pub use listing::{find_files_recursively, read_directory};
pub use navigator::{Breadcrumb, NavigationSnapshot, Navigator, MAX_HISTORY_ENTRIES};
pub use tree::map_directory;

use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Normalize a folder path for consistent comparison
///
/// Separators become `/` and the result always ends with one.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Check if a path is under (or equal to) a parent folder
pub fn is_under_folder(path: &str, folder: &str) -> bool {
    let norm_path = normalize_path(path);
    let norm_folder = normalize_path(folder);
    norm_path.starts_with(&norm_folder)
}

/// Fold `.` and `..` segments out of a path without touching the disk
///
/// `..` never climbs above the path's root.
pub fn lexical_clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(cleaned.components().next_back(), Some(Component::Normal(_))) {
                    cleaned.pop();
                } else if !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Extract folder name from full path
pub fn get_folder_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Lower-cased extension without the dot, empty when there is none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Hidden files and Office lock files (`~$Acta.docx`) are never listed
pub fn is_hidden_or_temp(file_name: &str) -> bool {
    file_name.starts_with('.') || file_name.starts_with("~$")
}

/// Seconds since the Unix epoch, as stored in the mapped tree
pub(crate) fn epoch_secs(time: std::io::Result<SystemTime>) -> Option<f64> {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
}
