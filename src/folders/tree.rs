use std::fs;
use std::path::Path;

use chrono::Utc;
use walkdir::WalkDir;

use super::{epoch_secs, is_hidden_or_temp};
use crate::error::{Result, SgsstError};
use crate::models::{DirectoryNode, FileNode, MappedStructure};

/// Map a company root folder into a cached tree
///
/// The walk is sorted by file name, so the stored tree (and every
/// depth-first search over it) has a stable order. Unreadable entries do
/// not abort the mapping; they are recorded in the owning node's `errors`
/// and in the top-level `errors` list.
pub fn map_directory(root: &Path) -> Result<MappedStructure> {
    if !root.is_dir() {
        return Err(SgsstError::DirectoryNotFound(root.to_string_lossy().to_string()));
    }

    log::info!("Mapping directory: {:?}", root);

    let mut tree = dir_node(root);
    let mut errors = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_or_temp(&e.file_name().to_string_lossy()));

    for entry in walker {
        match entry {
            Ok(entry) => {
                let Ok(relative) = entry.path().strip_prefix(root) else {
                    continue;
                };
                let Some(parent) = relative.parent().and_then(|p| descend_mut(&mut tree, p)) else {
                    continue;
                };
                let name = entry.file_name().to_string_lossy().to_string();

                if entry.file_type().is_dir() {
                    parent.subdirectories.insert(name, dir_node(entry.path()));
                } else if entry.file_type().is_file() {
                    parent.files.push(file_node(entry.path(), &name));
                }
            }
            Err(e) => {
                let message = match e.path() {
                    Some(path) => format!("Error accessing {}: {}", path.display(), e),
                    None => format!("Error while mapping: {}", e),
                };
                log::warn!("{}", message);

                if let Some(node) = e
                    .path()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .and_then(|rel| descend_mut(&mut tree, rel))
                {
                    node.errors.push(message.clone());
                }
                errors.push(message);
            }
        }
    }

    update_counts(&mut tree);

    let structure = MappedStructure {
        root: root.to_string_lossy().to_string(),
        scan_date: Some(Utc::now().to_rfc3339()),
        total_files: tree.total_files(),
        total_folders: tree.total_folders(),
        errors,
        structure: Some(tree),
    };

    log::info!(
        "Directory mapping completed: {} files in {} folders",
        structure.total_files,
        structure.total_folders
    );

    Ok(structure)
}

/// Walk down `relative` from `node`; the empty path yields `node` itself
fn descend_mut<'a>(node: &'a mut DirectoryNode, relative: &Path) -> Option<&'a mut DirectoryNode> {
    let mut current = node;
    for component in relative.components() {
        let key = component.as_os_str().to_string_lossy();
        current = current.subdirectories.get_mut(&*key)?;
    }
    Some(current)
}

fn dir_node(path: &Path) -> DirectoryNode {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let mut node = DirectoryNode {
        name,
        path: path.to_string_lossy().to_string(),
        ..Default::default()
    };

    match fs::metadata(path) {
        Ok(meta) => {
            node.created = epoch_secs(meta.created());
            node.modified = epoch_secs(meta.modified());
        }
        Err(e) => node
            .errors
            .push(format!("Error getting stats for directory {}: {}", path.display(), e)),
    }

    node
}

fn file_node(path: &Path, name: &str) -> FileNode {
    let meta = fs::metadata(path).ok();
    FileNode {
        name: name.to_string(),
        path: path.to_string_lossy().to_string(),
        size: meta.as_ref().map(|m| m.len()).unwrap_or(0),
        created: meta.as_ref().and_then(|m| epoch_secs(m.created())),
        modified: meta.as_ref().and_then(|m| epoch_secs(m.modified())),
        extension: path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default(),
    }
}

fn update_counts(node: &mut DirectoryNode) {
    node.file_count = node.files.len();
    node.dir_count = node.subdirectories.len();
    for child in node.subdirectories.values_mut() {
        update_counts(child);
    }
}
