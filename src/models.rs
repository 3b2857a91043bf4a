use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Entry returned when listing a single directory
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirEntryInfo {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    pub size: u64,
    pub created: Option<f64>,
    pub modified: Option<f64>,
}

/// PDF found by the recursive search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PdfFileInfo {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub mtime: Option<f64>,
}

/// File inside a mapped directory tree
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created: Option<f64>,
    #[serde(default)]
    pub modified: Option<f64>,
    #[serde(default)]
    pub extension: String,
}

/// Directory inside a mapped directory tree
///
/// Subdirectories are keyed by name, so depth-first walks visit them in
/// name order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DirectoryNode {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub created: Option<f64>,
    #[serde(default)]
    pub modified: Option<f64>,
    #[serde(default)]
    pub files: Vec<FileNode>,
    #[serde(default)]
    pub subdirectories: BTreeMap<String, DirectoryNode>,
    #[serde(default)]
    pub file_count: usize,
    #[serde(default)]
    pub dir_count: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl DirectoryNode {
    /// Files in this node and every node below it
    pub fn total_files(&self) -> usize {
        self.files.len()
            + self
                .subdirectories
                .values()
                .map(DirectoryNode::total_files)
                .sum::<usize>()
    }

    /// Folders below this node (the node itself is not counted)
    pub fn total_folders(&self) -> usize {
        self.subdirectories.len()
            + self
                .subdirectories
                .values()
                .map(DirectoryNode::total_folders)
                .sum::<usize>()
    }
}

/// Result of mapping a company root folder
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct MappedStructure {
    pub root: String,
    #[serde(default)]
    pub scan_date: Option<String>,
    #[serde(default)]
    pub total_files: usize,
    #[serde(default)]
    pub total_folders: usize,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub structure: Option<DirectoryNode>,
}

/// Root path and cached tree for one company
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CompanyPaths {
    pub root: String,
    #[serde(default)]
    pub structure: Option<MappedStructure>,
}

/// Submodule the user is currently viewing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmoduleSelection {
    pub company: String,
    pub module: String,
    pub submodule: String,
    pub path: Option<String>,
}
