use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use super::{epoch_secs, extension_of, is_hidden_or_temp};
use crate::error::{Result, SgsstError};
use crate::models::{DirEntryInfo, PdfFileInfo};

/// List the immediate entries of a directory
///
/// Directories come first, then files, each group ordered by
/// case-insensitive name.
pub fn read_directory(path: &Path) -> Result<Vec<DirEntryInfo>> {
    if !path.is_dir() {
        return Err(SgsstError::DirectoryNotFound(path.to_string_lossy().to_string()));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if is_hidden_or_temp(&name) {
            continue;
        }

        let item_path = entry.path();
        let meta = match fs::metadata(&item_path) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", item_path, e);
                continue;
            }
        };

        entries.push(DirEntryInfo {
            name,
            path: item_path.to_string_lossy().to_string(),
            is_directory: meta.is_dir(),
            size: meta.len(),
            created: epoch_secs(meta.created()),
            modified: epoch_secs(meta.modified()),
        });
    }

    entries.sort_by(|a, b| match (a.is_directory, b.is_directory) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    log::debug!("Read {} entries from {:?}", entries.len(), path);
    Ok(entries)
}

/// Find every PDF below `base`
///
/// Folders that cannot be read are logged and skipped.
pub fn find_files_recursively(base: &Path) -> Vec<PdfFileInfo> {
    let mut files = Vec::new();

    for entry in WalkDir::new(base).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Error walking directory: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || extension_of(entry.path()) != "pdf" {
            continue;
        }

        let meta = entry.metadata().ok();
        files.push(PdfFileInfo {
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.path().to_string_lossy().to_string(),
            size: meta.as_ref().map(|m| m.len()).unwrap_or(0),
            mtime: meta.as_ref().and_then(|m| epoch_secs(m.modified())),
        });
    }

    log::info!("Found {} PDF files recursively in {:?}", files.len(), base);
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_directory_orders_dirs_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), b"1234").unwrap();
        fs::write(dir.path().join("A.docx"), b"1").unwrap();
        fs::write(dir.path().join("~$A.docx"), b"lock").unwrap();
        fs::write(dir.path().join(".DS_Store"), b"x").unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::create_dir(dir.path().join("Alfa")).unwrap();

        let entries = read_directory(dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alfa", "zeta", "A.docx", "b.pdf"]);
        assert!(entries[0].is_directory);
        assert_eq!(entries[3].size, 4);
    }

    #[test]
    fn test_read_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_directory(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_find_pdfs_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("2024/enero")).unwrap();
        fs::write(dir.path().join("2024/enero/examen.PDF"), b"%PDF").unwrap();
        fs::write(dir.path().join("2024/notas.docx"), b"x").unwrap();
        fs::write(dir.path().join("raiz.pdf"), b"%PDF-1.4").unwrap();

        let found = find_files_recursively(dir.path());
        let mut names: Vec<_> = found.iter().map(|f| f.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["examen.PDF", "raiz.pdf"]);
    }

    #[test]
    fn test_find_in_missing_base_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_files_recursively(&dir.path().join("missing")).is_empty());
    }
}
