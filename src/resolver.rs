//! Submodule path resolution
//!
//! Finds the folder or file for a submodule by searching the company's
//! cached directory tree for the first name containing the submodule code.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{Result, SgsstError};
use crate::models::DirectoryNode;

/// Successful lookup
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SubmodulePath {
    pub code: String,
    pub path: String,
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9.]+").expect("valid code pattern"))
}

/// Extract the dotted numeric code from a submodule label
///
/// `"1.1.1 Responsable del SG"` gives `"1.1.1"`. Trailing dots are dropped
/// and the code must contain at least one digit.
pub fn extract_code(label: &str) -> Option<String> {
    let raw = code_pattern().find(label.trim_start())?.as_str();
    let code = raw.trim_end_matches('.');
    if code.chars().any(|c| c.is_ascii_digit()) {
        Some(code.to_string())
    } else {
        None
    }
}

/// Depth-first search for the first file or directory whose name contains `code`
///
/// Files of a node are checked before its subdirectories; a subdirectory's
/// own name is checked before descending into it.
pub fn search_in_structure<'a>(node: &'a DirectoryNode, code: &str) -> Option<&'a str> {
    if let Some(file) = node.files.iter().find(|f| f.name.contains(code)) {
        log::debug!("Found file match: {}", file.path);
        return Some(&file.path);
    }

    for (name, child) in &node.subdirectories {
        if name.contains(code) {
            log::debug!("Found directory match: {}", child.path);
            return Some(&child.path);
        }
        if let Some(found) = search_in_structure(child, code) {
            return Some(found);
        }
    }

    None
}

/// Resolve the path of `submodule` inside `company`'s mapped tree
pub fn resolve_submodule_path(
    config: &AppConfig,
    company: &str,
    module: &str,
    submodule: &str,
) -> Result<SubmodulePath> {
    log::info!(
        "Finding path for company: {}, module: {}, submodule: {}",
        company,
        module,
        submodule
    );

    let company_paths = config
        .company_paths
        .get(company)
        .ok_or_else(|| SgsstError::NoCompanyConfig(company.to_string()))?;

    let root = company_paths
        .structure
        .as_ref()
        .and_then(|s| s.structure.as_ref())
        .ok_or_else(|| SgsstError::NoStructure(company.to_string()))?;

    let code =
        extract_code(submodule).ok_or_else(|| SgsstError::InvalidSubmodule(submodule.to_string()))?;

    match search_in_structure(root, &code) {
        Some(path) => {
            log::info!("Found path for code {}: {}", code, path);
            Ok(SubmodulePath {
                code,
                path: path.to_string(),
            })
        }
        None => {
            log::warn!("Path not found for code: {}", code);
            Err(SgsstError::SubmoduleNotFound {
                module: module.to_string(),
                submodule: submodule.to_string(),
                code,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileNode, MappedStructure};

    fn dir(name: &str, path: &str, files: &[&str], subdirs: Vec<DirectoryNode>) -> DirectoryNode {
        DirectoryNode {
            name: name.to_string(),
            path: path.to_string(),
            files: files
                .iter()
                .map(|f| FileNode {
                    name: f.to_string(),
                    path: format!("{}/{}", path, f),
                    ..Default::default()
                })
                .collect(),
            subdirectories: subdirs.into_iter().map(|d| (d.name.clone(), d)).collect(),
            ..Default::default()
        }
    }

    fn sample_tree() -> DirectoryNode {
        dir(
            "Tempoactiva",
            "/t",
            &["Indice.xlsx"],
            vec![
                dir(
                    "1. Recursos",
                    "/t/1. Recursos",
                    &[],
                    vec![
                        dir("1.1.1 Responsable del SG", "/t/1. Recursos/1.1.1 Responsable del SG", &[], vec![]),
                        dir("1.1.6 Copasst", "/t/1. Recursos/1.1.6 Copasst", &["acta.xlsx"], vec![]),
                    ],
                ),
                dir(
                    "3. Gestión de la Salud",
                    "/t/3. Gestión de la Salud",
                    &["3.1.4 Evaluaciones.pdf"],
                    vec![dir("3.1.4 Evaluaciones médicas", "/t/3. Gestión de la Salud/3.1.4 Evaluaciones médicas", &[], vec![])],
                ),
            ],
        )
    }

    fn config_with(tree: Option<DirectoryNode>) -> AppConfig {
        let mut config = AppConfig::default();
        config.link_company(
            "Tempoactiva",
            "/t",
            MappedStructure {
                root: "/t".to_string(),
                structure: tree,
                ..Default::default()
            },
        );
        config
    }

    /// Every name (files and directories) in the tree with its path
    fn all_nodes(node: &DirectoryNode, out: &mut Vec<(String, String)>) {
        for f in &node.files {
            out.push((f.name.clone(), f.path.clone()));
        }
        for (name, child) in &node.subdirectories {
            out.push((name.clone(), child.path.clone()));
            all_nodes(child, out);
        }
    }

    #[test]
    fn test_extract_code() {
        assert_eq!(extract_code("1.1.1 Responsable del SG"), Some("1.1.1".to_string()));
        assert_eq!(extract_code("2.10.1 Evaluación"), Some("2.10.1".to_string()));
        assert_eq!(extract_code("3.1.6. Remisiones"), Some("3.1.6".to_string()));
        assert_eq!(extract_code("Responsable 1.1.1"), None);
        assert_eq!(extract_code("... nada"), None);
        assert_eq!(extract_code(""), None);
    }

    #[test]
    fn test_directory_match() {
        let config = config_with(Some(sample_tree()));
        let found =
            resolve_submodule_path(&config, "Tempoactiva", "Recursos", "1.1.1 Responsable del SG")
                .unwrap();
        assert_eq!(found.code, "1.1.1");
        assert_eq!(found.path, "/t/1. Recursos/1.1.1 Responsable del SG");
    }

    #[test]
    fn test_files_before_subdirectories() {
        let config = config_with(Some(sample_tree()));
        let found = resolve_submodule_path(
            &config,
            "Tempoactiva",
            "Gestión de la Salud",
            "3.1.4 Evaluaciones médicas",
        )
        .unwrap();
        assert_eq!(found.path, "/t/3. Gestión de la Salud/3.1.4 Evaluaciones.pdf");
    }

    #[test]
    fn test_substring_not_only_prefix() {
        let tree = dir("root", "/r", &[], vec![dir("Carpeta 2.4.1 Plan", "/r/Carpeta 2.4.1 Plan", &[], vec![])]);
        assert_eq!(search_in_structure(&tree, "2.4.1"), Some("/r/Carpeta 2.4.1 Plan"));
    }

    #[test]
    fn test_failures() {
        let config = config_with(Some(sample_tree()));
        assert!(matches!(
            resolve_submodule_path(&config, "Asel", "Recursos", "1.1.1 Responsable"),
            Err(SgsstError::NoCompanyConfig(_))
        ));
        assert!(matches!(
            resolve_submodule_path(&config_with(None), "Tempoactiva", "Recursos", "1.1.1 X"),
            Err(SgsstError::NoStructure(_))
        ));
        assert!(matches!(
            resolve_submodule_path(&config, "Tempoactiva", "Recursos", "Sin código"),
            Err(SgsstError::InvalidSubmodule(_))
        ));
        let err = resolve_submodule_path(&config, "Tempoactiva", "Verificación", "6.1.2 Auditoria Anual")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Path not found for module: Verificación, submodule: 6.1.2 Auditoria Anual (code: 6.1.2)"
        );
    }

    #[test]
    fn test_result_name_always_contains_code() {
        let tree = sample_tree();
        let mut nodes = Vec::new();
        all_nodes(&tree, &mut nodes);

        for module in crate::catalog::MODULES {
            for label in module.submodules {
                let code = extract_code(label).unwrap();
                match search_in_structure(&tree, &code) {
                    Some(path) => assert!(nodes
                        .iter()
                        .any(|(name, p)| p == path && name.contains(&code))),
                    None => assert!(!nodes.iter().any(|(name, _)| name.contains(&code))),
                }
            }
        }
    }
}
