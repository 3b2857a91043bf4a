use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::settings::Settings;
use crate::error::Result;
use crate::models::{CompanyPaths, MappedStructure};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Everything persisted in `config.json`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct AppConfig {
    #[serde(rename = "companyPaths", default)]
    pub company_paths: BTreeMap<String, CompanyPaths>,

    #[serde(default)]
    pub settings: Settings,

    /// Keys written by other versions of the app, kept on save
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AppConfig {
    /// Record the root path and freshly mapped tree for a company
    pub fn link_company(&mut self, company: &str, root: &str, structure: MappedStructure) {
        self.company_paths.insert(
            company.to_string(),
            CompanyPaths {
                root: root.to_string(),
                structure: Some(structure),
            },
        );
    }

    pub fn company_root(&self, company: &str) -> Option<&str> {
        self.company_paths.get(company).map(|c| c.root.as_str())
    }
}

/// Reads and writes the JSON config file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by `<data_dir>/config.json`
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CONFIG_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config; a missing file yields the default config
    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            log::info!("Config file not found at {:?}, using defaults", self.path);
            return Ok(AppConfig::default());
        }

        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        let config: AppConfig = serde_json::from_str(&data).map_err(|e| {
            log::error!("Error parsing config {:?}: {}", self.path, e);
            e
        })?;
        Ok(config)
    }

    /// Save the config, replacing the file only once the new content is written
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut tmp, config)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        log::info!("Config saved to {:?}", self.path);
        Ok(())
    }

    /// Load, modify and save in one step
    pub fn update<T>(&self, f: impl FnOnce(&mut AppConfig) -> T) -> Result<T> {
        let mut config = self.load()?;
        let out = f(&mut config);
        self.save(&config)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DirectoryNode;

    fn sample_structure(root: &str) -> MappedStructure {
        MappedStructure {
            root: root.to_string(),
            scan_date: Some("2024-01-01T00:00:00+00:00".to_string()),
            total_files: 0,
            total_folders: 0,
            errors: Vec::new(),
            structure: Some(DirectoryNode {
                name: "root".to_string(),
                path: root.to_string(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let config = store.load().unwrap();
        assert!(config.company_paths.is_empty());
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(&dir.path().join("nested"));

        let mut config = AppConfig::default();
        config.link_company("Asel", "/data/asel", sample_structure("/data/asel"));
        config.settings.python = "py".to_string();
        store.save(&config).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.company_root("Asel"), Some("/data/asel"));
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_original_format_and_unknown_keys_survive() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        fs::write(
            store.path(),
            r#"{
                "companyPaths": {
                    "Tempoactiva": {
                        "root": "G:/Tempoactiva",
                        "structure": {
                            "root": "G:/Tempoactiva",
                            "scan_date": null,
                            "total_files": 1,
                            "total_folders": 0,
                            "errors": [],
                            "structure": {
                                "name": "Tempoactiva",
                                "path": "G:/Tempoactiva",
                                "created": 1700000000.5,
                                "modified": 1700000000.5,
                                "files": [{"name": "1.1.1 Acta.pdf", "path": "G:/Tempoactiva/1.1.1 Acta.pdf", "size": 10, "extension": ".pdf", "checksum": "abc"}],
                                "subdirectories": {},
                                "file_count": 1,
                                "dir_count": 0,
                                "errors": []
                            }
                        }
                    }
                },
                "theme": "dark"
            }"#,
        )
        .unwrap();

        let config = store.load().unwrap();
        let company = &config.company_paths["Tempoactiva"];
        let root = company.structure.as_ref().unwrap().structure.as_ref().unwrap();
        assert_eq!(root.files[0].name, "1.1.1 Acta.pdf");

        store.save(&config).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store
            .update(|c| c.link_company("Temposum", "/t", sample_structure("/t")))
            .unwrap();
        assert_eq!(store.load().unwrap().company_root("Temposum"), Some("/t"));
    }
}
