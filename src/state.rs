//! Application state management
//!
//! Central state shared by the command handlers:
//! - App data and resource directories (set during setup)
//! - Folder navigators, one per open document view
//! - The submodule currently shown

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::config::{AppConfig, ConfigStore, Settings};
use crate::error::{Result, SgsstError};
use crate::folders::{NavigationSnapshot, Navigator};
use crate::models::SubmoduleSelection;
use crate::scripts::ScriptRunner;

/// Main application state
#[derive(Default)]
pub struct AppState {
    /// App data directory path (holds config.json)
    pub data_dir: Mutex<Option<PathBuf>>,

    /// Bundled resources (scripts/ and templates/)
    pub resource_dir: Mutex<Option<PathBuf>>,

    /// Folder navigation per view id
    pub navigators: Mutex<HashMap<String, Navigator>>,

    pub current_submodule: Mutex<Option<SubmoduleSelection>>,

    /// Serializes read-modify-write cycles on config.json
    config_lock: Mutex<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|e| SgsstError::State(e.to_string()))
}

impl AppState {
    /// Get data directory path
    pub fn get_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.lock().ok()?.clone()
    }

    /// Set data directory path
    pub fn set_data_dir(&self, path: PathBuf) -> Result<()> {
        *lock(&self.data_dir)? = Some(path);
        Ok(())
    }

    pub fn set_resource_dir(&self, path: PathBuf) -> Result<()> {
        *lock(&self.resource_dir)? = Some(path);
        Ok(())
    }

    /// Resource directory, or the working directory before setup ran
    pub fn resource_dir(&self) -> PathBuf {
        self.resource_dir
            .lock()
            .ok()
            .and_then(|d| d.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_store(&self) -> Result<ConfigStore> {
        let data_dir = self
            .get_data_dir()
            .ok_or_else(|| SgsstError::State("data directory not initialized".to_string()))?;
        Ok(ConfigStore::new(&data_dir))
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        let _guard = lock(&self.config_lock)?;
        self.config_store()?.load()
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let _guard = lock(&self.config_lock)?;
        self.config_store()?.save(config)
    }

    /// Load, change and save the config under one lock
    pub fn update_config<T>(&self, f: impl FnOnce(&mut AppConfig) -> T) -> Result<T> {
        let _guard = lock(&self.config_lock)?;
        self.config_store()?.update(f)
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(self.load_config()?.settings)
    }

    pub fn script_runner(&self) -> Result<ScriptRunner> {
        Ok(ScriptRunner::from_settings(&self.settings()?, &self.resource_dir()))
    }

    pub fn templates_dir(&self) -> Result<PathBuf> {
        Ok(self.settings()?.templates_dir_or(&self.resource_dir()))
    }

    pub fn conversion_timeout(&self) -> Result<Duration> {
        Ok(Duration::from_secs(self.settings()?.conversion_timeout_secs))
    }

    pub fn select_submodule(&self, selection: SubmoduleSelection) -> Result<()> {
        log::info!(
            "Selected {} / {} / {}",
            selection.company,
            selection.module,
            selection.submodule
        );
        *lock(&self.current_submodule)? = Some(selection);
        Ok(())
    }

    pub fn current_submodule(&self) -> Result<Option<SubmoduleSelection>> {
        Ok(lock(&self.current_submodule)?.clone())
    }

    /// Start (or restart) a view's navigation at `root`
    pub fn navigate_reset(&self, view: &str, root: PathBuf) -> Result<NavigationSnapshot> {
        let mut navigators = lock(&self.navigators)?;
        let nav = navigators
            .entry(view.to_string())
            .or_insert_with(|| Navigator::new(root.clone()));
        nav.reset(root);
        Ok(nav.snapshot())
    }

    pub fn navigate_into(&self, view: &str, dir: PathBuf) -> Result<NavigationSnapshot> {
        self.with_navigator(view, |nav| {
            nav.enter(dir)?;
            Ok(nav.snapshot())
        })
    }

    pub fn navigate_back(&self, view: &str) -> Result<NavigationSnapshot> {
        self.with_navigator(view, |nav| {
            nav.back();
            Ok(nav.snapshot())
        })
    }

    pub fn navigation(&self, view: &str) -> Result<NavigationSnapshot> {
        self.with_navigator(view, |nav| Ok(nav.snapshot()))
    }

    fn with_navigator<T>(&self, view: &str, f: impl FnOnce(&mut Navigator) -> Result<T>) -> Result<T> {
        let mut navigators = lock(&self.navigators)?;
        let nav = navigators
            .get_mut(view)
            .ok_or_else(|| SgsstError::State(format!("no navigation started for view '{}'", view)))?;
        f(nav)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_config_needs_data_dir() {
        let state = AppState::default();
        assert!(matches!(state.load_config(), Err(SgsstError::State(_))));
    }

    #[test]
    fn test_update_config_persists() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::default();
        state.set_data_dir(dir.path().to_path_buf()).unwrap();

        state
            .update_config(|c| c.settings.conversion_timeout_secs = 5)
            .unwrap();
        assert_eq!(state.conversion_timeout().unwrap(), Duration::from_secs(5));
        assert!(dir.path().join(crate::config::CONFIG_FILE_NAME).is_file());
    }

    #[test]
    fn test_runner_uses_resource_dir() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::default();
        state.set_data_dir(dir.path().to_path_buf()).unwrap();
        state.set_resource_dir(PathBuf::from("/opt/sgsst")).unwrap();

        let runner = state.script_runner().unwrap();
        assert_eq!(runner.scripts_dir(), Path::new("/opt/sgsst/scripts"));
        assert_eq!(state.templates_dir().unwrap(), PathBuf::from("/opt/sgsst/templates"));
    }

    #[test]
    fn test_navigation_per_view() {
        let state = AppState::default();
        assert!(state.navigate_back("copasst").is_err());

        state.navigate_reset("copasst", PathBuf::from("/t/1.1.6 Copasst")).unwrap();
        state.navigate_reset("evaluaciones", PathBuf::from("/t/3.1.4")).unwrap();

        let snap = state
            .navigate_into("copasst", PathBuf::from("/t/1.1.6 Copasst/2024"))
            .unwrap();
        assert!(snap.can_go_back);
        assert!(!state.navigation("evaluaciones").unwrap().can_go_back);

        let snap = state.navigate_back("copasst").unwrap();
        assert_eq!(snap.current, "/t/1.1.6 Copasst");
        assert!(state.navigate_into("copasst", PathBuf::from("/otro")).is_err());
    }

    #[test]
    fn test_current_submodule() {
        let state = AppState::default();
        assert!(state.current_submodule().unwrap().is_none());
        state
            .select_submodule(SubmoduleSelection {
                company: "Asel".to_string(),
                module: "Recursos".to_string(),
                submodule: "1.1.6 Conformación de Copasst".to_string(),
                path: None,
            })
            .unwrap();
        assert_eq!(state.current_submodule().unwrap().unwrap().company, "Asel");
    }
}
