use std::path::PathBuf;

use tauri::State;

use super::blocking;
use crate::config::{AppConfig, Settings};
use crate::models::MappedStructure;
use crate::state::AppState;

/// Load config.json (empty config when it does not exist yet)
#[tauri::command]
pub async fn load_config(state: State<'_, AppState>) -> Result<AppConfig, String> {
    state.load_config().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn save_config(config: AppConfig, state: State<'_, AppState>) -> Result<(), String> {
    state.save_config(&config).map_err(|e| e.to_string())?;
    log::info!("Configuration saved ({} companies)", config.company_paths.len());
    Ok(())
}

#[tauri::command]
pub async fn get_settings(state: State<'_, AppState>) -> Result<Settings, String> {
    state.settings().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_settings(settings: Settings, state: State<'_, AppState>) -> Result<Settings, String> {
    state
        .update_config(|config| {
            config.settings = settings;
            config.settings.clone()
        })
        .map_err(|e| e.to_string())
}

/// Map a folder tree without storing it
#[tauri::command]
pub async fn map_directory(path: String) -> Result<MappedStructure, String> {
    blocking(move || crate::folders::map_directory(&PathBuf::from(path))).await
}

/// Map a company's root folder and store it in the config
#[tauri::command]
pub async fn link_company(
    company: String,
    root: String,
    state: State<'_, AppState>,
) -> Result<MappedStructure, String> {
    let scan_root = root.clone();
    let structure = blocking(move || crate::folders::map_directory(&PathBuf::from(scan_root))).await?;

    state
        .update_config(|config| config.link_company(&company, &root, structure.clone()))
        .map_err(|e| e.to_string())?;

    log::info!(
        "Linked {} to {} ({} files, {} folders)",
        company,
        root,
        structure.total_files,
        structure.total_folders
    );
    Ok(structure)
}
