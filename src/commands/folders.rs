use std::path::PathBuf;

use tauri::State;

use super::blocking;
use crate::catalog::{find_submodule, submodules, Module, MODULES};
use crate::folders::NavigationSnapshot;
use crate::models::{DirEntryInfo, PdfFileInfo, SubmoduleSelection};
use crate::resolver::{resolve_submodule_path, SubmodulePath};
use crate::state::AppState;

#[tauri::command]
pub async fn read_directory(path: String) -> Result<Vec<DirEntryInfo>, String> {
    blocking(move || crate::folders::read_directory(&PathBuf::from(path))).await
}

/// Every PDF below a folder
#[tauri::command]
pub async fn find_files_recursively(path: String) -> Result<Vec<PdfFileInfo>, String> {
    blocking(move || Ok(crate::folders::find_files_recursively(&PathBuf::from(path)))).await
}

#[tauri::command]
pub async fn find_submodule_path(
    company: String,
    module: String,
    submodule: String,
    state: State<'_, AppState>,
) -> Result<SubmodulePath, String> {
    let config = state.load_config().map_err(|e| e.to_string())?;
    resolve_submodule_path(&config, &company, &module, &submodule).map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_catalog() -> Result<Vec<Module>, String> {
    Ok(MODULES.to_vec())
}

/// Remember the submodule being shown, with its folder when it resolves
#[tauri::command]
pub async fn select_submodule(
    company: String,
    module: String,
    submodule: String,
    state: State<'_, AppState>,
) -> Result<SubmoduleSelection, String> {
    let module = match find_submodule(&submodule) {
        Some((owner, _)) => owner.to_string(),
        None => {
            if submodules(&module).is_none() {
                log::warn!("Unknown module: {}", module);
            }
            log::warn!("Submodule not in catalog: {}", submodule);
            module
        }
    };

    let config = state.load_config().map_err(|e| e.to_string())?;
    let path = match resolve_submodule_path(&config, &company, &module, &submodule) {
        Ok(found) => Some(found.path),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    };

    let selection = SubmoduleSelection {
        company,
        module,
        submodule,
        path,
    };
    state
        .select_submodule(selection.clone())
        .map_err(|e| e.to_string())?;
    Ok(selection)
}

#[tauri::command]
pub async fn get_current_submodule(state: State<'_, AppState>) -> Result<Option<SubmoduleSelection>, String> {
    state.current_submodule().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn navigate_reset(
    view: String,
    root: String,
    state: State<'_, AppState>,
) -> Result<NavigationSnapshot, String> {
    state
        .navigate_reset(&view, PathBuf::from(root))
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn navigate_into(
    view: String,
    path: String,
    state: State<'_, AppState>,
) -> Result<NavigationSnapshot, String> {
    state
        .navigate_into(&view, PathBuf::from(path))
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn navigate_back(view: String, state: State<'_, AppState>) -> Result<NavigationSnapshot, String> {
    state.navigate_back(&view).map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_navigation(view: String, state: State<'_, AppState>) -> Result<NavigationSnapshot, String> {
    state.navigation(&view).map_err(|e| e.to_string())
}
