use std::path::{Path, PathBuf};

use tauri::State;

use super::blocking;
use crate::error::SgsstError;
use crate::preview::{self, PreviewKind, PreviewOutcome};
use crate::state::AppState;

/// Open a file or folder with the default application
#[tauri::command]
pub async fn open_path(path: String) -> Result<(), String> {
    if !Path::new(&path).exists() {
        return Err(SgsstError::FileNotFound(path).to_string());
    }
    opener::open(&path).map_err(|e| e.to_string())
}

/// Show file in folder/explorer
#[tauri::command]
pub async fn show_in_folder(file_path: String) -> Result<(), String> {
    reveal(Path::new(&file_path))
}

/// Select `path` in the platform file manager, falling back to opening
/// its parent folder
pub(crate) fn reveal(path: &Path) -> Result<(), String> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("explorer")
            .arg("/select,")
            .arg(path)
            .spawn()
            .map_err(|e| e.to_string())?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg("-R")
            .arg(path)
            .spawn()
            .map_err(|e| e.to_string())?;
    }

    #[cfg(target_os = "linux")]
    {
        let selected = ["nautilus", "dolphin"].iter().any(|fm| {
            std::process::Command::new(fm)
                .arg("--select")
                .arg(path)
                .spawn()
                .is_ok()
        });
        if !selected {
            let parent = path.parent().unwrap_or(path);
            opener::open(parent).map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

/// Prepare a file for the embedded PDF viewer
#[tauri::command]
pub async fn preview_file(path: String, state: State<'_, AppState>) -> Result<PreviewOutcome, String> {
    let runner = state.script_runner().map_err(|e| e.to_string())?;
    let timeout = state.conversion_timeout().map_err(|e| e.to_string())?;
    blocking(move || preview::prepare_preview(&runner, &PathBuf::from(path), timeout)).await
}

/// Convert a Word or Excel document to PDF; returns the temp PDF path
#[tauri::command]
pub async fn convert_to_pdf(path: String, state: State<'_, AppState>) -> Result<String, String> {
    let source = PathBuf::from(&path);
    let kind = match preview::preview_kind(&source) {
        PreviewKind::Convert(kind) => kind,
        _ => {
            let ext = crate::folders::extension_of(&source);
            return Err(SgsstError::Unsupported(format!("PDF conversion of '.{}' files", ext)).to_string());
        }
    };

    let runner = state.script_runner().map_err(|e| e.to_string())?;
    let timeout = state.conversion_timeout().map_err(|e| e.to_string())?;
    let pdf = blocking(move || preview::convert_to_pdf(&runner, kind, &source, timeout)).await?;
    Ok(pdf.to_string_lossy().to_string())
}
