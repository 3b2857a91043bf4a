use std::path::PathBuf;

use tauri::State;

use super::blocking;
use crate::acta::{self, ActaEdits, ActaGrid, ActaKind, CellEdit};
use crate::state::AppState;

#[tauri::command]
pub async fn load_acta_template(kind: ActaKind, state: State<'_, AppState>) -> Result<ActaGrid, String> {
    let templates = state.templates_dir().map_err(|e| e.to_string())?;
    blocking(move || acta::load_template(&templates, kind)).await
}

/// Save the edited acta; returns the written document path
#[tauri::command]
pub async fn save_acta(
    kind: ActaKind,
    edits: Vec<CellEdit>,
    output_path: String,
    state: State<'_, AppState>,
) -> Result<String, String> {
    let templates = state.templates_dir().map_err(|e| e.to_string())?;
    let runner = state.script_runner().map_err(|e| e.to_string())?;
    let edits: ActaEdits = edits.into_iter().collect();

    let written = blocking(move || {
        acta::save_acta(&runner, &templates, kind, &edits, &PathBuf::from(output_path))
    })
    .await?;
    Ok(written.to_string_lossy().to_string())
}
