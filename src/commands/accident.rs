use std::path::PathBuf;

use serde_json::{Map, Value};
use tauri::{AppHandle, Emitter, State};

use super::blocking;
use crate::accident::{self, AccidentAnalysis, PROGRESS_EVENT};
use crate::state::AppState;

/// Parse an accident report PDF, emitting progress events as it goes
#[tauri::command]
pub async fn process_accident_pdf(
    app: AppHandle,
    pdf_path: String,
    company: String,
    context: Option<String>,
    state: State<'_, AppState>,
) -> Result<AccidentAnalysis, String> {
    let runner = state.script_runner().map_err(|e| e.to_string())?;
    let context = context.unwrap_or_default();

    blocking(move || {
        accident::process_accident_pdf(&runner, &PathBuf::from(pdf_path), &company, &context, |progress| {
            if let Err(e) = app.emit(PROGRESS_EVENT, &progress) {
                log::warn!("Failed to emit progress: {}", e);
            }
        })
    })
    .await
}

#[tauri::command]
pub async fn generate_accident_report(
    data: Map<String, Value>,
    company: String,
    state: State<'_, AppState>,
) -> Result<String, String> {
    let runner = state.script_runner().map_err(|e| e.to_string())?;
    let path = blocking(move || accident::generate_accident_report(&runner, &data, &company)).await?;
    Ok(path.to_string_lossy().to_string())
}
