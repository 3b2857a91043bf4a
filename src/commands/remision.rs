use std::path::PathBuf;

use tauri::State;

use super::blocking;
use super::files::reveal;
use crate::config::CompanyProfile;
use crate::error::SgsstError;
use crate::remision::{
    self, ComposedMessage, ControlData, MessageRequest, RemisionData, RemisionResult,
};
use crate::state::AppState;

#[tauri::command]
pub async fn process_remision_pdf(pdf_path: String, state: State<'_, AppState>) -> Result<RemisionData, String> {
    let runner = state.script_runner().map_err(|e| e.to_string())?;
    blocking(move || remision::extract_remision_pdf(&runner, &PathBuf::from(pdf_path))).await
}

/// Generate the referral letter for the company named by the affiliation field
#[tauri::command]
pub async fn generate_remision_document(
    data: RemisionData,
    state: State<'_, AppState>,
) -> Result<RemisionResult, String> {
    let settings = state.settings().map_err(|e| e.to_string())?;
    let profile = remision::company_for_data(&settings, &data)
        .map_err(|e| e.to_string())?
        .clone();
    let runner = state.script_runner().map_err(|e| e.to_string())?;
    blocking(move || remision::generate_remision(&runner, &data, &profile)).await
}

/// Look up the worker's phone, open WhatsApp with the message and reveal
/// the letter so it can be attached
#[tauri::command]
pub async fn send_remision_by_whatsapp(
    document_path: String,
    data: RemisionData,
    state: State<'_, AppState>,
) -> Result<ComposedMessage, String> {
    let (profile, runner) = company_and_runner(&data, &state)?;
    let document = PathBuf::from(&document_path);

    let message = {
        let profile = profile.clone();
        let document = document.clone();
        blocking(move || {
            let result = remision::prepare_whatsapp(&runner, &document, &data, &profile)?;
            let request = remision::message_request(&profile.name, &data, &result);
            Ok(remision::compose_message(&request, profile.sender_email.as_deref()))
        })
        .await?
    };

    let link = message
        .whatsapp
        .as_deref()
        .ok_or_else(|| SgsstError::Tool("No se encontró un número de celular".to_string()).to_string())?;
    opener::open(link).map_err(|e| e.to_string())?;
    reveal(&document)?;

    log::info!("WhatsApp message prepared for {} ({})", profile.name, document_path);
    Ok(message)
}

/// Open the mail client with the composed referral message
#[tauri::command]
pub async fn send_remision_by_email(
    document_path: String,
    data: RemisionData,
    state: State<'_, AppState>,
) -> Result<ComposedMessage, String> {
    let (profile, runner) = company_and_runner(&data, &state)?;
    let document = PathBuf::from(&document_path);

    let message = {
        let profile = profile.clone();
        let document = document.clone();
        blocking(move || {
            let result = remision::prepare_email(&runner, &document, &data, &profile)?;
            let request = remision::message_request(&profile.name, &data, &result);
            Ok(remision::compose_message(&request, profile.sender_email.as_deref()))
        })
        .await?
    };

    let link = message
        .mailto
        .as_deref()
        .ok_or_else(|| SgsstError::Tool("No se encontró un correo electrónico".to_string()).to_string())?;
    opener::open(link).map_err(|e| e.to_string())?;
    reveal(&document)?;

    log::info!("Email prepared for {} ({})", profile.name, document_path);
    Ok(message)
}

/// Compose the message without running any script
#[tauri::command]
pub async fn compose_remision_message(
    request: MessageRequest,
    state: State<'_, AppState>,
) -> Result<ComposedMessage, String> {
    let settings = state.settings().map_err(|e| e.to_string())?;
    let sender = settings
        .company(&request.company)
        .and_then(|p| p.sender_email.clone());
    Ok(remision::compose_message(&request, sender.as_deref()))
}

#[tauri::command]
pub async fn get_control_remisiones_data(
    company: String,
    state: State<'_, AppState>,
) -> Result<ControlData, String> {
    let settings = state.settings().map_err(|e| e.to_string())?;
    blocking(move || remision::control_remisiones(&settings, &company)).await
}

fn company_and_runner(
    data: &RemisionData,
    state: &State<'_, AppState>,
) -> Result<(CompanyProfile, crate::scripts::ScriptRunner), String> {
    let settings = state.settings().map_err(|e| e.to_string())?;
    let profile = remision::company_for_data(&settings, data)
        .map_err(|e| e.to_string())?
        .clone();
    let runner = state.script_runner().map_err(|e| e.to_string())?;
    Ok((profile, runner))
}
