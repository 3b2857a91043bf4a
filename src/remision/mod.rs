//! EPS referral letters (remisiones)
//!
//! Fields are extracted from the occupational exam PDF by a script, the
//! letter is generated and logged in the company's control sheet by
//! another, and the message to the worker is composed here.

mod messages;

use std::ffi::OsStr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub use messages::{
    compose_message, mailto_link, normalize_phone, template_for, whatsapp_link, ComposedMessage,
    EmailTemplate, MessageRequest,
};

use crate::config::{CompanyProfile, Settings};
use crate::error::{Result, SgsstError};
use crate::extractors::read_first_sheet;
use crate::scripts::{ScriptRunner, TempPayload};

pub const EXTRACT_SCRIPT: &str = "process_pdf_cli.py";
pub const UTILS_SCRIPT: &str = "remision_utils.py";

/// Field name to value, as extracted from the exam PDF
pub type RemisionData = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemisionAction {
    Generate,
    Email,
    Whatsapp,
}

impl RemisionAction {
    fn flag(self) -> &'static str {
        match self {
            RemisionAction::Generate => "--generate-remision",
            RemisionAction::Email => "--send-email",
            RemisionAction::Whatsapp => "--send-whatsapp",
        }
    }
}

/// Result payload of `remision_utils.py`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RemisionResult {
    pub success: bool,
    pub document_path: Option<String>,
    pub control_path: Option<String>,
    pub phone_number: Option<String>,
    pub message: Option<String>,
}

/// Extract the referral fields from an exam PDF
pub fn extract_remision_pdf(runner: &ScriptRunner, pdf: &Path) -> Result<RemisionData> {
    if !pdf.is_file() {
        return Err(SgsstError::FileNotFound(pdf.to_string_lossy().to_string()));
    }

    log::info!("Extracting remision fields from {:?}", pdf);
    let value = runner.run_json(EXTRACT_SCRIPT, &[pdf])?;
    match value.get("data") {
        Some(Value::Object(data)) => {
            log::info!("Extracted {} fields", data.len());
            Ok(data.clone())
        }
        _ => Err(SgsstError::ScriptOutput {
            script: EXTRACT_SCRIPT.to_string(),
            message: "missing 'data' object".to_string(),
        }),
    }
}

pub fn generate_remision(
    runner: &ScriptRunner,
    data: &RemisionData,
    company: &CompanyProfile,
) -> Result<RemisionResult> {
    run_utils(runner, RemisionAction::Generate, data, company, None)
}

/// Look up the worker's phone for a generated letter
pub fn prepare_whatsapp(
    runner: &ScriptRunner,
    document: &Path,
    data: &RemisionData,
    company: &CompanyProfile,
) -> Result<RemisionResult> {
    run_utils(runner, RemisionAction::Whatsapp, data, company, Some(document))
}

pub fn prepare_email(
    runner: &ScriptRunner,
    document: &Path,
    data: &RemisionData,
    company: &CompanyProfile,
) -> Result<RemisionResult> {
    run_utils(runner, RemisionAction::Email, data, company, Some(document))
}

fn run_utils(
    runner: &ScriptRunner,
    action: RemisionAction,
    data: &RemisionData,
    company: &CompanyProfile,
    document: Option<&Path>,
) -> Result<RemisionResult> {
    if let Some(doc) = document {
        if !doc.is_file() {
            return Err(SgsstError::FileNotFound(doc.to_string_lossy().to_string()));
        }
    }

    log::info!("remision {} for {}", action.flag(), company.name);
    let payload = TempPayload::write(
        "remision",
        &json!({
            "data": data,
            "empresa": company.name.to_uppercase(),
            "docPath": document.map(|d| d.to_string_lossy().to_string()),
            "paths": {
                "template": company.remision_template,
                "remisionesDir": company.remisiones_dir,
                "control": company.control_file,
            },
        }),
    )?;

    let args = [OsStr::new(action.flag()), payload.path().as_os_str()];
    let value = runner.run_json_lines(UTILS_SCRIPT, &args)?;
    let result: RemisionResult = serde_json::from_value(value)?;
    Ok(result)
}

/// Company that owns a referral, from its "Afiliación" field
pub fn company_for_data<'a>(settings: &'a Settings, data: &RemisionData) -> Result<&'a CompanyProfile> {
    let affiliation = data
        .get("Afiliación")
        .or_else(|| data.get("Afiliacion"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    settings
        .company_for_affiliation(affiliation)
        .ok_or_else(|| SgsstError::UnknownCompany(affiliation.to_string()))
}

/// Message recipient built from extracted fields and the contact lookup
pub fn message_request(company: &str, data: &RemisionData, result: &RemisionResult) -> MessageRequest {
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| data.get(*k).and_then(Value::as_str))
            .map(str::to_string)
    };
    MessageRequest {
        company: company.to_string(),
        name: text(&["Nombre Completo", "Nombre"]).unwrap_or_default(),
        date: text(&["Fecha de Atención", "Fecha de Atencion"]),
        email: text(&["Correo", "Email"]),
        phone: result.phone_number.clone().or_else(|| text(&["Celular", "Teléfono"])),
    }
}

/// Rows of the remisiones control sheet
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct ControlData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read the control sheet configured for `company`
pub fn control_remisiones(settings: &Settings, company: &str) -> Result<ControlData> {
    let profile = settings
        .company(company)
        .ok_or_else(|| SgsstError::UnknownCompany(company.to_string()))?;
    let path = profile
        .control_file
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| SgsstError::NoCompanyConfig(company.to_string()))?;

    log::info!("Reading remisiones control for {}: {}", company, path);
    read_control_sheet(Path::new(path))
}

/// The header row is the first one naming the worker's ID column, or the
/// first non-empty row when none does
pub fn read_control_sheet(path: &Path) -> Result<ControlData> {
    let grid = read_first_sheet(path)?.to_grid();

    let header_idx = grid
        .iter()
        .position(|row| row.iter().any(|c| c.trim().starts_with("No. Identificaci")))
        .or_else(|| grid.iter().position(|row| !is_blank(row)));

    let Some(header_idx) = header_idx else {
        return Ok(ControlData::default());
    };

    let mut headers = grid[header_idx].clone();
    while headers.last().is_some_and(|h| h.trim().is_empty()) {
        headers.pop();
    }
    let width = headers.len();

    let rows = grid[header_idx + 1..]
        .iter()
        .filter(|row| !is_blank(row))
        .map(|row| {
            let mut row = row.clone();
            row.resize(width, String::new());
            row
        })
        .filter(|row| !is_blank(row))
        .collect();

    Ok(ControlData { headers, rows })
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}
