//! Work accident investigation
//!
//! The FURAT report PDF is parsed by `accident_processor.py`; the
//! investigation form is filled by `accident_report_generator.py`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Result, SgsstError};
use crate::scripts::{protocol, ScriptRunner, TempPayload};

pub const PROCESSOR_SCRIPT: &str = "accident_processor.py";
pub const REPORT_SCRIPT: &str = "accident_report_generator.py";

/// Name of the event the desktop shell emits for [`Progress`]
pub const PROGRESS_EVENT: &str = "accident-processing-progress";

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Progress {
    pub percentage: u8,
    pub message: String,
}

impl Progress {
    fn new(percentage: u8, message: &str) -> Self {
        Self {
            percentage,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AccidentAnalysis {
    pub data: Map<String, Value>,
    pub analysis: Value,
    pub metadata: Value,
}

/// Extract the accident data from a report PDF
///
/// `on_progress` is called at start, while the script runs and once the
/// output has been parsed.
pub fn process_accident_pdf<F>(
    runner: &ScriptRunner,
    pdf: &Path,
    company: &str,
    context: &str,
    mut on_progress: F,
) -> Result<AccidentAnalysis>
where
    F: FnMut(Progress),
{
    if !pdf.is_file() {
        return Err(SgsstError::FileNotFound(pdf.to_string_lossy().to_string()));
    }

    on_progress(Progress::new(10, "Iniciando procesamiento del PDF..."));
    log::info!("Processing accident report {:?} for {}", pdf, company);

    on_progress(Progress::new(40, "Extrayendo datos del accidente..."));
    let company = company.trim().to_uppercase();
    let args = [pdf.as_os_str(), OsStr::new(&company), OsStr::new(context)];
    let value = runner.run_json(PROCESSOR_SCRIPT, &args)?;

    on_progress(Progress::new(90, "Analizando resultados..."));
    let analysis: AccidentAnalysis = serde_json::from_value(value)?;
    log::info!("Accident report parsed: {} fields", analysis.data.len());

    on_progress(Progress::new(100, "Procesamiento completado"));
    Ok(analysis)
}

/// Fill the investigation form; returns the written document
pub fn generate_accident_report(
    runner: &ScriptRunner,
    data: &Map<String, Value>,
    company: &str,
) -> Result<PathBuf> {
    let payload = TempPayload::write(
        "accident_report",
        &json!({
            "data": data,
            "empresa": company.trim().to_uppercase(),
        }),
    )?;

    log::info!("Generating accident report for {}", company);
    let value = runner.run_json(REPORT_SCRIPT, &[payload.path()])?;
    let path = protocol::require_str(REPORT_SCRIPT, &value, "documentPath")?;
    log::info!("Accident report written to {}", path);
    Ok(PathBuf::from(path))
}
