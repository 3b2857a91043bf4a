//! Error types shared by the core modules
//!
//! Command handlers turn these into plain strings for the frontend.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SgsstError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No configuration or path found for company: {0}")]
    NoCompanyConfig(String),

    #[error("No structure found for company: {0}")]
    NoStructure(String),

    #[error("Invalid submodule name format: {0}")]
    InvalidSubmodule(String),

    #[error("Path not found for module: {module}, submodule: {submodule} (code: {code})")]
    SubmoduleNotFound {
        module: String,
        submodule: String,
        code: String,
    },

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to launch '{program}': {message}")]
    ScriptSpawn { program: String, message: String },

    #[error("Script '{script}' exited with status {status}: {stderr}")]
    ScriptExit {
        script: String,
        status: String,
        stderr: String,
    },

    #[error("Script '{script}' timed out after {secs}s and was terminated")]
    ScriptTimeout { script: String, secs: u64 },

    #[error("Script '{script}' returned malformed output: {message}")]
    ScriptOutput { script: String, message: String },

    /// Error text reported by the external tool itself, passed through verbatim
    #[error("{0}")]
    Tool(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Unknown company: {0}")]
    UnknownCompany(String),

    #[error("Not supported on this platform: {0}")]
    Unsupported(String),

    #[error("State error: {0}")]
    State(String),
}

impl From<zip::result::ZipError> for SgsstError {
    fn from(e: zip::result::ZipError) -> Self {
        SgsstError::Spreadsheet(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SgsstError>;
