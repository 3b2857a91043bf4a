//! Decoding of script stdout
//!
//! Two shapes are in use: a single (possibly indented) JSON document, and
//! JSON lines where `log` messages precede one final `result` message.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SgsstError};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ScriptMessage {
    Log {
        message: String,
        #[serde(default)]
        level: Option<String>,
    },
    Result {
        payload: Value,
    },
}

/// Parse stdout holding one JSON document
///
/// Leading noise (warnings printed by libraries) is tolerated as long as
/// the document itself is the trailing `{...}` block.
pub fn parse_json_output(script: &str, stdout: &str) -> Result<Value> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(SgsstError::ScriptOutput {
            script: script.to_string(),
            message: "no output".to_string(),
        });
    }

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    // Scan candidate starts of the trailing object
    let candidates = trimmed.match_indices('{').map(|(i, _)| i);
    for start in candidates {
        if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..]) {
            if value.is_object() {
                return Ok(value);
            }
        }
    }

    Err(SgsstError::ScriptOutput {
        script: script.to_string(),
        message: format!("not JSON: {}", preview(trimmed)),
    })
}

/// Parse JSON-lines stdout, forwarding log lines and returning the result payload
pub fn parse_json_lines(script: &str, stdout: &str) -> Result<Value> {
    let mut result = None;

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match serde_json::from_str::<ScriptMessage>(line) {
            Ok(ScriptMessage::Log { message, level }) => forward_log(script, level.as_deref(), &message),
            Ok(ScriptMessage::Result { payload }) => result = Some(payload),
            Err(_) => log::debug!("[{}] {}", script, line),
        }
    }

    result.ok_or_else(|| SgsstError::ScriptOutput {
        script: script.to_string(),
        message: "no result message".to_string(),
    })
}

/// Turn `{"success": false, "error": ...}` into an error, pass anything else through
pub fn check_success(value: Value) -> Result<Value> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        if let Some(trace) = value.get("traceback").and_then(Value::as_str) {
            log::debug!("Script traceback:\n{}", trace);
        }
        log::error!("Script reported failure: {}", message);
        return Err(SgsstError::Tool(message));
    }
    Ok(value)
}

/// Read a string field, failing with a protocol error when absent
pub fn require_str(script: &str, value: &Value, key: &str) -> Result<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SgsstError::ScriptOutput {
            script: script.to_string(),
            message: format!("missing '{}'", key),
        })
}

fn forward_log(script: &str, level: Option<&str>, message: &str) {
    let level = match level.map(str::to_ascii_uppercase).as_deref() {
        Some("ERROR") | Some("CRITICAL") => log::Level::Error,
        Some("WARNING") | Some("WARN") => log::Level::Warn,
        Some("DEBUG") => log::Level::Debug,
        _ => log::Level::Info,
    };
    log::log!(level, "[{}] {}", script, message);
}

fn preview(text: &str) -> String {
    const MAX: usize = 200;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
