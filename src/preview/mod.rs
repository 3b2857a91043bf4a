//! Document preview
//!
//! PDFs are shown as they are. Word and Excel files are converted to a
//! temporary PDF first. Anything else, or a failed conversion, is handed
//! back to the UI so it can offer to open the file externally.

mod convert;

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

pub use convert::{convert_to_pdf, temp_pdf_path, WORD_CONVERTER_SCRIPT};

use crate::error::{Result, SgsstError};
use crate::folders::extension_of;
use crate::scripts::ScriptRunner;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConvertKind {
    Word,
    Spreadsheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Direct,
    Convert(ConvertKind),
    Unsupported,
}

/// Decide how a file is previewed from its extension alone
pub fn preview_kind(path: &Path) -> PreviewKind {
    match extension_of(path).as_str() {
        "pdf" => PreviewKind::Direct,
        "doc" | "docx" => PreviewKind::Convert(ConvertKind::Word),
        "xls" | "xlsx" => PreviewKind::Convert(ConvertKind::Spreadsheet),
        _ => PreviewKind::Unsupported,
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PreviewOutcome {
    #[serde(rename_all = "camelCase")]
    Ready {
        pdf_path: String,
        source_path: String,
        converted: bool,
    },
    #[serde(rename_all = "camelCase")]
    ConversionFailed { source_path: String, error: String },
    #[serde(rename_all = "camelCase")]
    Unsupported { source_path: String, extension: String },
}

/// Produce something the PDF viewer can show for `path`
///
/// Only a missing source is an error; conversion problems come back as
/// `ConversionFailed` with the tool's message.
pub fn prepare_preview(runner: &ScriptRunner, path: &Path, timeout: Duration) -> Result<PreviewOutcome> {
    if !path.is_file() {
        return Err(SgsstError::FileNotFound(path.to_string_lossy().to_string()));
    }
    let source_path = path.to_string_lossy().to_string();

    let outcome = match preview_kind(path) {
        PreviewKind::Direct => PreviewOutcome::Ready {
            pdf_path: source_path.clone(),
            source_path,
            converted: false,
        },
        PreviewKind::Convert(kind) => match convert_to_pdf(runner, kind, path, timeout) {
            Ok(pdf) => PreviewOutcome::Ready {
                pdf_path: pdf.to_string_lossy().to_string(),
                source_path,
                converted: true,
            },
            Err(e) => {
                log::error!("Preview conversion failed for {:?}: {}", path, e);
                PreviewOutcome::ConversionFailed {
                    source_path,
                    error: e.to_string(),
                }
            }
        },
        PreviewKind::Unsupported => PreviewOutcome::Unsupported {
            extension: extension_of(path),
            source_path,
        },
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_preview_dispatch() {
        let cases = [
            ("a.pdf", PreviewKind::Direct),
            ("a.PDF", PreviewKind::Direct),
            ("a.doc", PreviewKind::Convert(ConvertKind::Word)),
            ("a.DocX", PreviewKind::Convert(ConvertKind::Word)),
            ("a.xls", PreviewKind::Convert(ConvertKind::Spreadsheet)),
            ("a.xlsx", PreviewKind::Convert(ConvertKind::Spreadsheet)),
            ("a.pptx", PreviewKind::Unsupported),
            ("a.txt", PreviewKind::Unsupported),
            ("sin_extension", PreviewKind::Unsupported),
            ("a.pdf.zip", PreviewKind::Unsupported),
        ];
        for (name, expected) in cases {
            assert_eq!(preview_kind(Path::new(name)), expected, "{}", name);
        }
    }

    #[test]
    fn test_pdf_is_ready_without_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("informe.pdf");
        fs::write(&pdf, b"%PDF-1.4").unwrap();
        let runner = ScriptRunner::new("python3", dir.path());

        let outcome = prepare_preview(&runner, &pdf, Duration::from_secs(1)).unwrap();
        assert_eq!(
            outcome,
            PreviewOutcome::Ready {
                pdf_path: pdf.to_string_lossy().to_string(),
                source_path: pdf.to_string_lossy().to_string(),
                converted: false,
            }
        );
    }

    #[test]
    fn test_unsupported_and_failed_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptRunner::new("python3", dir.path());

        let txt = dir.path().join("notas.txt");
        fs::write(&txt, b"hola").unwrap();
        let outcome = prepare_preview(&runner, &txt, Duration::from_secs(1)).unwrap();
        assert!(matches!(outcome, PreviewOutcome::Unsupported { ref extension, .. } if extension == "txt"));

        // The converter script is absent, so conversion fails but the outcome is still returned
        let docx = dir.path().join("carta.docx");
        fs::write(&docx, b"PK").unwrap();
        let outcome = prepare_preview(&runner, &docx, Duration::from_secs(1)).unwrap();
        assert!(matches!(outcome, PreviewOutcome::ConversionFailed { .. }));

        assert!(prepare_preview(&runner, &dir.path().join("missing.pdf"), Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = PreviewOutcome::ConversionFailed {
            source_path: "/a.xlsx".to_string(),
            error: "Excel no responde".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "conversionFailed");
        assert_eq!(json["sourcePath"], "/a.xlsx");
    }
}
