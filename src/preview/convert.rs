use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use super::ConvertKind;
use crate::error::{Result, SgsstError};
use crate::scripts::{protocol, ScriptRunner};

pub const WORD_CONVERTER_SCRIPT: &str = "convert_docx_to_pdf.py";

/// Convert an Office document to a PDF in the temp directory
pub fn convert_to_pdf(
    runner: &ScriptRunner,
    kind: ConvertKind,
    source: &Path,
    timeout: Duration,
) -> Result<PathBuf> {
    if !source.is_file() {
        return Err(SgsstError::FileNotFound(source.to_string_lossy().to_string()));
    }

    let pdf = match kind {
        ConvertKind::Word => convert_word(runner, source)?,
        ConvertKind::Spreadsheet => convert_spreadsheet(source, timeout)?,
    };
    validate_pdf(&pdf)?;

    log::info!("Converted {:?} to {:?}", source, pdf);
    Ok(pdf)
}

/// Run the Word converter script
///
/// Success arrives on stdout; failures are printed as JSON on stderr
/// with a non-zero exit.
fn convert_word(runner: &ScriptRunner, source: &Path) -> Result<PathBuf> {
    let output = runner.run(WORD_CONVERTER_SCRIPT, &[source])?;

    if !output.success() {
        let reported = protocol::parse_json_output(WORD_CONVERTER_SCRIPT, &output.stderr)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));
        return Err(match reported {
            Some(message) => SgsstError::Tool(message),
            None => SgsstError::ScriptExit {
                script: WORD_CONVERTER_SCRIPT.to_string(),
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            },
        });
    }

    let value = protocol::parse_json_output(WORD_CONVERTER_SCRIPT, &output.stdout)?;
    let value = protocol::check_success(value)?;
    let pdf_path = protocol::require_str(WORD_CONVERTER_SCRIPT, &value, "pdf_path")?;
    Ok(PathBuf::from(pdf_path))
}

/// Export the first workbook view through Excel COM automation
#[cfg(target_os = "windows")]
fn convert_spreadsheet(source: &Path, timeout: Duration) -> Result<PathBuf> {
    use std::process::Command;

    let pdf = temp_pdf_path(source);
    let script = excel_export_script(source, &pdf);

    let mut cmd = Command::new("powershell");
    cmd.args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command", &script]);
    let output = crate::scripts::run_command(cmd, "Excel PDF export", Some(timeout))?;

    if !output.success() {
        let message = output.stderr.trim();
        return Err(SgsstError::Tool(if message.is_empty() {
            format!("Excel export failed ({})", output.status)
        } else {
            message.to_string()
        }));
    }
    Ok(pdf)
}

#[cfg(not(target_os = "windows"))]
fn convert_spreadsheet(source: &Path, _timeout: Duration) -> Result<PathBuf> {
    log::warn!("Spreadsheet conversion requested on a non-Windows host: {:?}", source);
    Err(SgsstError::Unsupported(
        "spreadsheet to PDF conversion requires Microsoft Excel on Windows".to_string(),
    ))
}

/// PowerShell that opens `source` read-only and exports it as PDF
pub(crate) fn excel_export_script(source: &Path, pdf: &Path) -> String {
    format!(
        r#"
$ErrorActionPreference = 'Stop'
$excel = $null
try {{
    $excel = New-Object -ComObject Excel.Application
    $excel.Visible = $false
    $excel.DisplayAlerts = $false
    $workbook = $excel.Workbooks.Open('{}', 0, $true)
    $workbook.ExportAsFixedFormat(0, '{}')
    $workbook.Close($false)
}} catch {{
    [Console]::Error.WriteLine($_.Exception.Message)
    exit 1
}} finally {{
    if ($excel) {{
        $excel.Quit()
        [void][System.Runtime.InteropServices.Marshal]::ReleaseComObject($excel)
    }}
}}
"#,
        ps_quote(&source.to_string_lossy()),
        ps_quote(&pdf.to_string_lossy())
    )
}

/// Escape text for a single-quoted PowerShell string
fn ps_quote(text: &str) -> String {
    text.replace('\'', "''")
}

/// `<temp>/<stem>_<8 hex>.pdf`
pub fn temp_pdf_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let id = Uuid::new_v4().simple().to_string();
    std::env::temp_dir().join(format!("{}_{}.pdf", stem, &id[..8]))
}

fn validate_pdf(path: &Path) -> Result<()> {
    let mut file = fs::File::open(path).map_err(|_| {
        SgsstError::Tool(format!("The conversion did not create {}", path.display()))
    })?;
    let mut header = [0u8; 5];
    if file.read_exact(&mut header).is_err() || &header != b"%PDF-" {
        return Err(SgsstError::Tool(format!("{} is not a valid PDF", path.display())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_pdf_path_shape() {
        let path = temp_pdf_path(Path::new("/docs/Acta Enero.docx"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Acta Enero_"));
        assert!(name.ends_with(".pdf"));
        let hex = &name["Acta Enero_".len()..name.len() - 4];
        assert_eq!(hex.len(), 8);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(path.parent().unwrap(), std::env::temp_dir());
    }

    #[test]
    fn test_excel_script_quotes_paths() {
        let script = excel_export_script(Path::new(r"C:\Actas\O'Brien.xlsx"), Path::new(r"C:\Temp\o.pdf"));
        assert!(script.contains(r"Workbooks.Open('C:\Actas\O''Brien.xlsx', 0, $true)"));
        assert!(script.contains(r"ExportAsFixedFormat(0, 'C:\Temp\o.pdf')"));
    }

    #[test]
    fn test_validate_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.pdf");
        fs::write(&good, b"%PDF-1.7\n...").unwrap();
        assert!(validate_pdf(&good).is_ok());

        let bad = dir.path().join("b.pdf");
        fs::write(&bad, b"PK\x03\x04").unwrap();
        assert!(validate_pdf(&bad).is_err());
        assert!(validate_pdf(&dir.path().join("missing.pdf")).is_err());
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_spreadsheet_unsupported_off_windows() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptRunner::new("python3", dir.path());
        let source = dir.path().join("acta.xlsx");
        fs::write(&source, b"PK").unwrap();

        let err = convert_to_pdf(&runner, ConvertKind::Spreadsheet, &source, Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, SgsstError::Unsupported(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_word_conversion_reads_stdout_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("out.pdf");
        fs::write(&pdf, b"%PDF-1.4 test").unwrap();
        let source = dir.path().join("carta.docx");
        fs::write(&source, b"PK").unwrap();

        fs::write(
            dir.path().join(WORD_CONVERTER_SCRIPT),
            format!("echo '{{\"success\": true, \"pdf_path\": \"{}\"}}'\n", pdf.display()),
        )
        .unwrap();
        let runner = ScriptRunner::new("sh", dir.path());
        let converted = convert_to_pdf(&runner, ConvertKind::Word, &source, Duration::from_secs(1)).unwrap();
        assert_eq!(converted, pdf);

        fs::write(
            dir.path().join(WORD_CONVERTER_SCRIPT),
            "echo '{\"success\": false, \"error\": \"Word no esta instalado\"}' >&2\nexit 1\n",
        )
        .unwrap();
        let err = convert_to_pdf(&runner, ConvertKind::Word, &source, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.to_string(), "Word no esta instalado");
    }
}
