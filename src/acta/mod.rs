//! Meeting minutes (actas) for the Copasst and the coexistence committee
//!
//! The fixed template is read natively and shown as an editable grid.
//! Saving hands the edits to the generator script, which writes them into
//! a copy of the template so the original formatting survives.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, SgsstError};
use crate::extractors::{read_first_sheet, MergeRange};
use crate::scripts::{protocol, ScriptRunner, TempPayload};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActaKind {
    Copasst,
    Convivencia,
}

impl ActaKind {
    pub fn template_file(self) -> &'static str {
        match self {
            ActaKind::Copasst => "ACT-FO-029 Acta de Reunión Copasst Enero.xlsx",
            ActaKind::Convivencia => "ACT-FO-030 Acta de Reunión Comité de Convivencia.xlsx",
        }
    }

    pub fn generator_script(self) -> &'static str {
        match self {
            ActaKind::Copasst => "copasst_acta_generator.py",
            ActaKind::Convivencia => "convivencia_acta_generator.py",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ActaKind::Copasst => "copasst",
            ActaKind::Convivencia => "convivencia",
        }
    }
}

/// Template contents as shown in the editor
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ActaGrid {
    pub data: Vec<Vec<String>>,
    pub merges: Vec<MergeRange>,
}

impl ActaGrid {
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.data.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    /// Overwrite edited cells, growing the grid when an edit lies outside it
    pub fn apply_edits(&mut self, edits: &ActaEdits) {
        for ((row, col), value) in edits.iter() {
            if self.data.len() <= row {
                let width = self.data.first().map(Vec::len).unwrap_or(0);
                self.data.resize(row + 1, vec![String::new(); width]);
            }
            let cells = &mut self.data[row];
            if cells.len() <= col {
                cells.resize(col + 1, String::new());
            }
            cells[col] = value.to_string();
        }
    }
}

/// One edited cell as sent by the editor
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CellEdit {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

/// Pending edits keyed by (row, col); the last value for a cell wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActaEdits {
    cells: BTreeMap<(usize, usize), String>,
}

impl ActaEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        self.cells.insert((row, col), value.into());
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Edits in (row, col) order
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &str)> + '_ {
        self.cells.iter().map(|(pos, value)| (*pos, value.as_str()))
    }

    fn to_changes(&self) -> Vec<serde_json::Value> {
        self.iter()
            .map(|((row, col), value)| {
                json!({
                    "row": row,
                    "col": col,
                    "cell": cell_reference(row, col),
                    "value": value,
                })
            })
            .collect()
    }
}

impl FromIterator<CellEdit> for ActaEdits {
    fn from_iter<I: IntoIterator<Item = CellEdit>>(iter: I) -> Self {
        let mut edits = ActaEdits::new();
        for edit in iter {
            edits.set(edit.row, edit.col, edit.value);
        }
        edits
    }
}

/// Zero-based (row, col) to an A1 reference
pub fn cell_reference(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    let column: String = letters.into_iter().rev().collect();
    format!("{}{}", column, row + 1)
}

pub fn template_path(templates_dir: &Path, kind: ActaKind) -> PathBuf {
    templates_dir.join(kind.template_file())
}

/// Load the template grid for `kind`
pub fn load_template(templates_dir: &Path, kind: ActaKind) -> Result<ActaGrid> {
    let path = template_path(templates_dir, kind);
    if !path.is_file() {
        log::error!("Acta template missing: {:?}", path);
        return Err(SgsstError::FileNotFound(path.to_string_lossy().to_string()));
    }

    log::info!("Loading acta template {:?}", path);
    let sheet = read_first_sheet(&path)?;
    Ok(ActaGrid {
        data: sheet.to_grid(),
        merges: sheet.merges,
    })
}

/// Write the edited acta to `output` through the generator script
pub fn save_acta(
    runner: &ScriptRunner,
    templates_dir: &Path,
    kind: ActaKind,
    edits: &ActaEdits,
    output: &Path,
) -> Result<PathBuf> {
    let template = template_path(templates_dir, kind);
    if !template.is_file() {
        return Err(SgsstError::FileNotFound(template.to_string_lossy().to_string()));
    }

    log::info!("Saving {} acta with {} changes to {:?}", kind.label(), edits.len(), output);
    let payload = TempPayload::write(
        &format!("acta_{}", kind.label()),
        &json!({
            "changes": edits.to_changes(),
            "template": template.to_string_lossy(),
        }),
    )?;

    let script = kind.generator_script();
    let result = runner.run_json_lines(script, &[payload.path(), output])?;
    let written = protocol::require_str(script, &result, "documentPath")?;

    log::info!("Acta written to {}", written);
    Ok(PathBuf::from(written))
}
