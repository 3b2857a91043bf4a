use std::fs;
use std::io::{Read, Seek};
use std::path::Path;

use serde::{Deserialize, Serialize};
use xml::attribute::OwnedAttribute;
use xml::reader::{EventReader, XmlEvent};
use zip::ZipArchive;

use crate::error::{Result, SgsstError};

/// Excel's last column (XFD)
pub const MAX_COLUMNS: usize = 16_384;
pub const MAX_ROWS: usize = 1_048_576;

/// Upper bound on the cells of a dense grid
pub const MAX_GRID_CELLS: usize = 1_000_000;

/// Zero-based cell coordinate
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellPos {
    pub r: usize,
    pub c: usize,
}

/// Merged block, start and end inclusive
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub s: CellPos,
    pub e: CellPos,
}

/// Non-empty cells and merges of one worksheet
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SheetData {
    pub cells: Vec<(CellPos, String)>,
    pub merges: Vec<MergeRange>,
}

impl SheetData {
    /// Dense grid covering every cell and merge, empty strings for blanks
    ///
    /// Merges are ignored when they would stretch the grid past
    /// [`MAX_GRID_CELLS`]; rows beyond that budget are cut off.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        self.grid_within(MAX_GRID_CELLS)
    }

    fn grid_within(&self, max_cells: usize) -> Vec<Vec<String>> {
        let (cell_rows, cell_cols) = extent(self.cells.iter().map(|(p, _)| *p));
        let (merge_rows, merge_cols) = extent(self.merges.iter().map(|m| m.e));

        let (mut rows, mut cols) = (cell_rows.max(merge_rows), cell_cols.max(merge_cols));
        if rows.saturating_mul(cols) > max_cells {
            log::warn!("Merged ranges span {}x{} cells; using cell extent", rows, cols);
            (rows, cols) = (cell_rows, cell_cols);
        }
        if rows.saturating_mul(cols) > max_cells {
            let kept = max_cells / cols.max(1);
            log::warn!("Sheet has {} rows of {} columns; keeping {}", rows, cols, kept);
            rows = kept;
        }

        let mut grid = vec![vec![String::new(); cols]; rows];
        for (pos, value) in &self.cells {
            if pos.r < rows && pos.c < cols {
                grid[pos.r][pos.c] = value.clone();
            }
        }
        grid
    }
}

/// Rows and columns needed to hold every position
fn extent(positions: impl Iterator<Item = CellPos>) -> (usize, usize) {
    positions.fold((0, 0), |(rows, cols), p| (rows.max(p.r + 1), cols.max(p.c + 1)))
}

/// Read the first worksheet of an XLSX workbook
///
/// XLSX files are ZIP archives containing XML files:
/// - xl/workbook.xml lists the sheets in tab order, resolved to part names
///   through xl/_rels/workbook.xml.rels
/// - xl/sharedStrings.xml holds the string table referenced by `t="s"` cells
/// - xl/worksheets/sheetN.xml holds cell values and merged ranges
pub fn read_first_sheet(path: &Path) -> Result<SheetData> {
    let file = fs::File::open(path)
        .map_err(|_| SgsstError::FileNotFound(path.to_string_lossy().to_string()))?;
    let mut archive = ZipArchive::new(file)?;

    let shared = match read_entry(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let sheet_name = first_sheet_name(&mut archive)?
        .ok_or_else(|| SgsstError::Spreadsheet(format!("no worksheet in {}", path.display())))?;
    let xml = read_entry(&mut archive, &sheet_name)?
        .ok_or_else(|| SgsstError::Spreadsheet(format!("missing {} in {}", sheet_name, path.display())))?;

    let sheet = parse_sheet(&xml, &shared)?;
    log::debug!(
        "Read {} cells and {} merges from {:?}",
        sheet.cells.len(),
        sheet.merges.len(),
        path
    );
    Ok(sheet)
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

/// Part name of the first tab, falling back to the lowest-numbered
/// worksheet when the workbook part or its relationships are missing
fn first_sheet_name<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Option<String>> {
    if let Some(target) = first_sheet_target(archive)? {
        if archive.by_name(&target).is_ok() {
            return Ok(Some(target));
        }
        log::debug!("Workbook points at missing part {}", target);
    }
    Ok(lowest_numbered_sheet(archive))
}

fn first_sheet_target<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Option<String>> {
    let Some(workbook) = read_entry(archive, "xl/workbook.xml")? else {
        return Ok(None);
    };
    let Some(rels) = read_entry(archive, "xl/_rels/workbook.xml.rels")? else {
        return Ok(None);
    };

    let Some(rel_id) = first_attr_of(&workbook, "sheet", "id")? else {
        return Ok(None);
    };

    for event in EventReader::from_str(&rels) {
        if let XmlEvent::StartElement { name, attributes, .. } = event.map_err(xml_error)? {
            if name.local_name == "Relationship" && attr(&attributes, "Id") == Some(rel_id.as_str()) {
                return Ok(attr(&attributes, "Target").map(resolve_target));
            }
        }
    }
    Ok(None)
}

/// Attribute `key` of the first `element` in document order
fn first_attr_of(xml: &str, element: &str, key: &str) -> Result<Option<String>> {
    for event in EventReader::from_str(xml) {
        if let XmlEvent::StartElement { name, attributes, .. } = event.map_err(xml_error)? {
            if name.local_name == element {
                return Ok(attr(&attributes, key).map(str::to_string));
            }
        }
    }
    Ok(None)
}

/// Relationship targets are relative to `xl/` unless absolute
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn lowest_numbered_sheet<R: Read + Seek>(archive: &ZipArchive<R>) -> Option<String> {
    let mut sheets: Vec<&str> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .collect();
    // sheet2.xml must not sort before sheet10.xml by accident
    sheets.sort_by_key(|n| {
        n.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    sheets.first().map(|s| s.to_string())
}

/// Text of every `<si>` entry, rich-text runs concatenated
fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    let mut in_phonetic = false;

    for event in EventReader::from_str(xml) {
        match event.map_err(xml_error)? {
            XmlEvent::StartElement { name, .. } => match name.local_name.as_str() {
                "si" => current.clear(),
                "t" => in_t = true,
                "rPh" => in_phonetic = true,
                _ => {}
            },
            XmlEvent::EndElement { name } => match name.local_name.as_str() {
                "si" => strings.push(std::mem::take(&mut current)),
                "t" => in_t = false,
                "rPh" => in_phonetic = false,
                _ => {}
            },
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text)
                if in_t && !in_phonetic =>
            {
                current.push_str(&text);
            }
            _ => {}
        }
    }

    Ok(strings)
}

#[derive(Default)]
struct PendingCell {
    pos: CellPos,
    kind: Option<String>,
    value: String,
    inline: String,
}

fn parse_sheet(xml: &str, shared: &[String]) -> Result<SheetData> {
    let mut sheet = SheetData::default();
    let mut row = 0usize;
    let mut next_col = 0usize;
    let mut cell: Option<PendingCell> = None;
    let mut in_v = false;
    let mut in_inline = false;
    let mut in_t = false;

    for event in EventReader::from_str(xml) {
        match event.map_err(xml_error)? {
            XmlEvent::StartElement { name, attributes, .. } => match name.local_name.as_str() {
                "row" => {
                    row = attr(&attributes, "r")
                        .and_then(|r| r.parse::<usize>().ok())
                        .map(|r| r.saturating_sub(1))
                        .unwrap_or(row);
                    next_col = 0;
                }
                "c" => {
                    let pos = attr(&attributes, "r")
                        .and_then(parse_cell_ref)
                        .unwrap_or(CellPos { r: row, c: next_col });
                    next_col = pos.c + 1;
                    cell = Some(PendingCell {
                        pos,
                        kind: attr(&attributes, "t").map(str::to_string),
                        ..Default::default()
                    });
                }
                "v" => in_v = true,
                "is" => in_inline = true,
                "t" => in_t = true,
                "mergeCell" => {
                    if let Some(range) = attr(&attributes, "ref").and_then(parse_range) {
                        sheet.merges.push(range);
                    }
                }
                _ => {}
            },
            XmlEvent::EndElement { name } => match name.local_name.as_str() {
                "row" => row += 1,
                "v" => in_v = false,
                "is" => in_inline = false,
                "t" => in_t = false,
                "c" => {
                    if let Some(done) = cell.take() {
                        let value = resolve_value(&done, shared);
                        if !value.is_empty() {
                            sheet.cells.push((done.pos, value));
                        }
                    }
                }
                _ => {}
            },
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text) => {
                if let Some(c) = cell.as_mut() {
                    if in_v {
                        c.value.push_str(&text);
                    } else if in_inline && in_t {
                        c.inline.push_str(&text);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(sheet)
}

fn resolve_value(cell: &PendingCell, shared: &[String]) -> String {
    match cell.kind.as_deref() {
        Some("s") => cell
            .value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i).cloned())
            .unwrap_or_default(),
        Some("inlineStr") => cell.inline.clone(),
        Some("b") => match cell.value.trim() {
            "1" => "TRUE".to_string(),
            "0" => "FALSE".to_string(),
            other => other.to_string(),
        },
        _ => cell.value.clone(),
    }
}

fn attr<'a>(attributes: &'a [OwnedAttribute], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name.local_name == key)
        .map(|a| a.value.as_str())
}

/// `"AB3"` to row 2, column 27; `None` outside A1:XFD1048576
pub fn parse_cell_ref(reference: &str) -> Option<CellPos> {
    let reference = reference.trim().trim_start_matches('$');
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let letters = letters.trim_end_matches('$');
    if letters.is_empty() || letters.len() > 3 || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let col = letters
        .chars()
        .fold(0usize, |acc, ch| acc * 26 + (ch.to_ascii_uppercase() as usize - 'A' as usize + 1));
    let row: usize = digits.parse().ok()?;
    if row == 0 || row > MAX_ROWS || col > MAX_COLUMNS {
        return None;
    }
    Some(CellPos { r: row - 1, c: col - 1 })
}

/// `"A1:C2"`; a single reference is a one-cell range
fn parse_range(range: &str) -> Option<MergeRange> {
    match range.split_once(':') {
        Some((start, end)) => Some(MergeRange {
            s: parse_cell_ref(start)?,
            e: parse_cell_ref(end)?,
        }),
        None => {
            let pos = parse_cell_ref(range)?;
            Some(MergeRange { s: pos, e: pos })
        }
    }
}

fn xml_error(e: xml::reader::Error) -> SgsstError {
    SgsstError::Spreadsheet(e.to_string())
}
