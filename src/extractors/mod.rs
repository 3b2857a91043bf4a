//! Native document readers
//!
//! Only XLSX is read in-process (acta templates and the remisiones control
//! sheet); other formats go through the external scripts.

pub mod xlsx;

pub use xlsx::{parse_cell_ref, read_first_sheet, CellPos, MergeRange, SheetData};
