//! Loading source spreadsheets into a [`RawSheet`].
//!
//! Comma-delimited files are the primary input; `.xlsx` workbooks exported
//! from the same sheets are read from their first worksheet.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use csv::ReaderBuilder;
use log::debug;

use crate::domain::RawSheet;
use crate::error::SheetError;

/// Loads a sheet, choosing the reader from the file extension.
///
/// # Errors
/// Returns SheetError if the file is missing, unreadable, or of an
/// unsupported type.
pub fn load_sheet<P: AsRef<Path>>(path: P) -> Result<RawSheet, SheetError> {
    let path = path.as_ref();

    // Check if file exists
    if !path.exists() {
        return Err(SheetError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => load_csv(path),
        Some("xlsx") | Some("xlsm") => load_workbook(path),
        _ => Err(SheetError::UnsupportedType(path.display().to_string())),
    }
}

/// Reads every row of a comma-delimited file. Rows may differ in length.
fn load_csv(path: &Path) -> Result<RawSheet, SheetError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| SheetError::CannotRead(format!("{}: {}", path.display(), e)))?;

    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|e| {
            SheetError::CannotRead(format!("{} row {}: {}", path.display(), row_idx + 1, e))
        })?;
        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(RawSheet::new(rows))
}

/// Reads the first worksheet of an Excel workbook.
fn load_workbook(path: &Path) -> Result<RawSheet, SheetError> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| SheetError::CannotRead(format!("{}: {}", path.display(), e)))?;

    // Get the first worksheet
    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| SheetError::InvalidFormat("workbook has no sheets".to_string()))?;

    let range = workbook.worksheet_range(sheet_name).map_err(|e| {
        SheetError::CannotRead(format!("cannot read sheet '{}': {}", sheet_name, e))
    })?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    debug!(
        "Read {} rows from sheet '{}' of {}",
        rows.len(),
        sheet_name,
        path.display()
    );
    Ok(RawSheet::new(rows))
}

/// Renders a workbook cell the way it reads in a CSV export.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}
