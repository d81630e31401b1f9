// Excel file import (xlsx, xls, xlsb, ods)
//
// Import only: the annotated output of a mapping run is CSV, so there is
// no Excel export path.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use skumap_engine::Table;

/// Import the first worksheet of an Excel file.
pub fn import(path: &Path) -> Result<Table, String> {
    import_sheet(path, None)
}

/// Import a worksheet by name, or the first one when `sheet` is `None`.
/// The first row of the used range becomes the header row.
pub fn import_sheet(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err("Excel file contains no sheets".to_string());
    }

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|n| n.as_str() == name)
            .cloned()
            .ok_or_else(|| format!("sheet '{name}' not found"))?,
        None => sheet_names[0].clone(),
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Ok(Table::new(Vec::new())),
    };

    let mut table = Table::new(headers);
    for row in rows {
        table.rows.push(row.iter().map(cell_to_string).collect());
    }

    Ok(table)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Format nicely: integers without decimals
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        Data::Error(e) => format!("#{:?}", e),
        // Raw serial value; SKU/quantity columns are never dates, and
        // pass-through columns keep whatever the file held
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
