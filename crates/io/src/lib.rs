//! `skumap-io` — loading collaborator for the mapping engine.
//!
//! Reads delimited text and Excel files into the engine's row-oriented
//! [`Table`], and writes annotated tables back out as CSV.

use std::path::Path;

use skumap_engine::Table;

pub mod csv;
pub mod xlsx;

/// Load a table from a file, dispatching on extension.
///
/// `.csv` is delimiter-sniffed, `.tsv` is tab-separated, the Excel
/// family goes through calamine. Anything else is an error.
pub fn load_table(path: &Path) -> Result<Table, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => csv::import(path),
        "tsv" => csv::import_tsv(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => xlsx::import(path),
        "" => Err(format!("cannot infer format of {}: no extension", path.display())),
        other => Err(format!("unsupported file format: .{other}")),
    }
}
