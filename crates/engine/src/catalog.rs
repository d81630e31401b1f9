use std::collections::HashMap;

use crate::config::{CaseMode, CatalogColumns};
use crate::error::MapError;
use crate::model::{field, Candidate, CatalogIndex, Table};

/// Normalization for exact-match keys and probes: trim always, uppercase
/// under case-insensitive matching.
pub fn normalize(value: &str, case: CaseMode) -> String {
    let trimmed = value.trim();
    match case {
        CaseMode::Insensitive => trimmed.to_uppercase(),
        CaseMode::Sensitive => trimmed.to_string(),
    }
}

/// Build the catalog index from a catalog table.
///
/// The MSKU column must exist; title and SKU columns contribute nothing
/// when absent. Rows whose MSKU is empty after trimming are dropped from
/// the exact map and both pools. Exact keys are inserted in row order
/// (MSKU, then SKU, then title per row), so the last catalog row wins on
/// duplicate keys.
pub fn build_index(
    table: &Table,
    columns: &CatalogColumns,
    case: CaseMode,
) -> Result<CatalogIndex, MapError> {
    let msku_idx = table.column(&columns.msku).ok_or_else(|| MapError::MissingColumn {
        source: "catalog".into(),
        column: columns.msku.clone(),
    })?;
    let title_idx = table.column(&columns.title);
    let sku_idx = table.column(&columns.sku);

    let mut exact: HashMap<String, String> = HashMap::new();
    let mut code_pool = Vec::new();
    let mut title_pool = Vec::new();

    for row in &table.rows {
        let msku = field(row, msku_idx).trim();
        if msku.is_empty() {
            continue;
        }

        exact.insert(normalize(msku, case), msku.to_string());
        code_pool.push(Candidate { text: msku.to_string(), msku: msku.to_string() });

        if let Some(idx) = sku_idx {
            let sku = field(row, idx).trim();
            if !sku.is_empty() {
                exact.insert(normalize(sku, case), msku.to_string());
            }
        }

        if let Some(idx) = title_idx {
            let title = field(row, idx).trim();
            if !title.is_empty() {
                exact.insert(normalize(title, case), msku.to_string());
                title_pool.push(Candidate { text: title.to_string(), msku: msku.to_string() });
            }
        }
    }

    Ok(CatalogIndex { exact, code_pool, title_pool, case })
}
