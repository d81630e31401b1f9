//! Derived dataset builders — computed analyses layered on top of the
//! annotated sales table.

use std::collections::BTreeMap;

use serde_json::json;

use crate::model::{field, DerivedDataset, Table, MSKU_COLUMN, UNMAPPED};

/// Sales column driving the marketplace rollup, when present.
const MARKETPLACE_COLUMN: &str = "Marketplace";

/// Build the `msku_rollup.v1` derived dataset: row counts per resolved
/// MSKU, unmapped rows excluded, descending count then ascending MSKU.
pub fn build_msku_rollup(table: &Table) -> DerivedDataset {
    let mut dataset = DerivedDataset::new("msku_rollup");
    let Some(msku_idx) = table.column(MSKU_COLUMN) else {
        return dataset;
    };

    for (key, count) in sorted_counts(table, msku_idx, |v| v != UNMAPPED) {
        dataset.rows.push(json!({ "msku": key, "rows": count }));
    }

    dataset.enforce_limit();
    dataset
}

/// Build the `marketplace_rollup.v1` derived dataset: row counts per
/// marketplace. Empty when the sales table has no Marketplace column.
pub fn build_marketplace_rollup(table: &Table) -> DerivedDataset {
    let mut dataset = DerivedDataset::new("marketplace_rollup");
    let Some(idx) = table.column(MARKETPLACE_COLUMN) else {
        return dataset;
    };

    for (key, count) in sorted_counts(table, idx, |_| true) {
        dataset.rows.push(json!({ "marketplace": key, "rows": count }));
    }

    dataset.enforce_limit();
    dataset
}

/// Count non-empty values of one column, descending count then ascending
/// value. BTreeMap accumulation keeps ties deterministic.
fn sorted_counts(
    table: &Table,
    idx: usize,
    keep: impl Fn(&str) -> bool,
) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in &table.rows {
        let value = field(row, idx);
        if value.is_empty() || !keep(value) {
            continue;
        }
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }

    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}
