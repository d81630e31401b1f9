use std::collections::HashMap;

use crate::catalog::build_index;
use crate::config::{MapConfig, MapMode, SalesColumns};
use crate::derived::{build_marketplace_rollup, build_msku_rollup};
use crate::error::MapError;
use crate::matcher::{match_exact, match_fuzzy};
use crate::model::{
    field, CatalogIndex, DerivedOutputs, MapMeta, MapResult, MapSummary, MatchBucket, Resolution,
    Table, MSKU_COLUMN, UNMAPPED,
};

/// Run reconciliation per config: build the catalog index, annotate the
/// sales table, compute summary and derived datasets.
///
/// Fail-fast: catalog schema errors surface before the sales table is
/// touched, and the sales SKU column is validated before any row is
/// resolved.
pub fn run(config: &MapConfig, catalog: &Table, sales: &Table) -> Result<MapResult, MapError> {
    let index = build_index(catalog, &config.catalog.columns, config.case)?;
    let (table, summary) =
        annotate(&index, sales, &config.sales.columns, config.mode, config.threshold)?;

    let derived = DerivedOutputs {
        msku_rollup: build_msku_rollup(&table),
        marketplace_rollup: build_marketplace_rollup(&table),
    };

    Ok(MapResult {
        meta: MapMeta {
            config_name: config.name.clone(),
            mode: config.mode,
            threshold: config.threshold,
            case: config.case,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        table,
        derived,
    })
}

/// Annotate a copy of the sales table with the resolved MSKU column.
///
/// An existing MSKU column is overwritten in place; otherwise the column
/// is appended. No column is removed or renamed, and output row order is
/// input row order.
pub fn annotate(
    index: &CatalogIndex,
    sales: &Table,
    columns: &SalesColumns,
    mode: MapMode,
    threshold: f64,
) -> Result<(Table, MapSummary), MapError> {
    let sku_idx = sales.column(&columns.sku).ok_or_else(|| MapError::MissingColumn {
        source: "sales".into(),
        column: columns.sku.clone(),
    })?;

    let mut table = sales.clone();
    let msku_idx = match table.column(MSKU_COLUMN) {
        Some(idx) => idx,
        None => {
            table.headers.push(MSKU_COLUMN.to_string());
            table.headers.len() - 1
        }
    };

    let mut buckets: Vec<MatchBucket> = Vec::with_capacity(table.rows.len());
    for row in &mut table.rows {
        let resolution = resolve_sku(index, field(row, sku_idx), mode, threshold);
        if row.len() <= msku_idx {
            row.resize(msku_idx + 1, String::new());
        }
        row[msku_idx] = resolution.msku;
        buckets.push(resolution.bucket);
    }

    Ok((table, compute_summary(&buckets)))
}

/// Resolve one SKU under the active mode. Total: always yields exactly
/// one resolution, never an error.
pub fn resolve_sku(
    index: &CatalogIndex,
    sku: &str,
    mode: MapMode,
    threshold: f64,
) -> Resolution {
    if let Some(msku) = match_exact(index, sku) {
        return Resolution { msku: msku.to_string(), bucket: MatchBucket::Exact };
    }

    if mode == MapMode::ExactThenFuzzy {
        if let Some(hit) = match_fuzzy(index, sku, threshold) {
            return Resolution { msku: hit.msku.to_string(), bucket: hit.bucket };
        }
    }

    Resolution { msku: UNMAPPED.to_string(), bucket: MatchBucket::Unmapped }
}

/// Tally per-bucket counts into the run summary.
pub fn compute_summary(buckets: &[MatchBucket]) -> MapSummary {
    let mut bucket_counts: HashMap<String, usize> = HashMap::new();
    let mut exact = 0;
    let mut fuzzy_code = 0;
    let mut fuzzy_title = 0;
    let mut unmapped = 0;

    for bucket in buckets {
        *bucket_counts.entry(bucket.to_string()).or_insert(0) += 1;

        match bucket {
            MatchBucket::Exact => exact += 1,
            MatchBucket::FuzzyCode => fuzzy_code += 1,
            MatchBucket::FuzzyTitle => fuzzy_title += 1,
            MatchBucket::Unmapped => unmapped += 1,
        }
    }

    MapSummary {
        total_rows: buckets.len(),
        matched: exact + fuzzy_code + fuzzy_title,
        exact,
        fuzzy_code,
        fuzzy_title,
        unmapped,
        bucket_counts,
    }
}
