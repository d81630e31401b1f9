use std::collections::HashMap;

use serde::Serialize;

use crate::config::{CaseMode, MapMode};
use crate::error::MapError;

/// Sentinel written to the MSKU column when no catalog entry matches.
pub const UNMAPPED: &str = "UNMAPPED";

/// Name of the column the driver adds to the sales table.
pub const MSKU_COLUMN: &str = "MSKU";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Row-oriented tabular data with named columns.
///
/// This is the shape the loading collaborator hands back for both the
/// catalog and the sales file, and the shape the driver returns. Rows may
/// be ragged; missing cells read as empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Resolve a header name to its column index (exact name match).
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Parse CSV text into a table. The first record is the header row.
    pub fn from_csv(data: &str) -> Result<Self, MapError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| MapError::Io(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| MapError::Io(e.to_string()))?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }
}

/// Field accessor tolerant of ragged rows; missing cells read as empty.
pub fn field(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

// ---------------------------------------------------------------------------
// Catalog index
// ---------------------------------------------------------------------------

/// One fuzzy-pool entry: the candidate text and the canonical MSKU it
/// resolves to. For the code pool `text == msku`; for the title pool
/// `text` is the product title.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub msku: String,
}

/// Lookup structure built once per catalog load, read-only afterwards.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    /// Normalized identifier → canonical MSKU. Last-write-wins on
    /// duplicate keys (catalog row order).
    pub exact: HashMap<String, String>,
    /// Pool A: MSKU codes, catalog order.
    pub code_pool: Vec<Candidate>,
    /// Pool B: product titles, catalog order. Empty when the catalog has
    /// no title column.
    pub title_pool: Vec<Candidate>,
    /// Normalization rule the exact keys were built with. Probes must use
    /// the same rule or false negatives occur.
    pub case: CaseMode,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// How a row's MSKU was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBucket {
    Exact,
    FuzzyCode,
    FuzzyTitle,
    Unmapped,
}

impl std::fmt::Display for MatchBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::FuzzyCode => write!(f, "fuzzy_code"),
            Self::FuzzyTitle => write!(f, "fuzzy_title"),
            Self::Unmapped => write!(f, "unmapped"),
        }
    }
}

/// The outcome for a single sales row. Total: every row gets exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub msku: String,
    pub bucket: MatchBucket,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    pub total_rows: usize,
    pub matched: usize,
    pub exact: usize,
    pub fuzzy_code: usize,
    pub fuzzy_title: usize,
    pub unmapped: usize,
    pub bucket_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapMeta {
    pub config_name: String,
    pub mode: MapMode,
    pub threshold: f64,
    pub case: CaseMode,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapResult {
    pub meta: MapMeta,
    pub summary: MapSummary,
    pub table: Table,
    pub derived: DerivedOutputs,
}

// ---------------------------------------------------------------------------
// Derived datasets
// ---------------------------------------------------------------------------

/// A computed dataset layered on top of the annotated table, serialized
/// as schema-versioned JSON rows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DerivedDataset {
    pub schema: String,
    pub version: u32,
    pub rows: Vec<serde_json::Value>,
    pub truncated: bool,
}

impl DerivedDataset {
    pub const MAX_ROWS: usize = 1000;

    pub fn new(schema: &str) -> Self {
        Self { schema: schema.into(), version: 1, rows: Vec::new(), truncated: false }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn enforce_limit(&mut self) {
        if self.rows.len() > Self::MAX_ROWS {
            self.rows.truncate(Self::MAX_ROWS);
            self.truncated = true;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DerivedOutputs {
    pub msku_rollup: DerivedDataset,
    pub marketplace_rollup: DerivedDataset,
}
