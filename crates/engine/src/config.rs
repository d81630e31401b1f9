use serde::{Deserialize, Serialize};

use crate::error::MapError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MapConfig {
    pub name: String,
    #[serde(default)]
    pub mode: MapMode,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub case: CaseMode,
    pub catalog: CatalogSource,
    pub sales: SalesSource,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Per-row resolution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapMode {
    ExactOnly,
    ExactThenFuzzy,
}

impl Default for MapMode {
    fn default() -> Self {
        Self::ExactThenFuzzy
    }
}

impl std::fmt::Display for MapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactOnly => write!(f, "exact_only"),
            Self::ExactThenFuzzy => write!(f, "exact_then_fuzzy"),
        }
    }
}

/// Normalization applied to exact-match keys and probes.
///
/// `Insensitive` (the default) trims and uppercases; `Sensitive` only
/// trims. Fuzzy scoring always works on trimmed, original-case text
/// regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    Insensitive,
    Sensitive,
}

impl Default for CaseMode {
    fn default() -> Self {
        Self::Insensitive
    }
}

impl std::fmt::Display for CaseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Insensitive => write!(f, "insensitive"),
            Self::Sensitive => write!(f, "sensitive"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources + column mappings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSource {
    pub file: String,
    #[serde(default)]
    pub columns: CatalogColumns,
}

/// Column names in the catalog table. Only `msku` is required to exist;
/// `title` and `sku` contribute nothing when absent from the table.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogColumns {
    #[serde(default = "default_msku_column")]
    pub msku: String,
    #[serde(default = "default_title_column")]
    pub title: String,
    #[serde(default = "default_sku_column")]
    pub sku: String,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        Self {
            msku: default_msku_column(),
            title: default_title_column(),
            sku: default_sku_column(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalesSource {
    pub file: String,
    #[serde(default)]
    pub columns: SalesColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalesColumns {
    #[serde(default = "default_sku_column")]
    pub sku: String,
}

impl Default for SalesColumns {
    fn default() -> Self {
        Self { sku: default_sku_column() }
    }
}

fn default_msku_column() -> String {
    "MSKU".into()
}

fn default_title_column() -> String {
    "Title".into()
}

fn default_sku_column() -> String {
    "SKU".into()
}

fn default_threshold() -> f64 {
    0.8
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Annotated sales table.
    #[serde(default)]
    pub csv: Option<String>,
    /// Rows whose MSKU resolved to the sentinel.
    #[serde(default)]
    pub unmapped: Option<String>,
    /// Full result (meta + summary + table + derived) as JSON.
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MapConfig {
    pub fn from_toml(input: &str) -> Result<Self, MapError> {
        let config: MapConfig =
            toml::from_str(input).map_err(|e| MapError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MapError> {
        if self.name.trim().is_empty() {
            return Err(MapError::ConfigValidation("name must not be empty".into()));
        }

        // τ ∈ (0, 1]
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(MapError::ConfigValidation(format!(
                "threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
