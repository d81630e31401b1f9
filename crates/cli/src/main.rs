// skumap CLI - catalog-driven SKU mapping runs

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use skumap_engine::config::{
    CaseMode, CatalogColumns, CatalogSource, MapMode, OutputConfig, SalesColumns, SalesSource,
};
use skumap_engine::model::{field, MapResult, Table};
use skumap_engine::{MapConfig, MapError, MSKU_COLUMN, UNMAPPED};

use exit_codes::{
    EXIT_ERROR, EXIT_MAP_INVALID_CONFIG, EXIT_MAP_RUNTIME, EXIT_MAP_SCHEMA, EXIT_MAP_UNMAPPED,
    EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "skumap")]
#[command(about = "Reconcile seller SKUs against a master MSKU catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a sales file against a catalog, no config file needed
    #[command(after_help = "\
Examples:
  skumap map --catalog msku_master.csv --sales sales.xlsx -o mapped.csv
  skumap map --catalog msku_master.csv --sales sales.csv --threshold 0.9 --json
  skumap map --catalog sku_pairs.csv --sales sales.csv --mode exact-only --strict")]
    Map {
        /// Master catalog file (.csv, .tsv, or Excel)
        #[arg(long)]
        catalog: PathBuf,

        /// Sales file (.csv, .tsv, or Excel)
        #[arg(long)]
        sales: PathBuf,

        /// Similarity threshold for fuzzy matching, in (0, 1]
        #[arg(long, default_value_t = 0.8)]
        threshold: f64,

        /// Per-row resolution policy
        #[arg(long, value_enum, default_value_t = ModeArg::ExactThenFuzzy)]
        mode: ModeArg,

        /// Exact-match key normalization
        #[arg(long, value_enum, default_value_t = CaseArg::Insensitive)]
        case: CaseArg,

        /// Write the annotated sales table to this CSV file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write rows that resolved to UNMAPPED to this CSV file
        #[arg(long)]
        unmapped: Option<PathBuf>,

        /// Output JSON result to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON result to file
        #[arg(long)]
        output_json: Option<PathBuf>,

        /// Exit nonzero when any row is unmapped
        #[arg(long)]
        strict: bool,
    },

    /// Run a mapping from a TOML config file
    #[command(after_help = "\
Examples:
  skumap run daily.map.toml
  skumap run daily.map.toml --json
  skumap run daily.map.toml --output result.json")]
    Run {
        /// Path to the .map.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit nonzero when any row is unmapped
        #[arg(long)]
        strict: bool,
    },

    /// Validate a mapping config without running
    #[command(after_help = "\
Examples:
  skumap validate daily.map.toml")]
    Validate {
        /// Path to the .map.toml config file
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    ExactOnly,
    ExactThenFuzzy,
}

impl From<ModeArg> for MapMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::ExactOnly => MapMode::ExactOnly,
            ModeArg::ExactThenFuzzy => MapMode::ExactThenFuzzy,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CaseArg {
    Insensitive,
    Sensitive,
}

impl From<CaseArg> for CaseMode {
    fn from(case: CaseArg) -> Self {
        match case {
            CaseArg::Insensitive => CaseMode::Insensitive,
            CaseArg::Sensitive => CaseMode::Sensitive,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Map {
            catalog,
            sales,
            threshold,
            mode,
            case,
            output,
            unmapped,
            json,
            output_json,
            strict,
        } => cmd_map(
            catalog, sales, threshold, mode, case, output, unmapped, json, output_json, strict,
        ),
        Commands::Run { config, json, output, strict } => cmd_run(config, json, output, strict),
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_MAP_RUNTIME, message: msg.into(), hint: None }
    }

    fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }
}

impl From<MapError> for CliError {
    fn from(err: MapError) -> Self {
        let code = match &err {
            MapError::ConfigParse(_) | MapError::ConfigValidation(_) => EXIT_MAP_INVALID_CONFIG,
            MapError::MissingColumn { .. } => EXIT_MAP_SCHEMA,
            MapError::Io(_) => EXIT_MAP_RUNTIME,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

// ============================================================================
// map
// ============================================================================

fn cmd_map(
    catalog_path: PathBuf,
    sales_path: PathBuf,
    threshold: f64,
    mode: ModeArg,
    case: CaseArg,
    output: Option<PathBuf>,
    unmapped: Option<PathBuf>,
    json_output: bool,
    output_json: Option<PathBuf>,
    strict: bool,
) -> Result<(), CliError> {
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(CliError::args(format!(
            "--threshold must be in (0, 1], got {threshold}"
        )));
    }

    let config_name = sales_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sales".into());

    let config = MapConfig {
        name: config_name,
        mode: mode.into(),
        threshold,
        case: case.into(),
        catalog: CatalogSource {
            file: catalog_path.display().to_string(),
            columns: CatalogColumns::default(),
        },
        sales: SalesSource {
            file: sales_path.display().to_string(),
            columns: SalesColumns::default(),
        },
        output: OutputConfig {
            csv: output.map(|p| p.display().to_string()),
            unmapped: unmapped.map(|p| p.display().to_string()),
            json: output_json.map(|p| p.display().to_string()),
        },
    };

    run_mapping(&config, Path::new("."), json_output, None, strict)
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    strict: bool,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::runtime(format!("cannot read config: {e}")))?;

    let config = MapConfig::from_toml(&config_str)?;

    // Resolve file paths relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    run_mapping(&config, base_dir, json_output, output_file.as_deref(), strict)
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::runtime(format!("cannot read config: {e}")))?;

    let config = MapConfig::from_toml(&config_str)?;
    eprintln!(
        "valid: '{}' mode {}, threshold {}, case {}",
        config.name, config.mode, config.threshold, config.case,
    );
    Ok(())
}

// ============================================================================
// Shared run path
// ============================================================================

fn run_mapping(
    config: &MapConfig,
    base_dir: &Path,
    json_output: bool,
    extra_json_file: Option<&Path>,
    strict: bool,
) -> Result<(), CliError> {
    let catalog = load_input(base_dir, &config.catalog.file)?;
    let sales = load_input(base_dir, &config.sales.file)?;

    let result = skumap_engine::run(config, &catalog, &sales)?;

    write_outputs(&result, base_dir, config)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

    if let Some(path) = extra_json_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "mapped {} rows: {} exact, {} fuzzy ({} code, {} title), {} unmapped",
        s.total_rows, s.exact, s.fuzzy_code + s.fuzzy_title, s.fuzzy_code, s.fuzzy_title,
        s.unmapped,
    );

    if strict && s.unmapped > 0 {
        return Err(CliError {
            code: EXIT_MAP_UNMAPPED,
            message: format!("{} unmapped row(s) found (--strict)", s.unmapped),
            hint: None,
        });
    }

    Ok(())
}

fn load_input(base_dir: &Path, file: &str) -> Result<Table, CliError> {
    let path = base_dir.join(file);
    skumap_io::load_table(&path)
        .map_err(|e| CliError::runtime(format!("cannot load {}: {e}", path.display())))
}

fn write_outputs(result: &MapResult, base_dir: &Path, config: &MapConfig) -> Result<(), CliError> {
    if let Some(ref file) = config.output.csv {
        let path = base_dir.join(file);
        skumap_io::csv::export(&result.table, &path)
            .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref file) = config.output.unmapped {
        let path = base_dir.join(file);
        skumap_io::csv::export(&unmapped_rows(&result.table), &path)
            .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref file) = config.output.json {
        let path = base_dir.join(file);
        let json_str = serde_json::to_string_pretty(result)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        std::fs::write(&path, json_str)
            .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    Ok(())
}

/// Rows of the annotated table whose MSKU resolved to the sentinel.
fn unmapped_rows(table: &Table) -> Table {
    let msku_idx = table.column(MSKU_COLUMN);
    Table {
        headers: table.headers.clone(),
        rows: table
            .rows
            .iter()
            .filter(|row| msku_idx.is_some_and(|idx| field(row, idx) == UNMAPPED))
            .cloned()
            .collect(),
    }
}
