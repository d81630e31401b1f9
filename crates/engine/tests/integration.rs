use std::path::PathBuf;

use skumap_engine::catalog::build_index;
use skumap_engine::config::{CaseMode, CatalogColumns, MapConfig, MapMode, SalesColumns};
use skumap_engine::model::{field, MatchBucket, Table};
use skumap_engine::resolve::{annotate, resolve_sku, run};
use skumap_engine::{MapError, MSKU_COLUMN, UNMAPPED};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_table(name: &str) -> Table {
    let path = fixtures_dir().join(name);
    let data = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    Table::from_csv(&data).unwrap()
}

fn fixture_config(name: &str) -> MapConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join(name)).unwrap();
    MapConfig::from_toml(&toml).unwrap()
}

fn msku_values(table: &Table) -> Vec<String> {
    let idx = table.column(MSKU_COLUMN).expect("annotated table has MSKU column");
    table.rows.iter().map(|r| field(r, idx).to_string()).collect()
}

// -------------------------------------------------------------------------
// Fixture run
// -------------------------------------------------------------------------

#[test]
fn basic_fixture_buckets() {
    let config = fixture_config("basic.map.toml");
    let catalog = fixture_table("msku_master.csv");
    let sales = fixture_table("sales.csv");

    let result = run(&config, &catalog, &sales).unwrap();

    assert_eq!(
        msku_values(&result.table),
        vec!["AB-100", "AB-100", "AB-100", "CD-200", UNMAPPED, "EF-300"]
    );

    let s = &result.summary;
    assert_eq!(s.total_rows, 6);
    assert_eq!(s.exact, 3); // AB-100, " ab-100 ", EF-300
    assert_eq!(s.fuzzy_code, 1); // AB100
    assert_eq!(s.fuzzy_title, 1); // Red Widget Delux
    assert_eq!(s.unmapped, 1); // Totally Unrelated
    assert_eq!(s.matched, 5);
}

#[test]
fn basic_fixture_preserves_columns_and_order() {
    let config = fixture_config("basic.map.toml");
    let catalog = fixture_table("msku_master.csv");
    let sales = fixture_table("sales.csv");

    let result = run(&config, &catalog, &sales).unwrap();

    // Input columns untouched, MSKU appended last
    assert_eq!(
        result.table.headers,
        vec!["SKU", "Quantity", "Date", "Marketplace", "Order ID", "Event Type", MSKU_COLUMN]
    );
    // Row order matches input
    let order_idx = result.table.column("Order ID").unwrap();
    let orders: Vec<&str> = result.table.rows.iter().map(|r| field(r, order_idx)).collect();
    assert_eq!(orders, vec!["ORD-1", "ORD-2", "ORD-3", "ORD-4", "ORD-5", "ORD-6"]);
}

#[test]
fn derived_rollups_from_fixture() {
    let config = fixture_config("basic.map.toml");
    let result = run(&config, &fixture_table("msku_master.csv"), &fixture_table("sales.csv"))
        .unwrap();

    let rollup = &result.derived.msku_rollup;
    assert_eq!(rollup.rows[0]["msku"], "AB-100");
    assert_eq!(rollup.rows[0]["rows"], 3);
    // UNMAPPED never appears in the rollup
    assert!(rollup.rows.iter().all(|r| r["msku"] != UNMAPPED));

    let marketplace = &result.derived.marketplace_rollup;
    assert_eq!(marketplace.rows[0]["marketplace"], "Amazon");
    assert_eq!(marketplace.rows[0]["rows"], 4);
}

// -------------------------------------------------------------------------
// Spec properties
// -------------------------------------------------------------------------

#[test]
fn exactness_every_catalog_identifier_resolves() {
    let catalog = fixture_table("msku_master.csv");
    let index = build_index(&catalog, &CatalogColumns::default(), CaseMode::Insensitive).unwrap();

    let msku_idx = catalog.column("MSKU").unwrap();
    let title_idx = catalog.column("Title").unwrap();

    for row in &catalog.rows {
        let msku = field(row, msku_idx);
        let title = field(row, title_idx);
        for probe in [msku, title] {
            let res = resolve_sku(&index, probe, MapMode::ExactOnly, 0.8);
            assert_eq!(res.msku, msku, "probe {probe:?} must exact-resolve to {msku}");
            assert_eq!(res.bucket, MatchBucket::Exact);
        }
    }
}

#[test]
fn determinism_identical_runs() {
    let config = fixture_config("basic.map.toml");
    let catalog = fixture_table("msku_master.csv");
    let sales = fixture_table("sales.csv");

    let a = run(&config, &catalog, &sales).unwrap();
    let b = run(&config, &catalog, &sales).unwrap();

    assert_eq!(a.table, b.table);
    assert_eq!(a.summary, b.summary);
    assert_eq!(
        serde_json::to_value(&a.derived).unwrap(),
        serde_json::to_value(&b.derived).unwrap()
    );
}

#[test]
fn totality_every_row_resolved() {
    let config = fixture_config("basic.map.toml");
    let sales = fixture_table("sales.csv");
    let result = run(&config, &fixture_table("msku_master.csv"), &sales).unwrap();

    assert_eq!(result.table.rows.len(), sales.rows.len());
    for value in msku_values(&result.table) {
        assert!(!value.is_empty(), "every row must carry a resolution");
    }
}

#[test]
fn threshold_monotonicity() {
    let catalog = fixture_table("msku_master.csv");
    let sales = fixture_table("sales.csv");
    let index = build_index(&catalog, &CatalogColumns::default(), CaseMode::Insensitive).unwrap();

    let mut previous = usize::MAX;
    for tau in [0.5, 0.7, 0.8, 0.9, 1.0] {
        let (_, summary) =
            annotate(&index, &sales, &SalesColumns::default(), MapMode::ExactThenFuzzy, tau)
                .unwrap();
        let fuzzy = summary.fuzzy_code + summary.fuzzy_title;
        assert!(
            fuzzy <= previous,
            "raising τ to {tau} increased fuzzy matches ({fuzzy} > {previous})"
        );
        previous = fuzzy;
    }
}

#[test]
fn fallback_ordering_exact_wins() {
    // Probe whose exact target differs from its fuzzy-closest code:
    // WIDGET-200 maps exactly to MSKU-A, while the code WIDGET-201
    // scores 0.9 against it.
    let catalog = Table::from_csv("SKU,MSKU\nWIDGET-200,MSKU-A\n,WIDGET-201\n").unwrap();
    let index = build_index(&catalog, &CatalogColumns::default(), CaseMode::Insensitive).unwrap();

    let res = resolve_sku(&index, "WIDGET-200", MapMode::ExactThenFuzzy, 0.8);
    assert_eq!(res.msku, "MSKU-A");
    assert_eq!(res.bucket, MatchBucket::Exact);
}

// -------------------------------------------------------------------------
// Schema guard
// -------------------------------------------------------------------------

#[test]
fn schema_guard_catalog_checked_before_sales() {
    let config = fixture_config("basic.map.toml");
    // Both inputs are broken; the catalog error must surface first.
    let catalog = Table::from_csv("Title\nBlue Widget\n").unwrap();
    let sales = Table::from_csv("Item\nAB-100\n").unwrap();

    match run(&config, &catalog, &sales).unwrap_err() {
        MapError::MissingColumn { source, column } => {
            assert_eq!(source, "catalog");
            assert_eq!(column, "MSKU");
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn schema_guard_sales() {
    let config = fixture_config("basic.map.toml");
    let catalog = fixture_table("msku_master.csv");
    let sales = Table::from_csv("Item,Quantity\nAB-100,1\n").unwrap();

    match run(&config, &catalog, &sales).unwrap_err() {
        MapError::MissingColumn { source, column } => {
            assert_eq!(source, "sales");
            assert_eq!(column, "SKU");
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

// -------------------------------------------------------------------------
// Spec scenarios
// -------------------------------------------------------------------------

#[test]
fn scenario_hyphenless_sku_fuzzy_resolves() {
    let catalog = Table::from_csv("MSKU,Title\nAB-100,Blue Widget\n").unwrap();
    let index = build_index(&catalog, &CatalogColumns::default(), CaseMode::Insensitive).unwrap();

    let res = resolve_sku(&index, "AB100", MapMode::ExactThenFuzzy, 0.8);
    assert_eq!(res.msku, "AB-100");
    assert_eq!(res.bucket, MatchBucket::FuzzyCode);

    let res = resolve_sku(&index, "Totally Unrelated", MapMode::ExactThenFuzzy, 0.8);
    assert_eq!(res.msku, UNMAPPED);
}

#[test]
fn scenario_case_modes_on_pair_file() {
    let pairs = fixture_table("sku_pairs.csv");

    let insensitive =
        build_index(&pairs, &CatalogColumns::default(), CaseMode::Insensitive).unwrap();
    let res = resolve_sku(&insensitive, "x1", MapMode::ExactOnly, 0.8);
    assert_eq!(res.msku, "MSKU-X1");

    let sensitive = build_index(&pairs, &CatalogColumns::default(), CaseMode::Sensitive).unwrap();
    let res = resolve_sku(&sensitive, "X1", MapMode::ExactOnly, 0.8);
    assert_eq!(res.msku, UNMAPPED, "pair file stores lowercase x1");
    let res = resolve_sku(&sensitive, "x1", MapMode::ExactOnly, 0.8);
    assert_eq!(res.msku, "MSKU-X1");
}

#[test]
fn result_serializes_with_stable_shape() {
    let config = fixture_config("basic.map.toml");
    let result = run(&config, &fixture_table("msku_master.csv"), &fixture_table("sales.csv"))
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["meta"]["config_name"], "Fixture basic");
    assert_eq!(json["meta"]["mode"], "exact_then_fuzzy");
    assert_eq!(json["meta"]["case"], "insensitive");
    assert_eq!(json["summary"]["total_rows"], 6);
    assert_eq!(json["table"]["headers"][0], "SKU");
    assert_eq!(json["derived"]["msku_rollup"]["schema"], "msku_rollup");
}
