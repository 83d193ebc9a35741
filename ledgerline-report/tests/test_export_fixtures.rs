use ledgerline_ingest::{ProcessOptions, RuleBook, SourceDocument, process_batch};
use ledgerline_report::{
    ValidationStatus, render_summary, render_validation, validate_batch, write_balances_csv,
    write_json, write_transactions_csv,
};
use std::path::PathBuf;

fn fixture(name: &str) -> SourceDocument {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("fixtures")
        .join(name);
    SourceDocument::from_text(name, &std::fs::read_to_string(path).unwrap())
}

fn run() -> ledgerline_ingest::BatchOutput {
    let docs = vec![fixture("cc_jan_2024.txt"), fixture("ca_mar_2024.txt")];
    process_batch(&RuleBook::new().unwrap(), &docs, &ProcessOptions::default())
}

#[test]
fn test_fixture_debits_validate() {
    let out = run();
    let results = validate_batch(&out);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.status == ValidationStatus::Pass));

    let text = render_validation(&results);
    assert!(text.contains("2 passed, 0 failed, 0 no total, 0 no debits"));
}

#[test]
fn test_fixture_exports() {
    let out = run();
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("transactions.csv");
    assert_eq!(write_transactions_csv(&csv_path, out.transactions()).unwrap(), 11);

    let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("raw_date"));
    assert_eq!(headers.get(headers.len() - 1), Some("dedup_key"));
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 11);
    assert_eq!(rows[4].get(1), Some("2024-01-02"));
    assert_eq!(rows[4].get(2), Some("2023-12-31"));

    let balances_path = dir.path().join("balances.csv");
    assert_eq!(write_balances_csv(&balances_path, out.balances()).unwrap(), 9);

    let json_path = dir.path().join("transactions.json");
    let records: Vec<_> = out.transactions().collect();
    write_json(&json_path, &records).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 11);
    assert_eq!(value[6]["statement_type"], "CURRENT_ACCOUNT");
}

#[test]
fn test_fixture_summary() {
    let text = render_summary(&run(), 3);
    assert!(text.starts_with("Processed 2 file(s): 11 transactions, 1 duplicates, 3 skipped"));
    assert!(text.contains("... and 8 more transactions"));
}
