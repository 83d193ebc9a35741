//! Write accepted transactions and balance facts to CSV or pretty JSON.
//!
//! CSV columns follow the record field names; `dedup_key` is last.

use anyhow::{Context, Result};
use ledgerline_core::{BalanceFact, TransactionRecord};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const TRANSACTION_COLUMNS: &[&str] = &[
    "raw_date",
    "posting_date",
    "transaction_date",
    "description",
    "amount",
    "direction",
    "statement_type",
    "source_document",
    "pattern_id",
    "dedup_key",
];

pub const BALANCE_COLUMNS: &[&str] = &[
    "label",
    "kind",
    "amount",
    "is_credit",
    "as_of_date",
    "source_document",
    "pattern_id",
];

/// Write a header row and then one row per item. The header is written
/// even when there are no rows.
pub fn write_csv<W, T>(writer: W, header: &[&str], rows: impl IntoIterator<Item = T>) -> Result<usize>
where
    W: Write,
    T: Serialize,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(header).context("write csv header")?;

    let mut written = 0;
    for row in rows {
        wtr.serialize(row).context("serialize csv row")?;
        written += 1;
    }
    wtr.flush().context("flush csv")?;
    Ok(written)
}

pub fn write_transactions_csv<'a>(
    path: impl AsRef<Path>,
    records: impl IntoIterator<Item = &'a TransactionRecord>,
) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let written = write_csv(BufWriter::new(file), TRANSACTION_COLUMNS, records)
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), rows = written, "wrote transactions csv");
    Ok(written)
}

pub fn write_balances_csv<'a>(
    path: impl AsRef<Path>,
    facts: impl IntoIterator<Item = &'a BalanceFact>,
) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let written = write_csv(BufWriter::new(file), BALANCE_COLUMNS, facts)
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), rows = written, "wrote balances csv");
    Ok(written)
}

/// Pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value)
        .with_context(|| format!("serialize {}", path.display()))?;
    out.flush().with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "wrote json");
    Ok(())
}
