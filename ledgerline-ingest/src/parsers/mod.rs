//! Ordered rule tables per statement type.
//!
//! Order is priority: summary lines first, then boilerplate, then
//! transaction shapes from most to least specific.

pub mod credit_card;
pub mod current_account;

use anyhow::Result;

use crate::rules::Rule;

/// `DD/MM` with one- or two-digit parts.
pub(crate) const DAY_MONTH: &str = r"\d{1,2}/\d{1,2}";
/// `DD/MM` with an optional `/YY` or `/YYYY`.
pub(crate) const DAY_MONTH_YEAR: &str = r"\d{1,2}/\d{1,2}(?:/\d{2}(?:\d{2})?)?";
pub(crate) const MONEY: &str = r"[\d,]+\.\d{2}";

/// Summary line: optional leading date, the label (optionally in parentheses),
/// optional `AS AT <date>`, optional bilingual `(...)` gloss, then the amount
/// with an optional marker.
pub(crate) fn summary_pattern(label: &str) -> String {
    format!(
        concat!(
            r"(?i)^\s*(?:(?P<date>{date})\s+)?",
            r"\(?(?:{label})\b\)?",
            r"(?:\s+AS\s+(?:AT|OF)\s+(?P<asof>{date}))?",
            r"\s*(?:\([^)]*\))?\s*:?\s*",
            r"(?P<amount>{money})\s*(?P<marker>CR|DR)?\s*$"
        ),
        date = DAY_MONTH_YEAR,
        label = label,
        money = MONEY,
    )
}

/// Boilerplate that never carries a transaction, even when dated.
pub(crate) fn boilerplate_pattern() -> String {
    concat!(
        r"(?i)(?:\b(?:CREDIT\s+LIMIT|MINIMUM\s+PAYMENT|RETAIL\s+INTEREST\s+RATE|",
        r"YOUR\s+COMBINED|KOMBINASI\s+HAD|JUMLAH\s+PENYATA|TRANSACTED\s+AMOUNT|",
        r"FOREIGN\s+EXCHANGE|BALANCE|PREVIOUS|STATEMENT)\b",
        r"|^\s*PAGE\s+\d+\s*(?:OF|/)\s*\d+\s*$)"
    )
    .to_string()
}

const TOTAL_DEBIT_LABEL: &str = r"TOTAL\s+DEBIT(?:\s+THIS\s+MONTH)?|DEBIT\s+TOTAL|JUMLAH\s+DEBIT";

pub(crate) fn total_credit_rule(id: &'static str) -> Result<Rule> {
    Rule::balance(
        id,
        ledgerline_core::SummaryKind::TotalCredit,
        &summary_pattern(r"TOTAL\s+CREDIT(?:\s+THIS\s+MONTH)?|CREDIT\s+TOTAL|JUMLAH\s+KREDIT"),
    )
}

pub(crate) fn total_debit_rule(id: &'static str) -> Result<Rule> {
    Rule::balance(
        id,
        ledgerline_core::SummaryKind::TotalDebit,
        &summary_pattern(TOTAL_DEBIT_LABEL),
    )
}
