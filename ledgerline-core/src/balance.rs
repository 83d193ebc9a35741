//! Summary figures printed on a statement (balances and totals).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceLabel {
    Opening,
    Closing,
    Other,
}

/// Which summary line a fact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryKind {
    OpeningBalance,
    ClosingBalance,
    TotalCredit,
    TotalDebit,
    /// Per-card subtotal on multi-card statements.
    Subtotal,
}

impl SummaryKind {
    pub fn label(&self) -> BalanceLabel {
        match self {
            SummaryKind::OpeningBalance => BalanceLabel::Opening,
            SummaryKind::ClosingBalance => BalanceLabel::Closing,
            SummaryKind::TotalCredit | SummaryKind::TotalDebit | SummaryKind::Subtotal => {
                BalanceLabel::Other
            }
        }
    }
}

/// A non-transactional figure extracted from one summary line.
///
/// Balance facts are collected per document and are never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceFact {
    pub label: BalanceLabel,
    pub kind: SummaryKind,
    pub amount: Decimal,
    /// Balance printed with a `CR` marker (in credit).
    pub is_credit: bool,
    pub as_of_date: Option<NaiveDate>,
    pub source_document: String,
    pub pattern_id: String,
}

impl BalanceFact {
    pub fn new(
        kind: SummaryKind,
        amount: Decimal,
        is_credit: bool,
        as_of_date: Option<NaiveDate>,
        source_document: impl Into<String>,
        pattern_id: impl Into<String>,
    ) -> Self {
        Self {
            label: kind.label(),
            kind,
            amount,
            is_credit,
            as_of_date,
            source_document: source_document.into(),
            pattern_id: pattern_id.into(),
        }
    }
}
