//! Per-document and batch-wide counters handed to the report collaborator.

use std::ops::AddAssign;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::LineError;
use crate::record::TransactionRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentCounts {
    pub lines_seen: usize,
    pub transactions_accepted: usize,
    pub duplicates_rejected: usize,
    pub malformed_skipped: usize,
    pub invalid_dates_skipped: usize,
    pub balance_facts: usize,
}

impl DocumentCounts {
    /// Lines dropped because of a line-level error.
    pub fn skipped(&self) -> usize {
        self.malformed_skipped + self.invalid_dates_skipped
    }

    pub fn record_error(&mut self, err: &LineError) {
        match err {
            LineError::MalformedLine { .. } => self.malformed_skipped += 1,
            LineError::InvalidDate { .. } => self.invalid_dates_skipped += 1,
        }
    }
}

impl AddAssign for DocumentCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.lines_seen += rhs.lines_seen;
        self.transactions_accepted += rhs.transactions_accepted;
        self.duplicates_rejected += rhs.duplicates_rejected;
        self.malformed_skipped += rhs.malformed_skipped;
        self.invalid_dates_skipped += rhs.invalid_dates_skipped;
        self.balance_facts += rhs.balance_facts;
    }
}

/// Running sums over accepted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AmountSums {
    pub total: Decimal,
    pub credit: Decimal,
    pub debit: Decimal,
}

impl AmountSums {
    pub fn add(&mut self, record: &TransactionRecord) {
        self.total += record.amount();
        if record.is_credit() {
            self.credit += record.amount();
        } else {
            self.debit += record.amount();
        }
    }
}

impl AddAssign for AmountSums {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.credit += rhs.credit;
        self.debit += rhs.debit;
    }
}

impl<'a> FromIterator<&'a TransactionRecord> for AmountSums {
    fn from_iter<I: IntoIterator<Item = &'a TransactionRecord>>(iter: I) -> Self {
        let mut sums = AmountSums::default();
        for record in iter {
            sums.add(record);
        }
        sums
    }
}

/// Aggregate over every document of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchTotals {
    pub files_processed: usize,
    pub documents_with_warnings: usize,
    pub counts: DocumentCounts,
    pub sums: AmountSums,
}

impl BatchTotals {
    pub fn absorb(&mut self, counts: DocumentCounts, sums: AmountSums, warned: bool) {
        self.files_processed += 1;
        if warned {
            self.documents_with_warnings += 1;
        }
        self.counts += counts;
        self.sums += sums;
    }
}
