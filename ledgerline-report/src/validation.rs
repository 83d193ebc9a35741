//! Check parsed debits against the statement's own `TOTAL DEBIT` line.

use std::fmt;

use ledgerline_core::SummaryKind;
use ledgerline_ingest::{BatchOutput, DocumentReport};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

/// Largest difference still counted as a match (0.01).
const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Pass,
    Fail,
    NoTotal,
    NoDebits,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pass => "PASS",
            ValidationStatus::Fail => "FAIL",
            ValidationStatus::NoTotal => "NO_TOTAL",
            ValidationStatus::NoDebits => "NO_DEBITS",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebitValidation {
    pub document: String,
    pub status: ValidationStatus,
    /// Sum of accepted debit transactions.
    pub calculated: Decimal,
    /// The statement's printed total, when one was found.
    pub expected: Option<Decimal>,
    pub difference: Option<Decimal>,
}

pub fn validate_debits(report: &DocumentReport) -> DebitValidation {
    let calculated = report.sums.debit;
    let mut result = DebitValidation {
        document: report.name.clone(),
        status: ValidationStatus::NoDebits,
        calculated,
        expected: None,
        difference: Some(Decimal::ZERO),
    };

    if !report.transactions.iter().any(|t| t.is_debit()) {
        return result;
    }

    let Some(total) = report.balance(SummaryKind::TotalDebit) else {
        info!(document = %report.name, "no total debit line; debits not validated");
        result.status = ValidationStatus::NoTotal;
        result.difference = None;
        return result;
    };

    let difference = (calculated - total.amount).abs();
    result.expected = Some(total.amount);
    result.difference = Some(difference);
    result.status = if difference <= TOLERANCE {
        ValidationStatus::Pass
    } else {
        warn!(
            document = %report.name,
            expected = %total.amount,
            calculated = %calculated,
            "debit total mismatch; check this statement manually"
        );
        ValidationStatus::Fail
    };
    result
}

pub fn validate_batch(output: &BatchOutput) -> Vec<DebitValidation> {
    output.documents.iter().map(validate_debits).collect()
}

/// Count of results per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationTally {
    pub passed: usize,
    pub failed: usize,
    pub no_total: usize,
    pub no_debits: usize,
}

impl<'a> FromIterator<&'a DebitValidation> for ValidationTally {
    fn from_iter<I: IntoIterator<Item = &'a DebitValidation>>(iter: I) -> Self {
        let mut tally = ValidationTally::default();
        for v in iter {
            match v.status {
                ValidationStatus::Pass => tally.passed += 1,
                ValidationStatus::Fail => tally.failed += 1,
                ValidationStatus::NoTotal => tally.no_total += 1,
                ValidationStatus::NoDebits => tally.no_debits += 1,
            }
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerline_core::{Deduplicator, StatementPeriod};
    use ledgerline_ingest::{ProcessOptions, RuleBook, SourceDocument, TypeSelection, process_document};

    fn report(lines: &[&str]) -> DocumentReport {
        let doc = SourceDocument::new("jan.txt", lines.iter().map(|l| l.to_string()).collect())
            .with_period(StatementPeriod::month(2024, 1).unwrap());
        let options = ProcessOptions {
            statement_type: TypeSelection::CreditCard,
            ..ProcessOptions::default()
        };
        process_document(&RuleBook::new().unwrap(), &doc, &options, &mut Deduplicator::new())
    }

    #[test]
    fn test_pass_within_tolerance() {
        let r = report(&[
            "03/01 03/01 GRAB RIDE 12.00",
            "04/01 04/01 TESCO EXTRA 88.01",
            "TOTAL DEBIT THIS MONTH 100.00",
        ]);
        let v = validate_debits(&r);
        assert_eq!(v.status, ValidationStatus::Pass);
        assert_eq!(v.expected, Some(Decimal::new(10000, 2)));
        assert_eq!(v.difference, Some(Decimal::new(1, 2)));
    }

    #[test]
    fn test_fail_outside_tolerance() {
        let r = report(&["03/01 03/01 GRAB RIDE 12.00", "TOTAL DEBIT : 12.50"]);
        let v = validate_debits(&r);
        assert_eq!(v.status, ValidationStatus::Fail);
        assert_eq!(v.calculated, Decimal::new(1200, 2));
        assert_eq!(v.difference, Some(Decimal::new(50, 2)));
    }

    #[test]
    fn test_no_total_and_no_debits() {
        let v = validate_debits(&report(&["03/01 03/01 GRAB RIDE 12.00"]));
        assert_eq!(v.status, ValidationStatus::NoTotal);
        assert_eq!(v.difference, None);

        let v = validate_debits(&report(&[
            "15/01 15/01 PAYMENT RECEIVED 500.00 CR",
            "TOTAL DEBIT : 0.00",
        ]));
        assert_eq!(v.status, ValidationStatus::NoDebits);
        assert_eq!(v.calculated, Decimal::ZERO);
    }

    #[test]
    fn test_zero_total_with_debits_fails() {
        let v = validate_debits(&report(&["03/01 03/01 GRAB RIDE 12.00", "TOTAL DEBIT THIS MONTH 0.00"]));
        assert_eq!(v.status, ValidationStatus::Fail);
        assert_eq!(v.expected, Some(Decimal::ZERO));
    }

    #[test]
    fn test_bilingual_total_labels() {
        for total in ["(JUMLAH DEBIT)12.00", "JUMLAH DEBIT 12.00", "DEBIT TOTAL 12.00"] {
            let v = validate_debits(&report(&["03/01 03/01 GRAB RIDE 12.00", total]));
            assert_eq!(v.status, ValidationStatus::Pass, "{total}");
        }
    }

    #[test]
    fn test_tally() {
        let results = [
            validate_debits(&report(&["03/01 03/01 GRAB RIDE 12.00", "TOTAL DEBIT : 12.00"])),
            validate_debits(&report(&["03/01 03/01 GRAB RIDE 12.00", "TOTAL DEBIT : 13.00"])),
            validate_debits(&report(&["03/01 03/01 GRAB RIDE 12.00"])),
        ];
        let tally: ValidationTally = results.iter().collect();
        assert_eq!(
            tally,
            ValidationTally {
                passed: 1,
                failed: 1,
                no_total: 1,
                no_debits: 0,
            }
        );
    }
}
