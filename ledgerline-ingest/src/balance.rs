//! Balance/summary extraction. Summary lines never reach the deduplicator.

use ledgerline_core::{BalanceFact, Direction, LineError, SummaryKind};
use regex::Captures;

use crate::dates::DateNormalizer;
use crate::extract::{marker_direction, parse_magnitude};

pub fn extract_balance(
    kind: SummaryKind,
    pattern_id: &str,
    captures: &Captures<'_>,
    dates: &DateNormalizer,
    source_document: &str,
) -> Result<BalanceFact, LineError> {
    let amount_token = captures
        .name("amount")
        .map(|m| m.as_str())
        .ok_or_else(|| LineError::malformed("summary line without amount"))?;
    let (amount, _) = parse_magnitude(amount_token)?;

    let is_credit = captures
        .name("marker")
        .and_then(|m| marker_direction(m.as_str()))
        == Some(Direction::Credit);

    // A summary date that cannot be resolved does not void the figure.
    let as_of_date = captures
        .name("asof")
        .or_else(|| captures.name("date"))
        .and_then(|m| dates.normalize(m.as_str()).ok());

    Ok(BalanceFact::new(
        kind,
        amount,
        is_credit,
        as_of_date,
        source_document,
        pattern_id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classification, LineClassifier};
    use crate::dates::YearPolicy;
    use chrono::NaiveDate;
    use ledgerline_core::{BalanceLabel, StatementPeriod, StatementType};
    use rust_decimal::Decimal;

    fn extract(statement_type: StatementType, line: &str) -> Result<BalanceFact, LineError> {
        let classifier = LineClassifier::new(statement_type).unwrap();
        let dates = DateNormalizer::new(StatementPeriod::month(2024, 3), YearPolicy::default());
        match classifier.classify(line) {
            Classification::Balance {
                pattern_id,
                kind,
                captures,
            } => extract_balance(kind, pattern_id, &captures, &dates, "mar.txt"),
            other => panic!("not a balance line: {other:?}"),
        }
    }

    #[test]
    fn test_closing_balance_with_as_of_date() {
        let fact = extract(
            StatementType::CurrentAccount,
            "CLOSING BALANCE AS AT 31/03 6,454.10",
        )
        .unwrap();
        assert_eq!(fact.label, BalanceLabel::Closing);
        assert_eq!(fact.amount, Decimal::new(645410, 2));
        assert_eq!(fact.as_of_date, NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(fact.pattern_id, "ca.closing_balance");
    }

    #[test]
    fn test_leading_date_and_plain_opening() {
        let fact = extract(StatementType::CurrentAccount, "01/03 BEGINNING BALANCE 5,000.00").unwrap();
        assert_eq!(fact.label, BalanceLabel::Opening);
        assert_eq!(fact.as_of_date, NaiveDate::from_ymd_opt(2024, 3, 1));

        let fact = extract(StatementType::CurrentAccount, "OPENING BALANCE 5,000.00").unwrap();
        assert_eq!(fact.as_of_date, None);
    }

    #[test]
    fn test_card_balance_in_credit() {
        let fact = extract(StatementType::CreditCard, "YOUR PREVIOUS STATEMENT BALANCE 120.00CR").unwrap();
        assert_eq!(fact.kind, SummaryKind::OpeningBalance);
        assert!(fact.is_credit);
    }

    #[test]
    fn test_totals_are_other() {
        let fact = extract(StatementType::CreditCard, "TOTAL DEBIT THIS MONTH (JUMLAH DEBIT) 1,234.56").unwrap();
        assert_eq!(fact.kind, SummaryKind::TotalDebit);
        assert_eq!(fact.label, BalanceLabel::Other);
    }

    #[test]
    fn test_zero_summary_is_kept() {
        let fact = extract(StatementType::CreditCard, "NEW BALANCE 0.00").unwrap();
        assert_eq!(fact.kind, SummaryKind::ClosingBalance);
        assert_eq!(fact.amount, Decimal::ZERO);

        let fact = extract(StatementType::CreditCard, "TOTAL DEBIT THIS MONTH 0.00").unwrap();
        assert_eq!(fact.kind, SummaryKind::TotalDebit);
        assert!(fact.amount.is_zero());
    }

    #[test]
    fn test_subtotal_is_not_a_closing_balance() {
        let fact = extract(StatementType::CreditCard, "SUB TOTAL/JUMLAH 503.70").unwrap();
        assert_eq!(fact.kind, SummaryKind::Subtotal);
        assert_eq!(fact.label, BalanceLabel::Other);
        assert_eq!(fact.pattern_id, "cc.subtotal");

        let fact = extract(StatementType::CreditCard, "TOTAL CURRENT BALANCE 1,000.00").unwrap();
        assert_eq!(fact.kind, SummaryKind::ClosingBalance);
        assert_eq!(fact.pattern_id, "cc.current_balance");
    }

    #[test]
    fn test_unreadable_amount_is_malformed() {
        let err = extract(StatementType::CurrentAccount, "ENDING BALANCE ,.00").unwrap_err();
        assert!(matches!(err, LineError::MalformedLine { .. }));
    }
}
