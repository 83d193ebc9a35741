//! Normalized transaction records and their deduplication key.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::LineError;
use crate::statement::{Direction, StatementType};

/// Scale every amount is stored and keyed at.
pub const AMOUNT_SCALE: u32 = 2;

/// Normalized fields handed to [`TransactionRecord::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    pub raw_date: String,
    pub posting_date: NaiveDate,
    pub transaction_date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub direction: Direction,
    pub statement_type: StatementType,
    pub source_document: String,
    pub pattern_id: String,
}

/// A single statement transaction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    raw_date: String,
    posting_date: NaiveDate,
    transaction_date: NaiveDate,
    description: String,
    amount: Decimal,
    direction: Direction,
    statement_type: StatementType,
    source_document: String,
    pattern_id: String,
    dedup_key: String,
}

impl TransactionRecord {
    /// Assemble a record, rescaling the amount and deriving its dedup key.
    ///
    /// Rejects non-positive amounts and empty descriptions as malformed.
    pub fn build(fields: TransactionFields) -> Result<Self, LineError> {
        let mut amount = fields.amount;
        amount.rescale(AMOUNT_SCALE);
        if amount <= Decimal::ZERO {
            return Err(LineError::malformed(format!(
                "amount must be positive, got {amount}"
            )));
        }
        if fields.description.trim().is_empty() {
            return Err(LineError::malformed("empty description"));
        }

        let key = dedup_key(
            fields.posting_date,
            fields.transaction_date,
            &fields.description,
            amount,
            fields.direction,
            &fields.source_document,
        );

        Ok(Self {
            raw_date: fields.raw_date,
            posting_date: fields.posting_date,
            transaction_date: fields.transaction_date,
            description: fields.description,
            amount,
            direction: fields.direction,
            statement_type: fields.statement_type,
            source_document: fields.source_document,
            pattern_id: fields.pattern_id,
            dedup_key: key,
        })
    }

    pub fn raw_date(&self) -> &str {
        &self.raw_date
    }

    pub fn posting_date(&self) -> NaiveDate {
        self.posting_date
    }

    pub fn transaction_date(&self) -> NaiveDate {
        self.transaction_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Always positive; see [`direction`](Self::direction) for the sign.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    pub fn source_document(&self) -> &str {
        &self.source_document
    }

    pub fn pattern_id(&self) -> &str {
        &self.pattern_id
    }

    pub fn dedup_key(&self) -> &str {
        &self.dedup_key
    }

    pub fn is_credit(&self) -> bool {
        self.direction == Direction::Credit
    }

    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }
}

/// Deterministic fingerprint of a transaction's defining fields.
///
/// SHA-256 over `posting|transaction|description|amount|DIRECTION|source`,
/// dates in ISO form and the amount at two decimal places.
pub fn dedup_key(
    posting_date: NaiveDate,
    transaction_date: NaiveDate,
    description: &str,
    amount: Decimal,
    direction: Direction,
    source_document: &str,
) -> String {
    let mut amount = amount;
    amount.rescale(AMOUNT_SCALE);
    let composite = format!(
        "{}|{}|{}|{}|{}|{}",
        posting_date.format("%Y-%m-%d"),
        transaction_date.format("%Y-%m-%d"),
        description,
        amount,
        direction,
        source_document
    );
    let mut hasher = Sha256::new();
    hasher.update(composite.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn fields(description: &str, amount: &str) -> TransactionFields {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        TransactionFields {
            raw_date: "15/01".to_string(),
            posting_date: date,
            transaction_date: date,
            description: description.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            direction: Direction::Credit,
            statement_type: StatementType::CreditCard,
            source_document: "jan.txt".to_string(),
            pattern_id: "cc.posting_and_transaction_date".to_string(),
        }
    }

    #[test]
    fn test_build_rescales_amount() {
        let record = TransactionRecord::build(fields("PAYMENT RECEIVED", "500")).unwrap();
        assert_eq!(record.amount().to_string(), "500.00");
        assert!(record.is_credit());
        assert_eq!(record.dedup_key().len(), 64);
    }

    #[test]
    fn test_identical_fields_give_identical_keys() {
        let a = TransactionRecord::build(fields("PAYMENT RECEIVED", "500.00")).unwrap();
        let b = TransactionRecord::build(fields("PAYMENT RECEIVED", "500.0")).unwrap();
        assert_eq!(a.dedup_key(), b.dedup_key());

        // pattern id and raw date are provenance only
        let mut other = fields("PAYMENT RECEIVED", "500.00");
        other.pattern_id = "cc.single_date".to_string();
        other.raw_date = "15/1".to_string();
        let c = TransactionRecord::build(other).unwrap();
        assert_eq!(a.dedup_key(), c.dedup_key());
    }

    #[test]
    fn test_key_changes_with_each_defining_field() {
        let base = TransactionRecord::build(fields("PAYMENT RECEIVED", "500.00")).unwrap();

        let mut f = fields("PAYMENT RECEIVED", "500.00");
        f.direction = Direction::Debit;
        assert_ne!(base.dedup_key(), TransactionRecord::build(f).unwrap().dedup_key());

        let mut f = fields("PAYMENT RECEIVED", "500.00");
        f.source_document = "feb.txt".to_string();
        assert_ne!(base.dedup_key(), TransactionRecord::build(f).unwrap().dedup_key());

        let mut f = fields("PAYMENT RECEIVED", "500.00");
        f.posting_date = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        assert_ne!(base.dedup_key(), TransactionRecord::build(f).unwrap().dedup_key());

        let f = fields("PAYMENT RECEIVED", "500.01");
        assert_ne!(base.dedup_key(), TransactionRecord::build(f).unwrap().dedup_key());
    }

    #[test]
    fn test_rejects_zero_and_negative_amounts() {
        assert!(matches!(
            TransactionRecord::build(fields("PAYMENT RECEIVED", "0.00")),
            Err(LineError::MalformedLine { .. })
        ));
        assert!(TransactionRecord::build(fields("PAYMENT RECEIVED", "-1.00")).is_err());
        assert!(TransactionRecord::build(fields("   ", "1.00")).is_err());
    }

    #[test]
    fn test_serializes_with_record_field_names() {
        let record = TransactionRecord::build(fields("PAYMENT RECEIVED", "500")).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["posting_date"], "2024-01-15");
        assert_eq!(json["amount"], "500.00");
        assert_eq!(json["direction"], "CREDIT");
        assert_eq!(json["statement_type"], "CREDIT_CARD");
        assert_eq!(json["pattern_id"], "cc.posting_and_transaction_date");
    }
}
