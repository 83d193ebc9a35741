//! Statement type detection by indicator phrases.

use ledgerline_core::StatementType;
use tracing::warn;

const CREDIT_CARD_INDICATORS: &[&str] = &[
    "CREDIT CARD STATEMENT",
    "MAYBANK CREDIT CARD",
    "CARD NUMBER",
    "CREDIT LIMIT",
    "MINIMUM PAYMENT",
];

const CURRENT_ACCOUNT_INDICATORS: &[&str] = &[
    "ACCOUNT TRANSACTIONS",
    "URUSNIAGA AKAUN",
    "CURRENT ACCOUNT",
    "SAVINGS ACCOUNT",
    "ACCOUNT NUMBER",
    "OPENING BALANCE",
    "CLOSING BALANCE",
    "BEGINNING BALANCE",
    "ENDING BALANCE",
    "STATEMENT BALANCE",
    "CDM CASH DEPOSIT",
    "TRANSFER TO A/C",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub statement_type: StatementType,
    pub credit_card_score: usize,
    pub current_account_score: usize,
}

impl Detection {
    /// Neither side scored higher; the credit card default was applied.
    pub fn is_ambiguous(&self) -> bool {
        self.credit_card_score == self.current_account_score
    }
}

/// Count which indicator phrases occur anywhere in the document. A tie
/// falls back to credit card.
pub fn detect_statement_type<S: AsRef<str>>(lines: &[S]) -> Detection {
    let text = lines
        .iter()
        .map(|l| l.as_ref().to_uppercase())
        .collect::<Vec<_>>()
        .join("\n");
    let score = |indicators: &[&str]| indicators.iter().filter(|i| text.contains(*i)).count();

    let credit_card_score = score(CREDIT_CARD_INDICATORS);
    let current_account_score = score(CURRENT_ACCOUNT_INDICATORS);

    let statement_type = if current_account_score > credit_card_score {
        StatementType::CurrentAccount
    } else {
        StatementType::CreditCard
    };

    let detection = Detection {
        statement_type,
        credit_card_score,
        current_account_score,
    };
    if detection.is_ambiguous() {
        warn!(
            score = credit_card_score,
            "could not clearly detect statement type, defaulting to credit card"
        );
    }
    detection
}
