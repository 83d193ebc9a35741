//! Current / savings account statement rules.
//!
//! Expected extracted-text rows:
//!   BEGINNING BALANCE                                    5,000.00
//!   01/03     TRANSFER FROM A/C          1,200.00+       6,200.00
//!                 ALI BIN ABU
//!                 DUITNOW 8812345Q
//!   02/03     CDM CASH DEPOSIT             300.00 CR     6,500.00
//!   05/03     SALE DEBIT                    45.90-       6,454.10
//!   ENDING BALANCE :                                     6,454.10

use anyhow::Result;
use ledgerline_core::SummaryKind;

use super::{DAY_MONTH_YEAR, MONEY, boilerplate_pattern, summary_pattern, total_credit_rule, total_debit_rule};
use crate::rules::{Layout, Rule, SignConvention};

const LAYOUT: Layout = Layout {
    signs: SignConvention::PlusIsCredit,
    default_direction: None,
    strip_reference: false,
};

pub fn rules() -> Result<Vec<Rule>> {
    Ok(vec![
        Rule::balance(
            "ca.opening_balance",
            SummaryKind::OpeningBalance,
            &summary_pattern(r"(?:BEGINNING|OPENING)\s+BALANCE"),
        )?,
        Rule::balance(
            "ca.closing_balance",
            SummaryKind::ClosingBalance,
            &summary_pattern(r"(?:ENDING|CLOSING)\s+BALANCE"),
        )?,
        total_credit_rule("ca.total_credit")?,
        total_debit_rule("ca.total_debit")?,
        Rule::noise("ca.boilerplate", &boilerplate_pattern())?,
        // DATE  DESCRIPTION  AMOUNT(+/-)  BALANCE
        Rule::transaction(
            "ca.signed_amount",
            LAYOUT,
            &format!(
                concat!(
                    r"^\s*(?P<txn>{d})\s+(?P<desc>.+?)\s+",
                    r"(?P<amount>{m}[+-])\s+",
                    r"(?P<balance>{m})\s*(?:DR)?\s*$"
                ),
                d = DAY_MONTH_YEAR,
                m = MONEY
            ),
        )?,
        // DATE  DESCRIPTION  AMOUNT  DR|CR  BALANCE
        Rule::transaction(
            "ca.marker_column",
            LAYOUT,
            &format!(
                concat!(
                    r"^\s*(?P<txn>{d})\s+(?P<desc>.+?)\s+",
                    r"(?P<amount>{m})\s+(?P<marker>DR|CR)\s+",
                    r"(?P<balance>{m})\s*$"
                ),
                d = DAY_MONTH_YEAR,
                m = MONEY
            ),
        )?,
        // Any other dated row; amount or direction may be unreadable.
        Rule::transaction(
            "ca.dated_line",
            LAYOUT,
            &format!(
                concat!(
                    r"^\s*(?P<txn>{d})\s+(?P<desc>.+?)\s+",
                    r"(?P<amount>\S+?)\s*(?P<marker>CR|DR)?\s*$"
                ),
                d = DAY_MONTH_YEAR
            ),
        )?,
        Rule::continuation("ca.detail", r"(?i)^(?:\s+\S|.*\bDUITNOW\b)")?,
    ])
}
