//! Credit card statement rules.
//!
//! Expected extracted-text rows:
//!   YOUR PREVIOUS STATEMENT BALANCE                          2,345.67
//!   15/01     15/01     PAYMENT RECEIVED - THANK YOU           500.00 CR
//!   16/01     14/01     GRAB*FOOD KUALA LUMPUR                  23.40
//!   SUB TOTAL/JUMLAH                                       1,869.07
//!   TOTAL CURRENT BALANCE                                  1,869.07

use anyhow::Result;
use ledgerline_core::{Direction, SummaryKind};

use super::{DAY_MONTH, boilerplate_pattern, summary_pattern, total_credit_rule, total_debit_rule};
use crate::rules::{Layout, Rule, SignConvention};

const LAYOUT: Layout = Layout {
    signs: SignConvention::MinusIsCredit,
    default_direction: Some(Direction::Debit),
    strip_reference: true,
};

pub fn rules() -> Result<Vec<Rule>> {
    Ok(vec![
        Rule::balance(
            "cc.previous_balance",
            SummaryKind::OpeningBalance,
            &summary_pattern(r"(?:YOUR\s+)?PREVIOUS\s+(?:STATEMENT\s+)?BALANCE"),
        )?,
        Rule::balance(
            "cc.current_balance",
            SummaryKind::ClosingBalance,
            &summary_pattern(
                r"(?:TOTAL\s+CURRENT\s+BALANCE|CURRENT\s+BALANCE|STATEMENT\s+BALANCE|NEW\s+BALANCE)",
            ),
        )?,
        Rule::balance(
            "cc.subtotal",
            SummaryKind::Subtotal,
            &summary_pattern(r"SUB\s*TOTAL(?:/JUMLAH)?"),
        )?,
        total_credit_rule("cc.total_credit")?,
        total_debit_rule("cc.total_debit")?,
        Rule::noise("cc.boilerplate", &boilerplate_pattern())?,
        // POSTING DATE  TRANSACTION DATE  DESCRIPTION  AMOUNT [CR]
        Rule::transaction(
            "cc.posting_and_transaction_date",
            LAYOUT,
            &format!(
                concat!(
                    r"^\s*(?P<post>{d})\s+(?P<txn>{d})\s+",
                    r"(?P<desc>.+?)\s+",
                    r"(?P<amount>\S+?)\s*(?P<marker>CR)?\s*$"
                ),
                d = DAY_MONTH
            ),
        )?,
        // Single-date rows (some cards print only the transaction date)
        Rule::transaction(
            "cc.single_date",
            LAYOUT,
            &format!(
                concat!(
                    r"^\s*(?P<txn>{d})\s+",
                    r"(?P<desc>.+?)\s+",
                    r"(?P<amount>\S+?)\s*(?P<marker>CR)?\s*$"
                ),
                d = DAY_MONTH
            ),
        )?,
    ])
}
