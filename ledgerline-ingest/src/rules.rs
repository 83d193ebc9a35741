//! Classification rules: a compiled pattern plus what a match means.

use anyhow::{Context, Result};
use ledgerline_core::{Direction, SummaryKind};
use regex::Regex;

/// How a trailing/leading `+`/`-` on the amount maps to a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignConvention {
    /// Account statements: `+` money in, `-` money out.
    PlusIsCredit,
    /// Card statements: a negative amount is a payment or refund.
    MinusIsCredit,
}

impl SignConvention {
    pub fn direction(&self, sign: char) -> Option<Direction> {
        match (self, sign) {
            (SignConvention::PlusIsCredit, '+') | (SignConvention::MinusIsCredit, '-') => {
                Some(Direction::Credit)
            }
            (SignConvention::PlusIsCredit, '-') | (SignConvention::MinusIsCredit, '+') => {
                Some(Direction::Debit)
            }
            _ => None,
        }
    }
}

/// Field layout of a transaction rule.
///
/// Capture names: `post` and `txn` (or only `txn`) for dates, `desc`,
/// `amount`, optional `marker` (`CR`/`DR`) and `balance` (ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub signs: SignConvention,
    /// Direction when neither marker nor sign is present.
    pub default_direction: Option<Direction>,
    /// Trailing reference codes are not part of the description.
    pub strip_reference: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Transaction(Layout),
    Balance(SummaryKind),
    /// Indented detail text belonging to the previous transaction.
    Continuation,
    /// Known non-transaction text; stops evaluation.
    Noise,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub kind: RuleKind,
    pub regex: Regex,
}

impl Rule {
    pub fn new(id: &'static str, kind: RuleKind, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).with_context(|| format!("compiling rule {id}"))?;
        Ok(Self { id, kind, regex })
    }

    pub fn transaction(id: &'static str, layout: Layout, pattern: &str) -> Result<Self> {
        Self::new(id, RuleKind::Transaction(layout), pattern)
    }

    pub fn balance(id: &'static str, kind: SummaryKind, pattern: &str) -> Result<Self> {
        Self::new(id, RuleKind::Balance(kind), pattern)
    }

    pub fn noise(id: &'static str, pattern: &str) -> Result<Self> {
        Self::new(id, RuleKind::Noise, pattern)
    }

    pub fn continuation(id: &'static str, pattern: &str) -> Result<Self> {
        Self::new(id, RuleKind::Continuation, pattern)
    }
}
