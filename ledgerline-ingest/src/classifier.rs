//! First-match-wins line classification.

use anyhow::Result;
use ledgerline_core::{StatementType, SummaryKind};
use regex::Captures;

use crate::parsers;
use crate::rules::{Layout, Rule, RuleKind};

/// Outcome of classifying one line. Borrows the line it was built from.
#[derive(Debug)]
pub enum Classification<'l> {
    Transaction {
        pattern_id: &'static str,
        layout: Layout,
        captures: Captures<'l>,
    },
    Balance {
        pattern_id: &'static str,
        kind: SummaryKind,
        captures: Captures<'l>,
    },
    /// Detail text to append to the preceding transaction.
    Continuation(&'l str),
    Ignored,
}

impl Classification<'_> {
    pub fn pattern_id(&self) -> Option<&'static str> {
        match self {
            Classification::Transaction { pattern_id, .. }
            | Classification::Balance { pattern_id, .. } => Some(*pattern_id),
            Classification::Continuation(_) | Classification::Ignored => None,
        }
    }
}

/// Ordered rule table for one statement type.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    statement_type: StatementType,
    rules: Vec<Rule>,
}

impl LineClassifier {
    pub fn new(statement_type: StatementType) -> Result<Self> {
        let rules = match statement_type {
            StatementType::CreditCard => parsers::credit_card::rules()?,
            StatementType::CurrentAccount => parsers::current_account::rules()?,
        };
        Ok(Self::with_rules(statement_type, rules))
    }

    /// Use a custom rule table; order is priority.
    pub fn with_rules(statement_type: StatementType, rules: Vec<Rule>) -> Self {
        Self {
            statement_type,
            rules,
        }
    }

    pub fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate rules in order and stop at the first match. Never fails:
    /// anything unmatched is [`Classification::Ignored`].
    pub fn classify<'l>(&self, line: &'l str) -> Classification<'l> {
        if line.trim().is_empty() {
            return Classification::Ignored;
        }
        for rule in &self.rules {
            let Some(captures) = rule.regex.captures(line) else {
                continue;
            };
            return match rule.kind {
                RuleKind::Transaction(layout) => Classification::Transaction {
                    pattern_id: rule.id,
                    layout,
                    captures,
                },
                RuleKind::Balance(kind) => Classification::Balance {
                    pattern_id: rule.id,
                    kind,
                    captures,
                },
                RuleKind::Continuation => Classification::Continuation(line.trim()),
                RuleKind::Noise => Classification::Ignored,
            };
        }
        Classification::Ignored
    }
}
