//! Error kinds raised while parsing statement text.
//!
//! Line-level errors are recovered by the caller (the line is skipped and
//! counted); document-level warnings are reported but never abort a batch.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Failure to turn a single classified line into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// A transaction-shaped line missing a required field, or with an
    /// unusable amount.
    #[error("malformed line: {reason}")]
    MalformedLine { reason: String },

    /// Impossible day/month, or a date whose year cannot be resolved.
    #[error("invalid date `{token}`: {reason}")]
    InvalidDate { token: String, reason: String },
}

impl LineError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        LineError::MalformedLine {
            reason: reason.into(),
        }
    }

    pub fn invalid_date(token: impl Into<String>, reason: impl Into<String>) -> Self {
        LineError::InvalidDate {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

/// Document-level problems, surfaced per document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentWarning {
    #[error(
        "{document}: no transaction pattern matched in {lines_seen} lines (unsupported statement format)"
    )]
    UnsupportedStatementFormat { document: String, lines_seen: usize },

    #[error("{document}: no statement period declared or found in the text")]
    NoStatementPeriod { document: String },
}

/// Caller-supplied statement period text that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodParseError {
    #[error("unrecognized statement period `{0}`")]
    Unrecognized(String),

    #[error("statement period starts after it ends: {start} > {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}
