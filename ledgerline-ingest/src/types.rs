use ledgerline_core::{StatementPeriod, StatementType};
use serde::{Deserialize, Serialize};

use crate::dates::YearPolicy;

/// One document's extracted text, as handed over by the text-extraction
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Originating file identifier; carried into every record.
    pub name: String,
    pub lines: Vec<String>,
    /// Statement period declared by metadata, if any.
    pub period: Option<StatementPeriod>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lines,
            period: None,
        }
    }

    /// Split extracted text into lines (any line ending).
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, text.lines().map(str::to_string).collect())
    }

    pub fn with_period(mut self, period: StatementPeriod) -> Self {
        self.period = Some(period);
        self
    }
}

/// Which rule table to apply to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeSelection {
    CreditCard,
    CurrentAccount,
    /// Score indicator phrases per document.
    #[default]
    Auto,
}

impl From<StatementType> for TypeSelection {
    fn from(t: StatementType) -> Self {
        match t {
            StatementType::CreditCard => TypeSelection::CreditCard,
            StatementType::CurrentAccount => TypeSelection::CurrentAccount,
        }
    }
}

impl std::str::FromStr for TypeSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(TypeSelection::Auto);
        }
        s.parse::<StatementType>().map(TypeSelection::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    pub statement_type: TypeSelection,
    pub year_policy: YearPolicy,
    /// Year assumed when a document neither declares nor reveals a period.
    pub fallback_year: Option<i32>,
    /// Documents with at least this many lines and no transactions get an
    /// unsupported-format warning.
    pub min_lines_for_format_check: usize,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            statement_type: TypeSelection::Auto,
            year_policy: YearPolicy::default(),
            fallback_year: None,
            min_lines_for_format_check: 10,
        }
    }
}
