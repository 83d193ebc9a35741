//! Statement-level vocabulary: statement type, amount direction and the
//! period a statement covers.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PeriodParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementType {
    CreditCard,
    CurrentAccount,
}

impl StatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::CreditCard => "CREDIT_CARD",
            StatementType::CurrentAccount => "CURRENT_ACCOUNT",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "credit_card" | "cc" | "card" => Ok(StatementType::CreditCard),
            "current_account" | "ca" | "account" | "savings" => Ok(StatementType::CurrentAccount),
            other => Err(format!("unknown statement type `{other}`")),
        }
    }
}

/// Whether money came in or went out, from the statement's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Credit => "CREDIT",
            Direction::Debit => "DEBIT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Month number for an English month name or its three-letter abbreviation.
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim().to_ascii_lowercase();
    if name == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|full| name == *full || (name.len() == 3 && full.starts_with(&name)))
        .map(|i| i as u32 + 1)
}

/// Inclusive date range a statement nominally covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl StatementPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodParseError> {
        if start > end {
            return Err(PeriodParseError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// The whole calendar month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { start, end })
    }

    /// The whole calendar year.
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// A one-month billing cycle closing on `end` (e.g. a card statement date).
    pub fn cycle_ending(end: NaiveDate) -> Self {
        let start = end
            .checked_sub_months(Months::new(1))
            .and_then(|d| d.succ_opt())
            .unwrap_or(end);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// [`month_index`] of the opening month.
    pub fn start_month_index(&self) -> i32 {
        month_index(self.start.year(), self.start.month())
    }

    pub fn end_month_index(&self) -> i32 {
        month_index(self.end.year(), self.end.month())
    }
}

/// Months since year 0; used for rollover arithmetic.
pub fn month_index(year: i32, month: u32) -> i32 {
    year * 12 + month as i32 - 1
}

impl fmt::Display for StatementPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl FromStr for StatementPeriod {
    type Err = PeriodParseError;

    /// Accepts `January 2024`, `Jan 2024`, `2024-01`, `01/2024`, `2024`, or
    /// an explicit `2024-01-01..2024-01-31` range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let unrecognized = || PeriodParseError::Unrecognized(text.to_string());

        if let Some((a, b)) = text.split_once("..") {
            let start = NaiveDate::parse_from_str(a.trim(), "%Y-%m-%d").map_err(|_| unrecognized())?;
            let end = NaiveDate::parse_from_str(b.trim(), "%Y-%m-%d").map_err(|_| unrecognized())?;
            return StatementPeriod::new(start, end);
        }

        if let Ok(year) = text.parse::<i32>() {
            if text.len() == 4 {
                return StatementPeriod::year(year).ok_or_else(unrecognized);
            }
            return Err(unrecognized());
        }

        let (month, year) = if let Some((m, y)) = text.split_once(char::is_whitespace) {
            (month_from_name(m), y.trim().parse::<i32>().ok())
        } else if let Some((y, m)) = text.split_once('-') {
            (m.parse::<u32>().ok(), y.parse::<i32>().ok())
        } else if let Some((m, y)) = text.split_once('/') {
            (m.parse::<u32>().ok(), y.parse::<i32>().ok())
        } else {
            (None, None)
        };

        match (month, year) {
            (Some(m), Some(y)) if (1000..=9999).contains(&y) => {
                StatementPeriod::month(y, m).ok_or_else(unrecognized)
            }
            _ => Err(unrecognized()),
        }
    }
}
