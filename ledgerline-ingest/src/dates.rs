//! Day/month date normalization with year inference.
//!
//! Statement rows print `DD/MM` without a year. The year comes from the
//! statement period only (never the wall clock): the candidate is the
//! period's closing year, moved back one year when the month lands too far
//! after the closing month and forward one year when it lands too far
//! before the opening month.

use chrono::{Datelike, NaiveDate};
use ledgerline_core::{LineError, StatementPeriod, month_index};
use serde::{Deserialize, Serialize};

/// Months a transaction may sit past the closing month (or before the
/// opening month) before the year rolls over.
pub const DEFAULT_ROLLOVER_MONTHS: u32 = 6;

/// Year to validate day-of-month against before the real year is known;
/// a leap year so that 29/02 survives until the year is resolved.
const PROVISIONAL_YEAR: i32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearPolicy {
    pub lookahead_months: u32,
    pub lookback_months: u32,
}

impl Default for YearPolicy {
    fn default() -> Self {
        Self {
            lookahead_months: DEFAULT_ROLLOVER_MONTHS,
            lookback_months: DEFAULT_ROLLOVER_MONTHS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    period: Option<StatementPeriod>,
    policy: YearPolicy,
}

impl DateNormalizer {
    pub fn new(period: Option<StatementPeriod>, policy: YearPolicy) -> Self {
        Self { period, policy }
    }

    pub fn period(&self) -> Option<StatementPeriod> {
        self.period
    }

    /// Resolve `DD/MM`, `DD/MM/YY` or `DD/MM/YYYY` to a calendar date.
    pub fn normalize(&self, token: &str) -> Result<NaiveDate, LineError> {
        let token = token.trim();
        let invalid = |reason: &str| LineError::invalid_date(token, reason);

        let parts: Vec<&str> = token.split('/').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid("expected DD/MM"));
        }
        let day: u32 = parts[0].parse().map_err(|_| invalid("day is not a number"))?;
        let month: u32 = parts[1].parse().map_err(|_| invalid("month is not a number"))?;

        if !(1..=12).contains(&month) {
            return Err(invalid("month out of range"));
        }
        if NaiveDate::from_ymd_opt(PROVISIONAL_YEAR, month, day).is_none() {
            return Err(invalid("day out of range for month"));
        }

        let year = match parts.get(2) {
            Some(y) => explicit_year(y).ok_or_else(|| invalid("unreadable year"))?,
            None => self
                .infer_year(month)
                .ok_or_else(|| invalid("no statement period to infer the year from"))?,
        };

        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| LineError::invalid_date(token, format!("no such day in {year}")))
    }

    /// Year for a month with no printed year, or `None` without a period.
    pub fn infer_year(&self, month: u32) -> Option<i32> {
        let period = self.period?;
        let closing_year = period.end().year();
        let candidate = month_index(closing_year, month);

        let after_close = candidate - period.end_month_index();
        let before_open = period.start_month_index() - candidate;

        if after_close > self.policy.lookahead_months as i32 {
            Some(closing_year - 1)
        } else if before_open > self.policy.lookback_months as i32 {
            Some(closing_year + 1)
        } else {
            Some(closing_year)
        }
    }
}

fn explicit_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    match text.len() {
        2 => Some(2000 + year),
        4 => Some(year),
        _ => None,
    }
}
