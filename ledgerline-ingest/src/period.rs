//! Statement period inference from header text.
//!
//! Used only when the document metadata declares no period. Patterns are
//! tried in priority order over the whole document; the first hit wins.

use anyhow::Result;
use chrono::NaiveDate;
use ledgerline_core::{StatementPeriod, month_from_name};
use regex::{Captures, Regex};

const MONTH_ABBR: &str = r"JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC";
const MONTH_FULL: &str =
    r"JANUARY|FEBRUARY|MARCH|APRIL|MAY|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER";

#[derive(Debug, Clone)]
pub struct PeriodScanner {
    range: Regex,
    statement_date: Regex,
    payment_due: Regex,
    year_summary: Regex,
    month_year: Regex,
}

impl PeriodScanner {
    pub fn new() -> Result<Self> {
        // 01/01/2024 - 31/01/2024, 01 JAN 2024 TO 31 JAN 2024
        let date = r"(\d{1,2})[/ -](\d{1,2}|[A-Z]{3,9})[/ -](\d{4})";
        let range = Regex::new(&format!(
            r"(?i)(?P<start>{date})\s*(?:-|–|TO|HINGGA|UNTIL)\s*(?P<end>{date})"
        ))?;

        let statement_date = Regex::new(&format!(
            concat!(
                r"(?is)STATEMENT\s+DATE.{{0,300}}?",
                r"\b(?P<d>\d{{1,2}})\s+(?P<m>{abbr})[A-Z]*\s+(?P<y>\d{{2}}(?:\d{{2}})?)\b"
            ),
            abbr = MONTH_ABBR
        ))?;

        let payment_due = Regex::new(&format!(
            r"(?i)PAYMENT\s+DUE\s+DATE.*?\b(?P<d>\d{{1,2}})\s+(?P<m>{full}|{abbr})\s+(?P<y>20\d{{2}})\b",
            full = MONTH_FULL,
            abbr = MONTH_ABBR
        ))?;

        let year_summary = Regex::new(r"(?i)\b(?P<y>20\d{2})\s+YEAR\s+END\s+SUMMARY")?;

        let month_year = Regex::new(&format!(
            r"(?i)\b(?P<m>{full})\s+(?P<y>20\d{{2}})\b",
            full = MONTH_FULL
        ))?;

        Ok(Self {
            range,
            statement_date,
            payment_due,
            year_summary,
            month_year,
        })
    }

    pub fn scan<S: AsRef<str>>(&self, lines: &[S]) -> Option<StatementPeriod> {
        let text = lines.iter().map(|l| l.as_ref()).collect::<Vec<&str>>().join("\n");

        self.explicit_range(&text)
            .or_else(|| self.from_statement_date(&text))
            .or_else(|| self.from_payment_due(&text))
            .or_else(|| {
                let caps = self.year_summary.captures(&text)?;
                StatementPeriod::year(caps["y"].parse().ok()?)
            })
            .or_else(|| {
                let caps = self.month_year.captures(&text)?;
                StatementPeriod::month(caps["y"].parse().ok()?, month_from_name(&caps["m"])?)
            })
    }

    fn explicit_range(&self, text: &str) -> Option<StatementPeriod> {
        self.range.captures_iter(text).find_map(|caps| {
            let start = parse_loose_date(&caps["start"])?;
            let end = parse_loose_date(&caps["end"])?;
            StatementPeriod::new(start, end).ok()
        })
    }

    fn from_statement_date(&self, text: &str) -> Option<StatementPeriod> {
        let caps = self.statement_date.captures(text)?;
        Some(StatementPeriod::cycle_ending(day_month_year(&caps)?))
    }

    fn from_payment_due(&self, text: &str) -> Option<StatementPeriod> {
        let caps = self.payment_due.captures(text)?;
        Some(StatementPeriod::cycle_ending(day_month_year(&caps)?))
    }
}

fn day_month_year(caps: &Captures<'_>) -> Option<NaiveDate> {
    let day: u32 = caps["d"].parse().ok()?;
    let month = month_from_name(&caps["m"])?;
    let year = match &caps["y"] {
        y if y.len() == 2 => 2000 + y.parse::<i32>().ok()?,
        y => y.parse().ok()?,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `31/01/2024`, `31-01-2024` or `31 JAN 2024`.
fn parse_loose_date(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split(['/', ' ', '-']).filter(|p| !p.is_empty()).collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };
    let month = month.parse().ok().or_else(|| month_from_name(month))?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}
