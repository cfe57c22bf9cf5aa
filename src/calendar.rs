use chrono::{Datelike, NaiveDate};

use crate::error::{LedgerError, Result};
use crate::reports::DaySummary;

/// Timestamps are stored as four-digit `%Y` text.
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// A calendar month, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidMonth(month));
        }
        if !YEARS.contains(&year) {
            return Err(LedgerError::InvalidDate(format!("{year}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    pub fn current() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || LedgerError::InvalidDate(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days(self) -> u32 {
        let next = self.next().first_day();
        next.signed_duration_since(self.first_day()).num_days() as u32
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year.saturating_add(1), month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self { year: self.year.saturating_sub(1), month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn title(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    pub fn dates(self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        (0..self.days()).filter_map(move |d| first.checked_add_days(chrono::Days::new(d as u64)))
    }
}

pub fn parse_month_opt(month: Option<&str>) -> Result<YearMonth> {
    match month {
        Some(m) => YearMonth::parse(m),
        None => Ok(YearMonth::current()),
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| LedgerError::InvalidDate(s.to_string()))
}

/// Monday-first weeks covering the month; cells outside it are `None`.
pub fn month_grid(ym: YearMonth) -> Vec<[Option<NaiveDate>; 7]> {
    let mut weeks = Vec::new();
    let mut week = [None; 7];
    for date in ym.dates() {
        let col = date.weekday().num_days_from_monday() as usize;
        week[col] = Some(date);
        if col == 6 {
            weeks.push(week);
            week = [None; 7];
        }
    }
    if week.iter().any(Option::is_some) {
        weeks.push(week);
    }
    weeks
}

/// Spread a sparse daily summary over every day of the month, filling
/// missing days with zero.
pub fn daily_series(ym: YearMonth, summary: &[DaySummary]) -> Vec<DaySummary> {
    (1..=ym.days())
        .map(|day| {
            summary
                .iter()
                .find(|s| s.day == day)
                .cloned()
                .unwrap_or(DaySummary {
                    day,
                    income: 0.0,
                    expense: 0.0,
                })
        })
        .collect()
}
