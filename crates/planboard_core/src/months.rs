//! Calendar-month arithmetic for plan spans and monthly task buckets.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::{Date, Month};

/// A calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    /// `None` unless `year` is in 1..=9999 and `month` in 1..=12.
    pub fn new(year: i32, month: u8) -> Option<Self> {
        ((1..=9999).contains(&year) && (1..=12).contains(&month)).then_some(Self { year, month })
    }

    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// The following month, `None` past 9999-12.
    pub fn next(&self) -> Option<Self> {
        self.plus_months(1)
    }

    pub fn plus_months(&self, offset: u32) -> Option<Self> {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(offset);
        let year = i32::try_from(index / 12).ok()?;
        let month = u8::try_from(index % 12 + 1).ok()?;
        Self::new(year, month)
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: YearMonth) -> i64 {
        (i64::from(other.year) - i64::from(self.year)) * 12 + i64::from(other.month)
            - i64::from(self.month)
    }

    pub fn contains_date(&self, date: Date) -> bool {
        Self::of(date) == *self
    }

    pub fn first_day(&self) -> Option<Date> {
        let month = Month::try_from(self.month).ok()?;
        Date::from_calendar_date(self.year, month, 1).ok()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseYearMonthError(String);

impl fmt::Display for ParseYearMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid year-month '{}', expected YYYY-MM", self.0)
    }
}

impl std::error::Error for ParseYearMonthError {}

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || ParseYearMonthError(raw.to_string());
        let (year, month) = raw.trim().split_once('-').ok_or_else(err)?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        if month.is_empty() || month.len() > 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u8>().map_err(|_| err())?;
        YearMonth::new(year, month).ok_or_else(err)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Every month from `start` to `end`, both inclusive. Empty when `start > end`.
pub fn month_range(start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
    if start > end {
        return Vec::new();
    }
    let len = u32::try_from(start.months_until(end)).unwrap_or(0) + 1;
    (0..len)
        .map_while(|offset| start.plus_months(offset))
        .collect()
}

/// String form of [`month_range`]. Blank or malformed bounds yield an empty range.
pub fn expand_months(start: &str, end: &str) -> Vec<YearMonth> {
    match (start.parse::<YearMonth>(), end.parse::<YearMonth>()) {
        (Ok(start), Ok(end)) => month_range(start, end),
        _ => Vec::new(),
    }
}

pub fn months_between(start: YearMonth, end: YearMonth) -> i64 {
    start.months_until(end)
}
