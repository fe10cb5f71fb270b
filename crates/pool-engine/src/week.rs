//! ISO year-week labels (`2024-W38`).
//!
//! Weeks are compared as typed `(year, week)` pairs so that `2024-W9` sorts
//! before `2024-W10`, which string ordering would get wrong.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PoolError;

/// An ISO 8601 week: the ISO week-numbering year and the week within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoWeek {
    year: i32,
    week: u32,
}

impl IsoWeek {
    /// Build a week, checking that `week` exists in `year`.
    pub fn new(year: i32, week: u32) -> Option<Self> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).map(|_| Self { year, week })
    }

    /// The ISO week containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// Monday of this week.
    pub fn monday(&self) -> NaiveDate {
        // Construction guarantees the week exists.
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
            .unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.year, self.week)
    }
}

impl FromStr for IsoWeek {
    type Err = PoolError;

    /// Accepts `YYYY-Www` and the unpadded `YYYY-Ww`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, week) = trimmed
            .split_once("-W")
            .or_else(|| trimmed.split_once("-w"))
            .ok_or_else(|| PoolError::InvalidWeek(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| PoolError::InvalidWeek(s.to_string()))?;
        let week: u32 = week
            .parse()
            .map_err(|_| PoolError::InvalidWeek(s.to_string()))?;
        IsoWeek::new(year, week).ok_or_else(|| PoolError::InvalidWeek(s.to_string()))
    }
}

impl Serialize for IsoWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IsoWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

