//! Time period definition schema.
//!
//! One YAML document per period:
//!
//! ```yaml
//! name: workhours
//! alias: Standard work hours
//! weekdays:
//!   monday: "09:00-12:00,13:00-17:00"
//!   friday: "09:00-15:00"
//! dates:
//!   2026-12-25: ""
//! exclude: [holidays]
//! utc_offset_minutes: 60
//! ```
//!
//! A date rule replaces the weekday rule for that calendar day; an empty
//! string means the period is inactive the whole day.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{FixedOffset, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{PeriodError, Result};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Day of the week, spelled out in lowercase in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for Day {
    fn from(w: Weekday) -> Self {
        match w {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

/// Half-open range of minutes within a day: `start <= minute < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: u16,
    end: u16,
}

impl TimeRange {
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if end > MINUTES_PER_DAY || start >= end {
            return Err(PeriodError::InvalidRange(format!(
                "{}-{}",
                fmt_minute(start),
                fmt_minute(end)
            )));
        }
        Ok(Self { start, end })
    }

    /// Whether `minute` (minutes since local midnight) is inside the range.
    pub fn contains(&self, minute: u16) -> bool {
        self.start <= minute && minute < self.end
    }

    /// Parse `HH:MM-HH:MM`; `24:00` is accepted as an end time.
    pub fn parse(s: &str) -> Result<Self> {
        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| PeriodError::InvalidRange(s.to_string()))?;
        let start = parse_clock(start).ok_or_else(|| PeriodError::InvalidRange(s.to_string()))?;
        let end = parse_clock(end).ok_or_else(|| PeriodError::InvalidRange(s.to_string()))?;
        Self::new(start, end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", fmt_minute(self.start), fmt_minute(self.end))
    }
}

fn parse_clock(s: &str) -> Option<u16> {
    let (h, m) = s.trim().split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let h: u16 = h.parse().ok()?;
    let m: u16 = m.parse().ok()?;
    match (h, m) {
        (24, 0) => Some(MINUTES_PER_DAY),
        (0..=23, 0..=59) => Some(h * 60 + m),
        _ => None,
    }
}

fn fmt_minute(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Comma-separated list of ranges for one day, e.g. `"09:00-12:00,13:00-17:00"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayRanges(Vec<TimeRange>);

impl DayRanges {
    pub fn contains(&self, minute: u16) -> bool {
        self.0.iter().any(|r| r.contains(minute))
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.0
    }
}

impl std::str::FromStr for DayRanges {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(TimeRange::parse)
            .collect::<Result<Vec<_>>>()
            .map(DayRanges)
    }
}

impl TryFrom<String> for DayRanges {
    type Error = PeriodError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<DayRanges> for String {
    fn from(r: DayRanges) -> Self {
        r.0.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
    }
}

/// A named time period definition.
///
/// The name is the period's identity everywhere else in the workspace; the
/// activity cache keys its entries by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimePeriod {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weekdays: BTreeMap<Day, DayRanges>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dates: BTreeMap<NaiveDate, DayRanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// File the definition was loaded from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl TimePeriod {
    /// A period with no rules (never active).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            weekdays: BTreeMap::new(),
            dates: BTreeMap::new(),
            exclude: Vec::new(),
            utc_offset_minutes: 0,
            source: None,
        }
    }

    /// Set the ranges for a weekday, replacing any existing rule.
    pub fn with_weekday(mut self, day: Day, ranges: &str) -> Result<Self> {
        self.weekdays.insert(day, ranges.parse()?);
        Ok(self)
    }

    /// Set the ranges for a specific date, overriding its weekday rule.
    pub fn with_date(mut self, date: NaiveDate, ranges: &str) -> Result<Self> {
        self.dates.insert(date, ranges.parse()?);
        Ok(self)
    }

    pub fn with_exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Fixed offset used to interpret the period's wall-clock ranges.
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                PeriodError::Validation(format!(
                    "period '{}' has out-of-range utc_offset_minutes {}",
                    self.name, self.utc_offset_minutes
                ))
            })
    }

    /// Structural checks that do not depend on other periods.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PeriodError::Validation(
                "period name must not be empty".to_string(),
            ));
        }
        // `;` separates fields in transition log lines.
        if self.name.chars().any(|c| c.is_whitespace() || c == ';') {
            return Err(PeriodError::Validation(format!(
                "period name '{}' must not contain whitespace or ';'",
                self.name
            )));
        }
        if self.exclude.iter().any(|e| e == &self.name) {
            return Err(PeriodError::Validation(format!(
                "period '{}' excludes itself",
                self.name
            )));
        }
        self.offset()?;
        Ok(())
    }
}
