//! Rule evaluation: does a timestamp fall inside a time period?
//!
//! Evaluators follow the classic monitoring-engine convention of returning
//! [`IN_PERIOD`] (`0`) when the timestamp is inside the period and a non-zero
//! value otherwise. Callers must compare against [`IN_PERIOD`], never treat the
//! result as a boolean.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::error::{PeriodError, Result};
use crate::registry::PeriodSource;
use crate::schema::{Day, TimePeriod};

/// Returned when the timestamp is inside the period.
pub const IN_PERIOD: i32 = 0;

/// Returned when the timestamp is outside the period.
pub const OUTSIDE_PERIOD: i32 = 1;

/// Exclusion chains deeper than this are treated as cycles.
const MAX_EXCLUDE_DEPTH: usize = 16;

/// Evaluates a period's rule set at a point in time.
pub trait RuleEvaluator: Send + Sync {
    /// Returns [`IN_PERIOD`] if `at` falls inside `period`, [`OUTSIDE_PERIOD`] otherwise.
    fn check_time_against_period(&self, at: DateTime<Utc>, period: &TimePeriod) -> Result<i32>;
}

/// Evaluator for weekday/date range rules with exclusions.
///
/// Excluded periods are resolved by name through the [`PeriodSource`], so an
/// exclusion always sees the current definition of the excluded period.
pub struct WeeklyEvaluator {
    source: Arc<dyn PeriodSource>,
}

impl WeeklyEvaluator {
    pub fn new(source: Arc<dyn PeriodSource>) -> Self {
        Self { source }
    }

    /// `seen` memoizes excluded periods already resolved at `at`, so shared
    /// exclusions are evaluated once per call however often they are reached.
    fn contains(
        &self,
        at: DateTime<Utc>,
        period: &TimePeriod,
        depth: usize,
        seen: &mut HashMap<String, bool>,
    ) -> Result<bool> {
        if depth > MAX_EXCLUDE_DEPTH {
            return Err(PeriodError::ExcludeDepth {
                period: period.name.clone(),
            });
        }

        let local = at.with_timezone(&period.offset()?);
        let minute = (local.hour() * 60 + local.minute()) as u16;

        let ranges = period
            .dates
            .get(&local.date_naive())
            .or_else(|| period.weekdays.get(&Day::from(local.weekday())));
        if !ranges.is_some_and(|r| r.contains(minute)) {
            return Ok(false);
        }

        for name in &period.exclude {
            if let Some(&inside) = seen.get(name) {
                if inside {
                    return Ok(false);
                }
                continue;
            }
            let excluded = self
                .source
                .find(name)
                .ok_or_else(|| PeriodError::UnknownExclude {
                    period: period.name.clone(),
                    excluded: name.clone(),
                })?;
            let inside = self.contains(at, &excluded, depth + 1, seen)?;
            seen.insert(name.clone(), inside);
            if inside {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

impl RuleEvaluator for WeeklyEvaluator {
    fn check_time_against_period(&self, at: DateTime<Utc>, period: &TimePeriod) -> Result<i32> {
        if self.contains(at, period, 0, &mut HashMap::new())? {
            Ok(IN_PERIOD)
        } else {
            Ok(OUTSIDE_PERIOD)
        }
    }
}
