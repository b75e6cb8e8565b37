//! Per-period activity state and the serializable cache snapshot.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Activity of a period as it appears in transition log lines.
///
/// `Unknown` is never stored; it only describes a period the cache has not
/// seen yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Unknown,
    Inactive,
    Active,
}

impl ActivityState {
    /// Numeric code used in transition lines: `-1`, `0`, or `1`.
    pub fn code(self) -> i8 {
        match self {
            ActivityState::Unknown => -1,
            ActivityState::Inactive => 0,
            ActivityState::Active => 1,
        }
    }
}

impl From<bool> for ActivityState {
    fn from(active: bool) -> Self {
        if active {
            ActivityState::Active
        } else {
            ActivityState::Inactive
        }
    }
}

impl From<Option<bool>> for ActivityState {
    fn from(cached: Option<bool>) -> Self {
        cached.map_or(ActivityState::Unknown, ActivityState::from)
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Point-in-time copy of the whole cache, taken under a single lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSnapshot {
    /// Instant of the last refresh that was not throttled.
    pub last_refresh: Option<DateTime<Utc>>,
    /// Period name to cached activity.
    pub periods: BTreeMap<String, bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_transition_format() {
        assert_eq!(ActivityState::Unknown.to_string(), "-1");
        assert_eq!(ActivityState::Inactive.to_string(), "0");
        assert_eq!(ActivityState::Active.to_string(), "1");
    }

    #[test]
    fn from_cached_value() {
        assert_eq!(ActivityState::from(None), ActivityState::Unknown);
        assert_eq!(ActivityState::from(Some(false)), ActivityState::Inactive);
        assert_eq!(ActivityState::from(true), ActivityState::Active);
    }

    #[test]
    fn snapshot_serializes_ordered_by_name() {
        let snapshot = CacheSnapshot {
            last_refresh: None,
            periods: BTreeMap::from([("workhours".to_string(), false), ("24x7".to_string(), true)]),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"last_refresh":null,"periods":{"24x7":true,"workhours":false}}"#);
    }
}
