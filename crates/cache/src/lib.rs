//! Minute-granularity cache of time period activity.
//!
//! Answers "is period X active right now?" from memory. The host loop calls
//! [`PeriodActivityCache::refresh`] on a timer; readers on any thread call
//! [`PeriodActivityCache::is_active`] and never trigger rule evaluation.

pub mod activity;

pub use activity::{ActivityState, CacheSnapshot, PeriodActivityCache, REFRESH_GRANULARITY_SECS};
