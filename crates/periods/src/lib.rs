//! Time period definitions and the rule engine behind them.
//!
//! This crate provides:
//! - YAML time period definitions with weekday, date, and exclusion rules
//! - A shared in-memory registry implementing [`PeriodSource`]
//! - [`WeeklyEvaluator`], answering whether a timestamp falls inside a period
//! - Filesystem loader with hot-reload via `notify` watcher

pub mod error;
pub mod evaluator;
pub mod loader;
pub mod registry;
pub mod schema;

pub use error::{PeriodError, Result};
pub use evaluator::{RuleEvaluator, WeeklyEvaluator, IN_PERIOD, OUTSIDE_PERIOD};
pub use loader::{LoadResult, LoadStatus, PeriodLoader};
pub use registry::{PeriodRegistry, PeriodSource};
pub use schema::{Day, DayRanges, TimePeriod, TimeRange};
