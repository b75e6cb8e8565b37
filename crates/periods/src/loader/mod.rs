//! Filesystem period loader with hot-reload via `notify` watcher.
//!
//! Scans the periods directory for YAML files (one period per file) and
//! publishes the result into a [`PeriodRegistry`](crate::registry::PeriodRegistry).
//! The watcher keeps the registry in sync with create, modify, and delete events.

mod core;
mod status;
mod watcher;


pub use self::core::{read_period_file, PeriodLoader};
pub use self::status::{LoadResult, LoadStatus};
