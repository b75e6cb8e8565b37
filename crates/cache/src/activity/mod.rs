//! Cached activity state for all configured time periods.
//!
//! Evaluating a period's rules is comparatively expensive, and the answer only
//! changes at minute granularity, so [`PeriodActivityCache`] evaluates every
//! period at most once per minute and serves reads from the stored result.
//! Every state change is logged as a `TIMEPERIOD TRANSITION: name;from;to` line.

mod core;
mod state;


pub use self::core::{PeriodActivityCache, REFRESH_GRANULARITY_SECS};
pub use self::state::{ActivityState, CacheSnapshot};
