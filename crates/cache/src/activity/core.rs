//! [`PeriodActivityCache`]: throttled refresh and fail-open reads.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, info_span, warn, Span};

use periodwatch_periods::{PeriodSource, RuleEvaluator, TimePeriod, IN_PERIOD};

use super::state::{ActivityState, CacheSnapshot};

/// Period rules have minute granularity; refreshing more often is wasted work.
pub const REFRESH_GRANULARITY_SECS: i64 = 60;

#[derive(Debug, Default)]
struct CacheState {
    /// Period name to "currently active".
    entries: HashMap<String, bool>,
    last_refresh: Option<DateTime<Utc>>,
    /// Whether the source defined any period at the last effective refresh.
    source_had_periods: bool,
}

/// Cached activity of every configured time period.
///
/// Call [`refresh`](PeriodActivityCache::refresh) from the host loop at least
/// once a minute. [`is_active`](PeriodActivityCache::is_active) is safe to call
/// from any thread at any time, including before the first refresh, and never
/// evaluates rules itself.
///
/// A refresh holds the write lock for its whole pass, so readers observe
/// either the complete state before it or the complete state after it.
pub struct PeriodActivityCache {
    source: Arc<dyn PeriodSource>,
    evaluator: Arc<dyn RuleEvaluator>,
    /// Every log line the cache emits is recorded inside this span.
    span: Span,
    state: RwLock<CacheState>,
}

impl PeriodActivityCache {
    /// Create an empty cache over `source`, evaluating with `evaluator`.
    pub fn new(source: Arc<dyn PeriodSource>, evaluator: Arc<dyn RuleEvaluator>) -> Self {
        Self {
            source,
            evaluator,
            span: info_span!("period_cache"),
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Log inside `span` instead of the default `period_cache` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Re-evaluate every period at `now`, at most once per minute.
    ///
    /// A call earlier than one minute after the last effective refresh returns
    /// without any effect; this includes clock steps backwards.
    pub fn refresh(&self, now: DateTime<Utc>) {
        let _entered = self.span.enter();
        let mut state = self.write_state();

        if let Some(last) = state.last_refresh {
            match last.checked_add_signed(Duration::seconds(REFRESH_GRANULARITY_SECS)) {
                Some(next) if now >= next => {}
                _ => return,
            }
        }
        state.last_refresh = Some(now);

        let periods = self.source.periods();
        self.apply(now, &periods, &mut state);

        if periods.is_empty() {
            if state.source_had_periods {
                info!("all time periods were removed from the configuration");
            } else {
                debug!("time period cache refreshed, but no time periods are defined");
            }
        }
        state.source_had_periods = !periods.is_empty();
    }

    /// Evaluate and log every period at the current wall-clock time.
    ///
    /// Unlike [`refresh`](Self::refresh) this is not throttled and does not
    /// move the last refresh timestamp.
    pub fn log_current_periods(&self) {
        self.log_current_periods_at(Utc::now());
    }

    /// [`log_current_periods`](Self::log_current_periods) at an explicit instant.
    pub fn log_current_periods_at(&self, now: DateTime<Utc>) {
        let _entered = self.span.enter();
        let mut state = self.write_state();
        let periods = self.source.periods();
        self.apply(now, &periods, &mut state);
    }

    /// Whether the period named `name` is active, as of the last refresh.
    ///
    /// Periods the cache has no state for are assumed active (24x7), with a
    /// warning so the gap is visible in the log.
    pub fn is_active(&self, name: &str) -> bool {
        let _entered = self.span.enter();
        let cached = self.read_state().entries.get(name).copied();
        match cached {
            Some(active) => active,
            None => {
                warn!(period = %name, "no cached state for time period {}, assuming it is active (24x7)", name);
                true
            }
        }
    }

    /// Like [`is_active`](Self::is_active), for an optional period handle.
    ///
    /// An absent period means "no restriction": active, without a warning.
    pub fn is_active_period(&self, period: Option<&TimePeriod>) -> bool {
        match period {
            Some(p) => self.is_active(&p.name),
            None => true,
        }
    }

    /// Cached state for `name`, without the fail-open default.
    pub fn cached_state(&self, name: &str) -> Option<bool> {
        self.read_state().entries.get(name).copied()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.read_state().last_refresh
    }

    pub fn len(&self) -> usize {
        self.read_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().entries.is_empty()
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        let state = self.read_state();
        CacheSnapshot {
            last_refresh: state.last_refresh,
            periods: state
                .entries
                .iter()
                .map(|(name, active)| (name.clone(), *active))
                .collect(),
        }
    }

    /// One pass over the source: drop vanished periods, then evaluate the rest.
    fn apply(&self, now: DateTime<Utc>, periods: &[Arc<TimePeriod>], state: &mut CacheState) {
        let present: HashSet<&str> = periods.iter().map(|p| p.name.as_str()).collect();
        state.entries.retain(|name, active| {
            let keep = present.contains(name.as_str());
            if !keep {
                info!(
                    period = %name,
                    was_active = *active,
                    "time period {} removed from configuration, dropping cached state",
                    name
                );
            }
            keep
        });

        for period in periods {
            let is_in = match self.evaluator.check_time_against_period(now, period) {
                Ok(code) => code == IN_PERIOD,
                Err(e) => {
                    warn!(
                        period = %period.name,
                        error = %e,
                        "failed to evaluate time period, keeping previous state"
                    );
                    continue;
                }
            };

            match state.entries.get_mut(&period.name) {
                None => {
                    log_transition(&period.name, ActivityState::Unknown, is_in.into());
                    state.entries.insert(period.name.clone(), is_in);
                }
                Some(active) if *active != is_in => {
                    log_transition(&period.name, (*active).into(), is_in.into());
                    *active = is_in;
                }
                Some(_) => {}
            }
        }
    }

    // A panic elsewhere must not take the answers down with it.
    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_transition(name: &str, from: ActivityState, to: ActivityState) {
    info!(
        period = %name,
        from = from.code(),
        to = to.code(),
        "TIMEPERIOD TRANSITION: {};{};{}",
        name,
        from,
        to
    );
}
