//! Shared, name-ordered set of the currently defined time periods.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::schema::TimePeriod;

/// Read-only view of the defined time periods.
///
/// Consumers (the activity cache, the evaluator resolving exclusions) only
/// ever read through this trait; ownership stays with the registry.
pub trait PeriodSource: Send + Sync {
    /// Every defined period, in a stable order.
    fn periods(&self) -> Vec<Arc<TimePeriod>>;

    /// Look a period up by name.
    fn find(&self, name: &str) -> Option<Arc<TimePeriod>>;
}

/// In-memory period store shared between the loader, the watcher, and readers.
///
/// Cloning is cheap and yields a handle to the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct PeriodRegistry {
    periods: Arc<RwLock<BTreeMap<String, Arc<TimePeriod>>>>,
}

impl PeriodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding `periods`, keyed by name.
    pub fn from_periods(periods: impl IntoIterator<Item = TimePeriod>) -> Self {
        let registry = Self::new();
        registry.replace_all(
            periods
                .into_iter()
                .map(|p| (p.name.clone(), Arc::new(p)))
                .collect(),
        );
        registry
    }

    /// Swap in a complete new set of periods in one step.
    pub fn replace_all(&self, periods: BTreeMap<String, Arc<TimePeriod>>) {
        *self.periods.write().expect("periods lock poisoned") = periods;
    }

    /// Insert or replace a single period. Returns the previous definition.
    pub fn upsert(&self, period: TimePeriod) -> Option<Arc<TimePeriod>> {
        self.periods
            .write()
            .expect("periods lock poisoned")
            .insert(period.name.clone(), Arc::new(period))
    }

    pub fn remove(&self, name: &str) -> Option<Arc<TimePeriod>> {
        self.periods
            .write()
            .expect("periods lock poisoned")
            .remove(name)
    }

    /// Remove every period loaded from `path`. Returns the removed names.
    pub fn remove_by_path(&self, path: &Path) -> Vec<String> {
        let mut periods = self.periods.write().expect("periods lock poisoned");
        let names: Vec<String> = periods
            .values()
            .filter(|p| p.source.as_deref() == Some(path))
            .map(|p| p.name.clone())
            .collect();
        for name in &names {
            periods.remove(name);
        }
        names
    }

    /// Swap whatever `path` defined for `period` under a single write lock.
    ///
    /// Readers never observe the file's periods as missing while it is
    /// replaced. Returns the names `path` used to define, other than `period`'s.
    pub fn replace_from_path(&self, path: &Path, period: TimePeriod) -> Vec<String> {
        let mut periods = self.periods.write().expect("periods lock poisoned");
        let stale: Vec<String> = periods
            .values()
            .filter(|p| p.source.as_deref() == Some(path) && p.name != period.name)
            .map(|p| p.name.clone())
            .collect();
        for name in &stale {
            periods.remove(name);
        }
        periods.insert(period.name.clone(), Arc::new(period));
        stale
    }

    /// The period named `name`, if it exists and was not loaded from `path`.
    pub fn defined_elsewhere(&self, name: &str, path: &Path) -> Option<Arc<TimePeriod>> {
        self.periods
            .read()
            .expect("periods lock poisoned")
            .get(name)
            .filter(|p| p.source.as_deref() != Some(path))
            .cloned()
    }

    pub fn clear(&self) {
        self.periods.write().expect("periods lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.periods.read().expect("periods lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.read().expect("periods lock poisoned").is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.periods
            .read()
            .expect("periods lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

impl PeriodSource for PeriodRegistry {
    fn periods(&self) -> Vec<Arc<TimePeriod>> {
        self.periods
            .read()
            .expect("periods lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    fn find(&self, name: &str) -> Option<Arc<TimePeriod>> {
        self.periods
            .read()
            .expect("periods lock poisoned")
            .get(name)
            .cloned()
    }
}
