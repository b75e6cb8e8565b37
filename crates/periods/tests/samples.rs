//! Integration tests that load every sample period in `data/timeperiods/`
//! and evaluate them at known instants.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use periodwatch_periods::{
    LoadStatus, PeriodLoader, PeriodRegistry, PeriodSource, RuleEvaluator, WeeklyEvaluator,
    IN_PERIOD, OUTSIDE_PERIOD,
};

/// Resolve the samples directory relative to the workspace root.
/// Integration tests run from the crate directory, so we go up two levels.
fn samples_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/timeperiods")
}

fn load_samples() -> PeriodRegistry {
    let loader = PeriodLoader::new(samples_dir(), PeriodRegistry::new());
    let results = loader.load_all().expect("scan samples directory");
    for r in &results {
        assert!(
            matches!(r.status, LoadStatus::Loaded { .. }),
            "{} did not load: {:?}",
            r.path.display(),
            r.status
        );
    }
    loader.registry()
}

fn check(registry: &PeriodRegistry, name: &str, at: DateTime<Utc>) -> i32 {
    let evaluator = WeeklyEvaluator::new(Arc::new(registry.clone()));
    let period = registry.find(name).unwrap_or_else(|| panic!("missing sample {name}"));
    evaluator
        .check_time_against_period(at, &period)
        .unwrap_or_else(|e| panic!("evaluating {name}: {e}"))
}

#[test]
fn all_samples_load() {
    let registry = load_samples();
    assert_eq!(
        registry.names(),
        vec!["24x7", "none", "nonworkhours", "us-holidays", "workhours"]
    );
}

#[test]
fn always_and_never() {
    let registry = load_samples();
    let t = Utc.with_ymd_and_hms(2026, 10, 17, 3, 14, 0).unwrap();
    assert_eq!(check(&registry, "24x7", t), IN_PERIOD);
    assert_eq!(check(&registry, "none", t), OUTSIDE_PERIOD);
}

#[test]
fn workhours_and_nonworkhours_are_complementary_on_weekdays() {
    let registry = load_samples();
    // Wednesday 2026-10-14.
    for hour in 0..24 {
        let t = Utc.with_ymd_and_hms(2026, 10, 14, hour, 30, 0).unwrap();
        assert_ne!(
            check(&registry, "workhours", t),
            check(&registry, "nonworkhours", t),
            "hour {hour}"
        );
    }
}

#[test]
fn workhours_exclude_holidays() {
    let registry = load_samples();
    // Thanksgiving 2026 is a Thursday.
    let thanksgiving = Utc.with_ymd_and_hms(2026, 11, 26, 11, 0, 0).unwrap();
    let next_thursday = Utc.with_ymd_and_hms(2026, 12, 3, 11, 0, 0).unwrap();
    assert_eq!(check(&registry, "workhours", thanksgiving), OUTSIDE_PERIOD);
    assert_eq!(check(&registry, "workhours", next_thursday), IN_PERIOD);
}
