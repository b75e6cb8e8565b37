//! The cache driven by real period files and the weekly evaluator.

use std::fs;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use periodwatch_cache::PeriodActivityCache;
use periodwatch_periods::{PeriodLoader, PeriodRegistry, PeriodSource, WeeklyEvaluator};

const ALWAYS: &str = r#"
name: 24x7
weekdays:
  monday: "00:00-24:00"
  tuesday: "00:00-24:00"
  wednesday: "00:00-24:00"
  thursday: "00:00-24:00"
  friday: "00:00-24:00"
  saturday: "00:00-24:00"
  sunday: "00:00-24:00"
"#;

const WORKHOURS: &str = r#"
name: workhours
weekdays:
  monday: "09:00-17:00"
  tuesday: "09:00-17:00"
exclude: [lunch]
"#;

const LUNCH: &str = r#"
name: lunch
weekdays:
  monday: "12:00-13:00"
"#;

struct Setup {
    _dir: TempDir,
    loader: PeriodLoader,
    cache: PeriodActivityCache,
}

fn setup() -> Setup {
    let dir = TempDir::new().expect("create tempdir");
    fs::write(dir.path().join("24x7.yml"), ALWAYS).unwrap();
    fs::write(dir.path().join("workhours.yml"), WORKHOURS).unwrap();
    fs::write(dir.path().join("lunch.yml"), LUNCH).unwrap();

    let registry = PeriodRegistry::new();
    let loader = PeriodLoader::new(dir.path().to_path_buf(), registry.clone());
    loader.load_all().unwrap();

    let source: Arc<dyn PeriodSource> = Arc::new(registry);
    let evaluator = Arc::new(WeeklyEvaluator::new(Arc::clone(&source)));
    let cache = PeriodActivityCache::new(source, evaluator);
    Setup {
        _dir: dir,
        loader,
        cache,
    }
}

/// 2026-10-12 is a Monday.
fn monday(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 12, h, m, 0).unwrap()
}

#[test]
fn follows_a_working_day() {
    let s = setup();

    s.cache.refresh(monday(8, 30));
    assert!(s.cache.is_active("24x7"));
    assert!(!s.cache.is_active("workhours"));
    assert!(!s.cache.is_active("lunch"));

    s.cache.refresh(monday(9, 0));
    assert!(s.cache.is_active("workhours"));

    s.cache.refresh(monday(12, 15));
    assert!(!s.cache.is_active("workhours"));
    assert!(s.cache.is_active("lunch"));

    s.cache.refresh(monday(13, 0));
    assert!(s.cache.is_active("workhours"));
    assert!(!s.cache.is_active("lunch"));

    s.cache.refresh(monday(17, 0));
    assert!(!s.cache.is_active("workhours"));
    assert!(s.cache.is_active("24x7"));
}

#[test]
fn answers_stay_stale_between_refreshes() {
    let s = setup();
    s.cache.refresh(monday(8, 59));
    // Within the throttle window the 09:00 boundary is not picked up yet.
    s.cache.refresh(monday(8, 59) + chrono::Duration::seconds(30));
    assert!(!s.cache.is_active("workhours"));

    s.cache.refresh(monday(9, 0) + chrono::Duration::seconds(30));
    assert!(s.cache.is_active("workhours"));
}

#[test]
fn reload_after_file_deletion_prunes_entry() {
    let s = setup();
    s.cache.refresh(monday(10, 0));
    assert_eq!(s.cache.len(), 3);

    fs::remove_file(s.loader.periods_dir().join("24x7.yml")).unwrap();
    s.loader.load_all().unwrap();
    s.cache.refresh(monday(10, 1));

    assert_eq!(s.cache.len(), 2);
    assert_eq!(s.cache.cached_state("24x7"), None);
    // Unknown again, so fail-open.
    assert!(s.cache.is_active("24x7"));
}

#[test]
fn snapshot_serializes_current_state() {
    let s = setup();
    s.cache.refresh(monday(10, 0));

    let json = serde_json::to_value(s.cache.snapshot()).unwrap();
    assert_eq!(json["periods"]["24x7"], true);
    assert_eq!(json["periods"]["workhours"], true);
    assert_eq!(json["periods"]["lunch"], false);
    assert!(json["last_refresh"].is_string());
}
