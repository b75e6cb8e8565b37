use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key).as_deref() {
        Some("1") | Some("true") | Some("yes") | Some("on") => true,
        Some("0") | Some("false") | Some("no") | Some("off") => false,
        _ => default,
    }
}

/// Upper bound for the refresh tick: the cache must be refreshed at least once
/// per minute of wall-clock progress to stay current.
pub const MAX_TICK_SECS: u64 = 60;

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub periods: PeriodsConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PERIODWATCH_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("PERIODWATCH_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            periods: PeriodsConfig::from_env_profiled(p),
            cache: CacheConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject settings the worker cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.tick_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "CACHE_TICK_SECS",
                reason: "must be at least 1 second".to_string(),
            });
        }
        if self.cache.tick_secs > MAX_TICK_SECS {
            return Err(ConfigError::Invalid {
                key: "CACHE_TICK_SECS",
                reason: format!(
                    "{}s exceeds {}s; periods would go stale between refreshes",
                    self.cache.tick_secs, MAX_TICK_SECS
                ),
            });
        }
        if self.periods.dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "PERIODS_DIR",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  periods:  dir={}, watch={}", self.periods.dir.display(), self.periods.watch);
        tracing::info!("  cache:    tick={}s", self.cache.tick_secs);
    }
}

// ── Time periods ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodsConfig {
    /// Directory scanned for `*.yml` / `*.yaml` time period definitions.
    pub dir: PathBuf,
    /// Reload definitions when files in `dir` change.
    pub watch: bool,
}

impl PeriodsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            dir: PathBuf::from(profiled_env_or(p, "PERIODS_DIR", "data/timeperiods")),
            watch: profiled_env_bool(p, "PERIODS_WATCH", true),
        }
    }
}

// ── Activity cache ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds between refresh calls issued by the host loop.
    pub tick_secs: u64,
}

impl CacheConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            tick_secs: profiled_env_u64(p, "CACHE_TICK_SECS", 15),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }
}
