//! Core [`PeriodLoader`] struct: filesystem-backed period loading with optional hot-reload.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::error::{PeriodError, Result};
use crate::registry::PeriodRegistry;
use crate::schema::TimePeriod;

use super::status::{LoadResult, LoadStatus};
use super::watcher::handle_fs_event;

/// Parse and validate a single period file.
///
/// The returned period records `path` as its source so the watcher can drop
/// it again when the file is deleted.
pub fn read_period_file(path: &Path) -> Result<TimePeriod> {
    let contents = fs::read_to_string(path)?;
    let mut period: TimePeriod = serde_yaml::from_str(&contents)?;
    period.validate()?;
    period.source = Some(path.to_path_buf());
    Ok(period)
}

pub(super) fn is_period_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false)
}

pub(super) fn is_dotfile(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Filesystem-backed period loader with optional hot-reload.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files and publishes
/// the parsed periods into a shared [`PeriodRegistry`] keyed by name.
pub struct PeriodLoader {
    /// Root directory containing period YAML files.
    periods_dir: PathBuf,
    /// Registry the loaded periods are published into.
    registry: PeriodRegistry,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl PeriodLoader {
    /// Create a new loader for the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist.
    pub fn new(periods_dir: PathBuf, registry: PeriodRegistry) -> Self {
        if !periods_dir.exists() {
            if let Err(e) = fs::create_dir_all(&periods_dir) {
                warn!(path = %periods_dir.display(), error = %e, "failed to create periods directory");
            }
        }
        Self {
            periods_dir,
            registry,
            _watcher: None,
        }
    }

    /// Recursively scan the periods directory and load all YAML files.
    ///
    /// Dotfiles and non-YAML files are skipped. Parse errors are reported
    /// per-file but do not abort the scan. Files are visited in path order;
    /// a file redefining an already loaded name is reported as failed.
    ///
    /// The registry is replaced in one step with everything that loaded.
    pub fn load_all(&self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        let mut loaded = BTreeMap::new();
        self.scan_dir_recursive(&self.periods_dir, &mut loaded, &mut results)?;

        for period in loaded.values() {
            for excluded in &period.exclude {
                if !loaded.contains_key(excluded) {
                    warn!(period = %period.name, excluded = %excluded, "period excludes an undefined period");
                }
            }
        }

        info!(count = loaded.len(), path = %self.periods_dir.display(), "loaded time periods");
        self.registry.replace_all(loaded);
        Ok(results)
    }

    fn scan_dir_recursive(
        &self,
        dir: &Path,
        loaded: &mut BTreeMap<String, Arc<TimePeriod>>,
        results: &mut Vec<LoadResult>,
    ) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        paths.sort();

        for path in paths {
            if is_dotfile(&path) {
                if path.is_file() {
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Skipped {
                            reason: "dotfile".to_string(),
                        },
                    });
                }
                continue;
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, loaded, results)?;
                continue;
            }

            if !is_period_file(&path) {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            let parsed = read_period_file(&path).and_then(|period| {
                match loaded.get(&period.name) {
                    Some(existing) => Err(PeriodError::Validation(format!(
                        "period '{}' already defined in {}",
                        period.name,
                        existing
                            .source
                            .as_deref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default()
                    ))),
                    None => Ok(period),
                }
            });

            match parsed {
                Ok(period) => {
                    let name = period.name.clone();
                    info!(period = %name, path = %path.display(), "loaded time period");
                    loaded.insert(name.clone(), Arc::new(period));
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded { name },
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load period file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(())
    }

    /// Start a filesystem watcher with 500ms poll interval.
    ///
    /// On file create/modify the period is re-parsed and upserted.
    /// On file delete the periods loaded from that file are removed.
    /// Parse errors are logged as warnings; the previous version is kept.
    pub fn watch(&mut self) -> Result<()> {
        let registry = self.registry.clone();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => handle_fs_event(&event, &registry),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        watcher.watch(&self.periods_dir, RecursiveMode::Recursive)?;

        let _ = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %self.periods_dir.display(), "watching periods directory for changes (recursive)");
        self._watcher = Some(watcher);
        Ok(())
    }

    /// Get the periods directory path.
    pub fn periods_dir(&self) -> &Path {
        &self.periods_dir
    }

    /// Get a handle to the registry this loader publishes into.
    pub fn registry(&self) -> PeriodRegistry {
        self.registry.clone()
    }
}
