//! Filesystem event handler for the notify watcher (hot-reload).

use std::path::Path;

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tracing::{info, warn};

use crate::registry::PeriodRegistry;

use super::core::{is_dotfile, is_period_file, read_period_file};

/// Handle a single filesystem event from the notify watcher.
pub(super) fn handle_fs_event(event: &Event, registry: &PeriodRegistry) {
    for path in &event.paths {
        if !is_period_file(path) || is_dotfile(path) {
            continue;
        }

        match &event.kind {
            EventKind::Create(CreateKind::File)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_)) => {
                if path.exists() {
                    reload_file(path, registry);
                } else {
                    // Rename away from this path.
                    remove_file(path, registry);
                }
            }
            EventKind::Remove(RemoveKind::File) => remove_file(path, registry),
            _ => {}
        }
    }
}

/// Re-parse `path` and upsert its period, keeping the old version on error.
pub(super) fn reload_file(path: &Path, registry: &PeriodRegistry) {
    match read_period_file(path) {
        Ok(period) => {
            if let Some(existing) = registry.defined_elsewhere(&period.name, path) {
                let defined_in = existing
                    .source
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                warn!(
                    period = %period.name,
                    path = %path.display(),
                    defined_in = %defined_in,
                    "period name already defined in another file, ignoring change"
                );
                return;
            }
            let name = period.name.clone();
            // The file may have renamed its period.
            for old in registry.replace_from_path(path, period) {
                info!(period = %old, path = %path.display(), "removed renamed time period");
            }
            info!(period = %name, path = %path.display(), "hot-reloaded time period");
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to parse period during hot-reload, keeping previous version"
            );
        }
    }
}

pub(super) fn remove_file(path: &Path, registry: &PeriodRegistry) {
    for name in registry.remove_by_path(path) {
        info!(period = %name, path = %path.display(), "removed time period after file deletion");
    }
}
