//! Console settings loader.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/console.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/replay-console/console.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use console_store::{EvaluationPairing, OrderingMode, StoreConfig};
use console_types::{FilterPatch, FilterState};
use serde::Deserialize;

use crate::observability::SessionEvent;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/console.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "replay-console/console.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
const DEFAULT_BATCH_WINDOW_MS: u64 = 50;
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

/// Merged console settings. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsoleSettings {
    /// Packet batching.
    #[serde(default)]
    pub ingest: IngestSettings,
    /// Initial filter overrides.
    #[serde(default)]
    pub filters: FilterPatch,
    /// Visible-list ordering.
    #[serde(default)]
    pub ordering: OrderingSettings,
    /// Command/result pairing.
    #[serde(default)]
    pub evaluation: EvaluationSettings,
    /// Search availability.
    #[serde(default)]
    pub search: SearchSettings,
}

/// `ingest:` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestSettings {
    /// Batch window in milliseconds; defaults to 50.
    pub batch_window_ms: Option<u64>,
}

/// `ordering:` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderingSettings {
    /// Ordering mode; defaults to execution point.
    pub mode: Option<OrderingMode>,
}

/// `evaluation:` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluationSettings {
    /// How results find their command.
    pub pairing: Option<EvaluationPairing>,
}

/// `search:` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSettings {
    /// Defaults to enabled.
    pub enabled: Option<bool>,
}

impl ConsoleSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            ingest: self.ingest.merge(overlay.ingest),
            filters: merge_filters(self.filters, overlay.filters),
            ordering: OrderingSettings {
                mode: overlay.ordering.mode.or(self.ordering.mode),
            },
            evaluation: EvaluationSettings {
                pairing: overlay.evaluation.pairing.or(self.evaluation.pairing),
            },
            search: SearchSettings {
                enabled: overlay.search.enabled.or(self.search.enabled),
            },
        }
    }

    /// Store configuration derived from these settings.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        let mut filters = FilterState::default();
        filters.apply(self.filters.clone());
        StoreConfig {
            ordering: self.ordering.mode.unwrap_or_default(),
            pairing: self.evaluation.pairing.unwrap_or_default(),
            filters,
        }
    }

    /// Batching window, at least one millisecond.
    #[must_use]
    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(
            self.ingest
                .batch_window_ms
                .unwrap_or(DEFAULT_BATCH_WINDOW_MS)
                .max(1),
        )
    }

    /// Whether search is available.
    #[must_use]
    pub fn search_enabled(&self) -> bool {
        self.search.enabled.unwrap_or(true)
    }
}

impl IngestSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            batch_window_ms: overlay.batch_window_ms.or(self.batch_window_ms),
        }
    }
}

fn merge_filters(base: FilterPatch, overlay: FilterPatch) -> FilterPatch {
    FilterPatch {
        text: overlay.text.or(base.text),
        error: overlay.error.or(base.error),
        warn: overlay.warn.or(base.warn),
        info: overlay.info.or(base.info),
        debug: overlay.debug.or(base.debug),
        log: overlay.log.or(base.log),
        nodemodules: overlay.nodemodules.or(base.nodemodules),
    }
}

/// Load merged console settings (user overrides system).
pub fn load_console_settings() -> ConsoleSettings {
    let (system_path, user_path) = console_settings_paths();
    load_console_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
pub fn console_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_console_settings_from_paths(system: &Path, user: &Path) -> ConsoleSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> ConsoleSettings {
    if !path.exists() {
        return ConsoleSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                event = SessionEvent::SettingsReadFailed.as_str(),
                path = %path.display(),
                error = %error,
                "failed to read console settings file; ignoring"
            );
            return ConsoleSettings::default();
        }
    };
    match serde_yaml::from_str::<ConsoleSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                event = SessionEvent::SettingsParseFailed.as_str(),
                path = %path.display(),
                error = %error,
                "failed to parse console settings yaml; ignoring file"
            );
            ConsoleSettings::default()
        }
    }
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Set config-home override (used by CLI `--conf`).
///
/// The path can be absolute, or relative to `PRJ_ROOT`/cwd.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            event = SessionEvent::ConfigHomeOverrideIgnored.as_str(),
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    if let Some(path) = CONFIG_HOME_OVERRIDE.get() {
        return absolutize(project_root, path.clone());
    }

    let configured = std::env::var("PRJ_CONFIG_HOME")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_HOME_RELATIVE_PATH.to_string());
    absolutize(project_root, PathBuf::from(configured))
}

fn absolutize(project_root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_window_is_clamped() {
        let settings: ConsoleSettings =
            serde_yaml::from_str("ingest:\n  batch_window_ms: 0\n").unwrap();
        assert_eq!(settings.batch_window(), Duration::from_millis(1));
        assert_eq!(
            ConsoleSettings::default().batch_window(),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn store_config_applies_filter_overrides() {
        let settings: ConsoleSettings = serde_yaml::from_str(
            "filters:\n  log: false\n  text: boot\nordering:\n  mode: timestamp\n",
        )
        .unwrap();
        let config = settings.store_config();
        assert!(!config.filters.log);
        assert!(config.filters.error);
        assert_eq!(config.filters.text, "boot");
        assert_eq!(config.ordering, OrderingMode::Timestamp);
        assert_eq!(config.pairing, EvaluationPairing::EvalId);
    }
}
