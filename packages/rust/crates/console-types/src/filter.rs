//! Filter configuration and hide causes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::message::Level;

/// Flat filter configuration: one flag per level, a third-party toggle, and a
/// free-text query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FilterState {
    /// Free-text query (see the text matcher for syntax).
    pub text: String,
    /// Show error messages.
    pub error: bool,
    /// Show warnings.
    pub warn: bool,
    /// Show info messages.
    pub info: bool,
    /// Show debug messages.
    pub debug: bool,
    /// Show log messages.
    pub log: bool,
    /// Show messages emitted from third-party package code.
    pub nodemodules: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            text: String::new(),
            error: true,
            warn: true,
            info: true,
            debug: true,
            log: true,
            nodemodules: true,
        }
    }
}

impl FilterState {
    /// Whether messages of this level filter group are shown.
    #[must_use]
    pub const fn level_enabled(&self, level: FilterLevel) -> bool {
        match level {
            FilterLevel::Error => self.error,
            FilterLevel::Warn => self.warn,
            FilterLevel::Info => self.info,
            FilterLevel::Debug => self.debug,
            FilterLevel::Log => self.log,
        }
    }

    /// Apply a partial update; absent fields keep their value.
    pub fn apply(&mut self, patch: FilterPatch) {
        let FilterPatch {
            text,
            error,
            warn,
            info,
            debug,
            log,
            nodemodules,
        } = patch;
        if let Some(text) = text {
            self.text = text;
        }
        self.error = error.unwrap_or(self.error);
        self.warn = warn.unwrap_or(self.warn);
        self.info = info.unwrap_or(self.info);
        self.debug = debug.unwrap_or(self.debug);
        self.log = log.unwrap_or(self.log);
        self.nodemodules = nodemodules.unwrap_or(self.nodemodules);
    }
}

/// Partial filter update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FilterPatch {
    /// New query text.
    pub text: Option<String>,
    /// New error flag.
    pub error: Option<bool>,
    /// New warning flag.
    pub warn: Option<bool>,
    /// New info flag.
    pub info: Option<bool>,
    /// New debug flag.
    pub debug: Option<bool>,
    /// New log flag.
    pub log: Option<bool>,
    /// New third-party flag.
    pub nodemodules: Option<bool>,
}

impl FilterPatch {
    /// Patch that only changes the query text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Patch that only toggles one level group.
    #[must_use]
    pub fn level(level: FilterLevel, enabled: bool) -> Self {
        let mut patch = Self::default();
        let slot = match level {
            FilterLevel::Error => &mut patch.error,
            FilterLevel::Warn => &mut patch.warn,
            FilterLevel::Info => &mut patch.info,
            FilterLevel::Debug => &mut patch.debug,
            FilterLevel::Log => &mut patch.log,
        };
        *slot = Some(enabled);
        patch
    }
}

/// Level filter groups, one per filter flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterLevel {
    /// Errors.
    Error,
    /// Warnings.
    Warn,
    /// Info.
    Info,
    /// Debug.
    Debug,
    /// Log (also covers traces).
    Log,
}

impl From<Level> for FilterLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => Self::Error,
            Level::Warning => Self::Warn,
            Level::Info => Self::Info,
            Level::Debug => Self::Debug,
            Level::Log | Level::Trace => Self::Log,
        }
    }
}

/// Filter category responsible for hiding a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterCause {
    /// A disabled level flag.
    Level(FilterLevel),
    /// Third-party package code while the node-modules flag is off.
    NodeModules,
    /// The free-text query.
    Text,
}

impl FilterCause {
    /// String form used in counters and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Level(FilterLevel::Error) => "error",
            Self::Level(FilterLevel::Warn) => "warn",
            Self::Level(FilterLevel::Info) => "info",
            Self::Level(FilterLevel::Debug) => "debug",
            Self::Level(FilterLevel::Log) => "log",
            Self::NodeModules => "nodemodules",
            Self::Text => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_present_fields() {
        let mut filters = FilterState::default();
        filters.apply(FilterPatch::level(FilterLevel::Log, false));
        assert!(!filters.log);
        assert!(filters.error && filters.warn && filters.info && filters.debug);

        filters.apply(FilterPatch::text("needle"));
        assert_eq!(filters.text, "needle");
        assert!(!filters.log);
    }

    #[test]
    fn trace_level_uses_log_flag() {
        assert_eq!(FilterLevel::from(Level::Trace), FilterLevel::Log);
        assert_eq!(FilterLevel::from(Level::Warning), FilterLevel::Warn);
    }

    #[test]
    fn patch_deserializes_partial_json() {
        let patch: FilterPatch = serde_json::from_str(r#"{"warn": false}"#).unwrap();
        assert_eq!(patch.warn, Some(false));
        assert_eq!(patch.text, None);
    }
}
