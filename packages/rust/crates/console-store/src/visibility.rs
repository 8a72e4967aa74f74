//! Visibility classification and per-cause hidden counters.
//!
//! Checks run in a fixed order and the first one that hides a message names
//! the cause: unfilterable bypass, level, third-party code, then text. The
//! text query runs last so category hides are never attributed to search.

use console_types::{FilterCause, FilterLevel, FilterState, Message};
use serde::{Deserialize, Serialize};

use crate::text_match::TextQuery;

/// Outcome of classifying one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Shown.
    Visible,
    /// Hidden by the named filter.
    Hidden(FilterCause),
}

/// Filter state with its query pre-parsed.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    state: FilterState,
    query: TextQuery,
}

impl CompiledFilters {
    /// Compile a filter state.
    #[must_use]
    pub fn new(state: FilterState) -> Self {
        let query = TextQuery::parse(&state.text);
        Self { state, query }
    }

    /// Underlying flags.
    #[must_use]
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Parsed text query.
    #[must_use]
    pub fn query(&self) -> &TextQuery {
        &self.query
    }

    /// Classify a message.
    #[must_use]
    pub fn classify(&self, message: &Message) -> Visibility {
        if message.kind.is_unfilterable() {
            return Visibility::Visible;
        }
        if message.source.is_level_filtered() {
            let level = FilterLevel::from(message.level);
            if !self.state.level_enabled(level) {
                return Visibility::Hidden(FilterCause::Level(level));
            }
        }
        if !self.state.nodemodules
            && message
                .frame
                .as_ref()
                .is_some_and(console_types::Frame::is_third_party)
        {
            return Visibility::Hidden(FilterCause::NodeModules);
        }
        if !self.query.matches(message) {
            return Visibility::Hidden(FilterCause::Text);
        }
        Visibility::Visible
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

/// Classify a message against a filter state.
#[must_use]
pub fn classify(message: &Message, filters: &FilterState) -> Visibility {
    CompiledFilters::new(filters.clone()).classify(message)
}

/// Hidden-message counters, overall and per cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredCounts {
    /// Every hidden message.
    pub global: usize,
    /// Hidden by the error flag.
    pub error: usize,
    /// Hidden by the warning flag.
    pub warn: usize,
    /// Hidden by the info flag.
    pub info: usize,
    /// Hidden by the debug flag.
    pub debug: usize,
    /// Hidden by the log flag.
    pub log: usize,
    /// Hidden as third-party code.
    pub nodemodules: usize,
    /// Hidden by the text query.
    pub text: usize,
}

impl FilteredCounts {
    fn slot(&mut self, cause: FilterCause) -> &mut usize {
        match cause {
            FilterCause::Level(FilterLevel::Error) => &mut self.error,
            FilterCause::Level(FilterLevel::Warn) => &mut self.warn,
            FilterCause::Level(FilterLevel::Info) => &mut self.info,
            FilterCause::Level(FilterLevel::Debug) => &mut self.debug,
            FilterCause::Level(FilterLevel::Log) => &mut self.log,
            FilterCause::NodeModules => &mut self.nodemodules,
            FilterCause::Text => &mut self.text,
        }
    }

    /// Count one more hidden message.
    pub fn record(&mut self, cause: FilterCause) {
        self.global += 1;
        *self.slot(cause) += 1;
    }

    /// Forget one hidden message.
    pub fn forget(&mut self, cause: FilterCause) {
        let slot = self.slot(cause);
        if *slot == 0 {
            return;
        }
        *slot -= 1;
        self.global = self.global.saturating_sub(1);
    }

    /// Counter value for a cause.
    #[must_use]
    pub fn for_cause(&self, cause: FilterCause) -> usize {
        let mut copy = *self;
        *copy.slot(cause)
    }
}
