//! Incremental text search over the visible messages.

use std::collections::HashMap;

use console_types::MessageId;
use serde::Serialize;

use crate::observability::StoreEvent;
use crate::state::ConsoleState;
use crate::text_match::TextQuery;

/// Search query, results, and the selected result.
#[derive(Debug, Clone)]
pub struct SearchState {
    query: TextQuery,
    results: Vec<MessageId>,
    index: Option<usize>,
    shown: bool,
    memo: HashMap<MessageId, bool>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: TextQuery::parse(""),
            results: Vec::new(),
            index: None,
            shown: false,
            memo: HashMap::new(),
        }
    }
}

/// Consumer-facing copy of a search state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchView {
    /// Query as typed.
    pub query: String,
    /// Matching visible ids, in display order.
    pub results: Vec<MessageId>,
    /// Selected position in `results`.
    pub index: Option<usize>,
    /// Whether the search bar is open.
    pub shown: bool,
}

impl SearchState {
    /// Run a new query against `state`.
    ///
    /// The selected message keeps its selection when it still matches.
    pub fn search(&mut self, query: &str, state: &ConsoleState) {
        if query != self.query.raw() {
            self.query = TextQuery::parse(query);
            self.memo.clear();
        }
        self.refresh(state);
    }

    /// Re-run the current query after the visible set changed.
    pub fn refresh(&mut self, state: &ConsoleState) {
        let selected = self.selected();
        let mut evaluated = 0_usize;
        if self.query.is_pass_through() {
            self.results.clear();
        } else {
            let Self {
                query,
                memo,
                results,
                ..
            } = self;
            results.clear();
            for message in state.visible_messages() {
                let hit = *memo.entry(message.id).or_insert_with(|| {
                    evaluated += 1;
                    query.matches(message)
                });
                if hit {
                    results.push(message.id);
                }
            }
            memo.retain(|id, _| state.message(*id).is_some());
        }
        self.reselect(selected);
        tracing::debug!(
            event = StoreEvent::SearchRecomputed.as_str(),
            query = self.query.raw(),
            results = self.results.len(),
            evaluated,
            index = ?self.index,
            "search results recomputed"
        );
    }

    /// Take the query, results and memo of a copy recomputed elsewhere.
    ///
    /// Selection and bar visibility stay as they are on `self`, so navigation
    /// made while the copy was computing survives.
    pub fn adopt(&mut self, computed: SearchState) {
        let selected = self.selected();
        self.query = computed.query;
        self.results = computed.results;
        self.memo = computed.memo;
        self.reselect(selected);
    }

    fn reselect(&mut self, selected: Option<MessageId>) {
        self.index = match selected.and_then(|id| self.results.iter().position(|r| *r == id)) {
            Some(position) => Some(position),
            None if self.results.is_empty() => None,
            None => Some(0),
        };
    }

    /// Select the next result, wrapping around.
    pub fn go_to_next(&mut self) -> Option<MessageId> {
        let len = self.results.len();
        if len == 0 {
            return None;
        }
        self.index = Some(self.index.map_or(0, |index| (index + 1) % len));
        self.selected()
    }

    /// Select the previous result, wrapping around.
    pub fn go_to_previous(&mut self) -> Option<MessageId> {
        let len = self.results.len();
        if len == 0 {
            return None;
        }
        self.index = Some(self.index.map_or(len - 1, |index| (index + len - 1) % len));
        self.selected()
    }

    /// Open the search bar.
    pub fn show(&mut self) {
        self.shown = true;
    }

    /// Close the search bar; the query and results are kept.
    pub fn hide(&mut self) {
        self.shown = false;
    }

    /// Selected message.
    #[must_use]
    pub fn selected(&self) -> Option<MessageId> {
        self.index.and_then(|index| self.results.get(index).copied())
    }

    /// Query as typed.
    #[must_use]
    pub fn query(&self) -> &str {
        self.query.raw()
    }

    /// Matching visible ids, in display order.
    #[must_use]
    pub fn results(&self) -> &[MessageId] {
        &self.results
    }

    /// Selected position.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Whether the search bar is open.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Owned copy for consumers.
    #[must_use]
    pub fn view(&self) -> SearchView {
        SearchView {
            query: self.query.raw().to_string(),
            results: self.results.clone(),
            index: self.index,
            shown: self.shown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::state::Command;
    use console_types::{
        ConsoleCall, ExecutionPoint, Level, MessageDraft, MessageKind, MessageSource,
    };

    fn state_with(texts: &[&str]) -> ConsoleState {
        let drafts = texts
            .iter()
            .zip(1_u64..)
            .map(|(text, point)| {
                MessageDraft::new(
                    MessageKind::ConsoleLog {
                        call: ConsoleCall::Log,
                    },
                    Level::Log,
                    MessageSource::ConsoleApi,
                    *text,
                )
                .at_point(ExecutionPoint::from(point), point as f64)
            })
            .collect();
        let mut ids = SequentialIds::default();
        ConsoleState::default()
            .apply(Command::AddMessages(drafts), &mut ids)
            .0
    }

    #[test]
    fn navigation_wraps() {
        let state = state_with(&["a1", "a2", "a3"]);
        let mut search = SearchState::default();
        search.search("a", &state);
        assert_eq!(search.index(), Some(0));
        assert_eq!(search.go_to_previous(), Some(MessageId(3)));
        assert_eq!(search.go_to_next(), Some(MessageId(1)));
        assert_eq!(search.go_to_next(), Some(MessageId(2)));
    }

    #[test]
    fn empty_results_have_no_index() {
        let state = state_with(&["a1"]);
        let mut search = SearchState::default();
        search.search("zzz", &state);
        assert_eq!(search.index(), None);
        assert_eq!(search.go_to_next(), None);
        search.search("", &state);
        assert!(search.results().is_empty());
    }

    #[test]
    fn adopt_keeps_live_selection() {
        let state = state_with(&["a1", "a2", "a3"]);
        let mut live = SearchState::default();
        live.search("a", &state);

        let mut computed = live.clone();
        live.show();
        assert_eq!(live.go_to_next(), Some(MessageId(2)));

        let state = state_with(&["a1", "a2", "a3", "a4"]);
        computed.refresh(&state);
        assert_eq!(computed.selected(), Some(MessageId(1)));

        live.adopt(computed);
        assert_eq!(live.results().len(), 4);
        assert_eq!(live.selected(), Some(MessageId(2)));
        assert_eq!(live.index(), Some(1));
        assert!(live.is_shown());
    }

    #[test]
    fn show_and_hide_keep_results() {
        let state = state_with(&["a1"]);
        let mut search = SearchState::default();
        search.show();
        search.search("a1", &state);
        search.hide();
        assert!(!search.is_shown());
        assert_eq!(search.view().results, vec![MessageId(1)]);
    }
}
