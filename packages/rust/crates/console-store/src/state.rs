//! Console state snapshot and its transitions.
//!
//! [`ConsoleState`] is cheap to clone: every collection sits behind an `Arc`
//! and is written through `Arc::make_mut`, so a snapshot handed to a reader is
//! never changed by a later transition.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use console_types::{
    EvalId, ExecutionPoint, FilterCause, FilterPatch, FilterState, LastExecutionPoint, LogGroupId,
    Message, MessageDraft, MessageId, MessageKind, PausePoint, compare_points,
};
use serde::{Deserialize, Serialize};

use crate::ids::IdGenerator;
use crate::logpoint::{LogpointLifecycle, SupersessionKey};
use crate::observability::StoreEvent;
use crate::order::{OrderingMode, insertion_index, sort_visible};
use crate::visibility::{CompiledFilters, FilteredCounts, Visibility};

/// How `ClearEvaluation` finds the result that belongs to a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationPairing {
    /// Results carry the id of the command they answer.
    #[default]
    EvalId,
    /// Legacy rule: the result id is the command id plus one.
    AdjacentId,
}

/// Store configuration fixed for the lifetime of one store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Visible list order.
    pub ordering: OrderingMode,
    /// Evaluation clearing rule.
    pub pairing: EvaluationPairing,
    /// Initial filters.
    pub filters: FilterState,
}

/// Input of one transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Store a batch of drafts in order.
    AddMessages(Vec<MessageDraft>),
    /// Remove messages by id; absent ids are ignored.
    RemoveMessages(Vec<MessageId>),
    /// Remove every command and result.
    ClearEvaluations,
    /// Remove one command and its result.
    ClearEvaluation(MessageId),
    /// Remove a logpoint group and suppress it for the session.
    ClearLogpointGroup(LogGroupId),
    /// Drop every message.
    ClearMessages,
    /// Record the replay pause position.
    SetPaused(PausePoint),
    /// Apply a partial filter update.
    SetFilters(FilterPatch),
    /// Set the sticky overflow flag.
    MarkOverflow,
    /// Note that the initial backlog is fully ingested.
    MarkMessagesLoaded,
}

impl Command {
    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AddMessages(_) => "add_messages",
            Self::RemoveMessages(_) => "remove_messages",
            Self::ClearEvaluations => "clear_evaluations",
            Self::ClearEvaluation(_) => "clear_evaluation",
            Self::ClearLogpointGroup(_) => "clear_logpoint_group",
            Self::ClearMessages => "clear_messages",
            Self::SetPaused(_) => "set_paused",
            Self::SetFilters(_) => "set_filters",
            Self::MarkOverflow => "mark_overflow",
            Self::MarkMessagesLoaded => "mark_messages_loaded",
        }
    }
}

/// What a transition did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Ids stored, in arrival order.
    pub stored: Vec<MessageId>,
    /// Ids replaced by a later message with the same key (also in `removed`).
    pub superseded: Vec<MessageId>,
    /// Ids removed.
    pub removed: Vec<MessageId>,
    /// Drafts dropped because their logpoint group was cleared.
    pub rejected: usize,
    /// Whether the visible list was rebuilt from scratch.
    pub resorted: bool,
}

impl Transition {
    /// Whether the message set changed.
    #[must_use]
    pub fn changed_messages(&self) -> bool {
        !self.stored.is_empty() || !self.removed.is_empty()
    }
}

/// Where a message sits relative to the paused moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PausePosition {
    /// Recorded before the pause.
    Before,
    /// Recorded at the paused point.
    AtPause,
    /// Recorded after the pause.
    After,
}

/// Snapshot of the console.
#[derive(Debug, Clone)]
pub struct ConsoleState {
    ordering: OrderingMode,
    pairing: EvaluationPairing,
    messages: Arc<BTreeMap<MessageId, Arc<Message>>>,
    visible: Arc<Vec<MessageId>>,
    hidden: Arc<HashMap<MessageId, FilterCause>>,
    counts: FilteredCounts,
    filters: Arc<CompiledFilters>,
    logpoints: LogpointLifecycle,
    commands_by_eval: Arc<HashMap<EvalId, MessageId>>,
    cohorts: Arc<HashMap<ExecutionPoint, u32>>,
    last_point: Option<PausePoint>,
    paused: Option<PausePoint>,
    has_execution_points: bool,
    overflow: bool,
    messages_loaded: bool,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl ConsoleState {
    /// Empty state.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let StoreConfig {
            ordering,
            pairing,
            filters,
        } = config;
        Self {
            ordering,
            pairing,
            messages: Arc::default(),
            visible: Arc::default(),
            hidden: Arc::default(),
            counts: FilteredCounts::default(),
            filters: Arc::new(CompiledFilters::new(filters)),
            logpoints: LogpointLifecycle::default(),
            commands_by_eval: Arc::default(),
            cohorts: Arc::default(),
            last_point: None,
            paused: None,
            has_execution_points: false,
            overflow: false,
            messages_loaded: false,
        }
    }

    /// Apply one command, returning the next snapshot and what changed.
    #[must_use]
    pub fn apply(mut self, command: Command, ids: &mut dyn IdGenerator) -> (Self, Transition) {
        let mut transition = Transition::default();
        match command {
            Command::AddMessages(drafts) => {
                for draft in drafts {
                    self.add_message(draft, ids, &mut transition);
                }
            }
            Command::RemoveMessages(targets) => {
                let removed = self.remove_ids(&targets, &mut transition);
                if removed > 0 {
                    tracing::debug!(
                        event = StoreEvent::MessagesRemoved.as_str(),
                        requested = targets.len(),
                        removed,
                        "messages removed"
                    );
                }
            }
            Command::ClearEvaluations => {
                let targets: Vec<MessageId> = self
                    .messages
                    .values()
                    .filter(|message| message.kind.is_evaluation())
                    .map(|message| message.id)
                    .collect();
                let removed = self.remove_ids(&targets, &mut transition);
                tracing::debug!(
                    event = StoreEvent::EvaluationsCleared.as_str(),
                    removed,
                    "console evaluations cleared"
                );
            }
            Command::ClearEvaluation(command_id) => {
                let targets = self.evaluation_members(command_id);
                let removed = self.remove_ids(&targets, &mut transition);
                tracing::debug!(
                    event = StoreEvent::EvaluationsCleared.as_str(),
                    command_id = %command_id,
                    removed,
                    "console evaluation cleared"
                );
            }
            Command::ClearLogpointGroup(group) => {
                let targets: Vec<MessageId> = self
                    .messages
                    .values()
                    .filter(|message| message.kind.log_group() == Some(&group))
                    .map(|message| message.id)
                    .collect();
                let removed = self.remove_ids(&targets, &mut transition);
                tracing::debug!(
                    event = StoreEvent::LogpointGroupCleared.as_str(),
                    group = %group,
                    removed,
                    "logpoint group cleared and suppressed"
                );
                self.logpoints.suppress(group);
            }
            Command::ClearMessages => self.clear_messages(&mut transition),
            Command::SetPaused(point) => self.paused = Some(point),
            Command::SetFilters(patch) => {
                transition.resorted = self.set_filters(patch);
            }
            Command::MarkOverflow => {
                if !self.overflow {
                    tracing::debug!(
                        event = StoreEvent::OverflowMarked.as_str(),
                        stored = self.messages.len(),
                        "message overflow reported"
                    );
                }
                self.overflow = true;
            }
            Command::MarkMessagesLoaded => self.messages_loaded = true,
        }
        (self, transition)
    }

    fn sorting_enabled(&self) -> bool {
        self.has_execution_points || self.ordering == OrderingMode::Timestamp
    }

    fn add_message(
        &mut self,
        mut draft: MessageDraft,
        ids: &mut dyn IdGenerator,
        transition: &mut Transition,
    ) {
        if let Some(group) = draft.kind.log_group()
            && self.logpoints.is_suppressed(group)
        {
            tracing::debug!(
                event = StoreEvent::MessageRejected.as_str(),
                group = %group,
                "dropped message for cleared logpoint group"
            );
            transition.rejected += 1;
            return;
        }

        let id = ids.next_id();
        let first_point = self.note_execution_point(&draft);
        let last_execution_point = match draft.execution_point {
            Some(_) => None,
            None => Some(self.synthesize_anchor(draft.execution_point_time)),
        };

        match &mut draft.kind {
            MessageKind::Command { eval_id } => {
                Arc::make_mut(&mut self.commands_by_eval).insert(*eval_id, id);
            }
            MessageKind::Result {
                eval_id,
                paired_command,
            } => {
                if paired_command.is_none() {
                    *paired_command = self.commands_by_eval.get(eval_id).copied();
                }
            }
            _ => {}
        }

        let superseded = SupersessionKey::for_kind(&draft.kind, draft.execution_point.as_ref())
            .and_then(|key| self.logpoints.claim(key, id));

        let message = Arc::new(Message::from_draft(id, draft, last_execution_point));
        Arc::make_mut(&mut self.messages).insert(id, Arc::clone(&message));

        match self.filters.classify(&message) {
            Visibility::Visible => self.insert_visible(&message, first_point),
            Visibility::Hidden(cause) => {
                Arc::make_mut(&mut self.hidden).insert(id, cause);
                self.counts.record(cause);
            }
        }
        if first_point {
            tracing::debug!(
                event = StoreEvent::OrderingEnabled.as_str(),
                message_id = %id,
                "first execution point seen; sorting by point"
            );
            let visible = Arc::make_mut(&mut self.visible);
            sort_visible(visible.as_mut_slice(), &self.messages, self.ordering);
            transition.resorted = true;
        }

        tracing::trace!(
            event = StoreEvent::MessageStored.as_str(),
            message_id = %id,
            kind = message.kind.label(),
            point = message.ordering_point().map(ExecutionPoint::as_str),
            cohort = message.cohort(),
            "message stored"
        );
        transition.stored.push(id);

        if let Some(previous) = superseded {
            tracing::trace!(
                event = StoreEvent::MessageSuperseded.as_str(),
                message_id = %id,
                superseded = %previous,
                "provisional message superseded"
            );
            transition.superseded.push(previous);
            self.remove_ids(&[previous], transition);
        }
    }

    /// Track the last real point; returns whether this is the first one ever.
    fn note_execution_point(&mut self, draft: &MessageDraft) -> bool {
        let Some(point) = &draft.execution_point else {
            return false;
        };
        self.last_point = Some(PausePoint::new(point.clone(), draft.execution_point_time));
        let first = !self.has_execution_points;
        self.has_execution_points = true;
        first
    }

    fn synthesize_anchor(&mut self, fallback_time: f64) -> LastExecutionPoint {
        let anchor = self
            .paused
            .clone()
            .or_else(|| self.last_point.clone())
            .unwrap_or_else(|| PausePoint::new(ExecutionPoint::zero(), fallback_time));
        let cohorts = Arc::make_mut(&mut self.cohorts);
        let count = cohorts.entry(anchor.execution_point.clone()).or_insert(0);
        *count = count.saturating_add(1);
        LastExecutionPoint {
            point: anchor.execution_point,
            time: anchor.time,
            message_count: *count,
        }
    }

    fn insert_visible(&mut self, message: &Message, resort_pending: bool) {
        let sorted = self.sorting_enabled() && !resort_pending;
        let visible = Arc::make_mut(&mut self.visible);
        if !sorted {
            visible.push(message.id);
            return;
        }
        let index = insertion_index(visible, &self.messages, message, self.ordering);
        visible.insert(index, message.id);
    }

    fn evaluation_members(&self, command_id: MessageId) -> Vec<MessageId> {
        match self.pairing {
            EvaluationPairing::AdjacentId => vec![command_id, command_id.successor()],
            EvaluationPairing::EvalId => {
                let mut members = vec![command_id];
                members.extend(
                    self.messages
                        .values()
                        .filter(|message| {
                            matches!(
                                message.kind,
                                MessageKind::Result {
                                    paired_command: Some(paired),
                                    ..
                                } if paired == command_id
                            )
                        })
                        .map(|message| message.id),
                );
                members
            }
        }
    }

    /// Remove ids that are present; returns how many were removed.
    fn remove_ids(&mut self, targets: &[MessageId], transition: &mut Transition) -> usize {
        let mut removed = HashSet::new();
        for id in targets {
            if !self.messages.contains_key(id) {
                continue;
            }
            let Some(message) = Arc::make_mut(&mut self.messages).remove(id) else {
                continue;
            };
            if self.hidden.contains_key(id)
                && let Some(cause) = Arc::make_mut(&mut self.hidden).remove(id)
            {
                self.counts.forget(cause);
            }
            self.logpoints.release(&message);
            if let MessageKind::Command { eval_id } = message.kind
                && self.commands_by_eval.get(&eval_id) == Some(id)
            {
                Arc::make_mut(&mut self.commands_by_eval).remove(&eval_id);
            }
            removed.insert(*id);
            transition.removed.push(*id);
        }
        if !removed.is_empty() {
            Arc::make_mut(&mut self.visible).retain(|id| !removed.contains(id));
        }
        removed.len()
    }

    fn clear_messages(&mut self, transition: &mut Transition) {
        transition.removed.extend(self.messages.keys().copied());
        tracing::debug!(
            event = StoreEvent::MessagesCleared.as_str(),
            removed = self.messages.len(),
            "console cleared"
        );
        self.messages = Arc::default();
        self.visible = Arc::default();
        self.hidden = Arc::default();
        self.counts = FilteredCounts::default();
        self.commands_by_eval = Arc::default();
        self.logpoints.clear_index();
    }

    /// Returns whether anything was recomputed.
    fn set_filters(&mut self, patch: FilterPatch) -> bool {
        let mut next = self.filters.state().clone();
        next.apply(patch);
        if next == *self.filters.state() {
            return false;
        }
        self.filters = Arc::new(CompiledFilters::new(next));
        self.recompute_visibility();
        true
    }

    fn recompute_visibility(&mut self) {
        let mut visible = Vec::with_capacity(self.messages.len());
        let mut hidden = HashMap::new();
        let mut counts = FilteredCounts::default();
        for message in self.messages.values() {
            match self.filters.classify(message) {
                Visibility::Visible => visible.push(message.id),
                Visibility::Hidden(cause) => {
                    hidden.insert(message.id, cause);
                    counts.record(cause);
                }
            }
        }
        if self.sorting_enabled() {
            sort_visible(&mut visible, &self.messages, self.ordering);
        }
        tracing::debug!(
            event = StoreEvent::FiltersRecomputed.as_str(),
            visible = visible.len(),
            hidden = counts.global,
            query = self.filters.query().raw(),
            "filters recomputed"
        );
        self.visible = Arc::new(visible);
        self.hidden = Arc::new(hidden);
        self.counts = counts;
    }

    /// Visible ids in display order.
    #[must_use]
    pub fn visible_ids(&self) -> &[MessageId] {
        &self.visible
    }

    /// Visible messages in display order.
    pub fn visible_messages(&self) -> impl Iterator<Item = &Arc<Message>> + '_ {
        self.visible.iter().filter_map(|id| self.messages.get(id))
    }

    /// Every stored message, by id.
    pub fn messages(&self) -> impl Iterator<Item = &Arc<Message>> + '_ {
        self.messages.values()
    }

    /// Look up a stored message.
    #[must_use]
    pub fn message(&self, id: MessageId) -> Option<&Arc<Message>> {
        self.messages.get(&id)
    }

    /// Number of stored messages, hidden ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Why a stored message is hidden; `None` when it is visible or absent.
    #[must_use]
    pub fn hidden_cause(&self, id: MessageId) -> Option<FilterCause> {
        self.hidden.get(&id).copied()
    }

    /// Hidden-message counters.
    #[must_use]
    pub fn filtered_counts(&self) -> FilteredCounts {
        self.counts
    }

    /// Current filter flags.
    #[must_use]
    pub fn filters(&self) -> &FilterState {
        self.filters.state()
    }

    /// Logpoint bookkeeping.
    #[must_use]
    pub fn logpoints(&self) -> &LogpointLifecycle {
        &self.logpoints
    }

    /// Whether any real execution point has been seen.
    #[must_use]
    pub fn has_execution_points(&self) -> bool {
        self.has_execution_points
    }

    /// Sticky flag: not every message of the recording is present.
    #[must_use]
    pub fn overflow(&self) -> bool {
        self.overflow
    }

    /// Whether the initial backlog is fully ingested.
    #[must_use]
    pub fn messages_loaded(&self) -> bool {
        self.messages_loaded
    }

    /// Current pause position.
    #[must_use]
    pub fn paused(&self) -> Option<&PausePoint> {
        self.paused.as_ref()
    }

    /// Visible list order.
    #[must_use]
    pub fn ordering(&self) -> OrderingMode {
        self.ordering
    }

    /// Evaluation clearing rule.
    #[must_use]
    pub fn pairing(&self) -> EvaluationPairing {
        self.pairing
    }

    /// Place a message relative to the current pause.
    ///
    /// `None` when nothing is paused or the id is unknown.
    #[must_use]
    pub fn position_relative_to_pause(&self, id: MessageId) -> Option<PausePosition> {
        let paused = self.paused.as_ref()?;
        let message = self.messages.get(&id)?;
        let point = message.ordering_point()?;
        Some(match compare_points(point, &paused.execution_point) {
            Ordering::Less => PausePosition::Before,
            Ordering::Equal => PausePosition::AtPause,
            Ordering::Greater => PausePosition::After,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use console_types::{ConsoleCall, Level, MessageSource};

    fn log_at(text: &str, point: Option<u64>) -> MessageDraft {
        let draft = MessageDraft::new(
            MessageKind::ConsoleLog {
                call: ConsoleCall::Log,
            },
            Level::Log,
            MessageSource::ConsoleApi,
            text,
        );
        match point {
            Some(point) => draft.at_point(ExecutionPoint::from(point), point as f64),
            None => draft,
        }
    }

    fn apply(state: ConsoleState, ids: &mut SequentialIds, command: Command) -> ConsoleState {
        state.apply(command, ids).0
    }

    #[test]
    fn published_snapshot_is_not_changed_by_later_transitions() {
        let mut ids = SequentialIds::default();
        let first = apply(
            ConsoleState::default(),
            &mut ids,
            Command::AddMessages(vec![log_at("a", Some(10))]),
        );
        let second = apply(
            first.clone(),
            &mut ids,
            Command::AddMessages(vec![log_at("b", Some(5))]),
        );
        assert_eq!(first.visible_ids(), &[MessageId(1)]);
        assert_eq!(second.visible_ids(), &[MessageId(2), MessageId(1)]);
    }

    #[test]
    fn insertion_order_until_first_point() {
        let mut ids = SequentialIds::default();
        let state = apply(
            ConsoleState::default(),
            &mut ids,
            Command::AddMessages(vec![log_at("a", None), log_at("b", None)]),
        );
        assert!(!state.has_execution_points());
        assert_eq!(state.visible_ids(), &[MessageId(1), MessageId(2)]);
        let state = apply(
            state,
            &mut ids,
            Command::AddMessages(vec![log_at("c", Some(1))]),
        );
        assert!(state.has_execution_points());
        // Anchored at zero, so the point-less messages stay ahead of point 1.
        assert_eq!(
            state.visible_ids(),
            &[MessageId(1), MessageId(2), MessageId(3)]
        );
    }

    #[test]
    fn pointless_messages_follow_their_anchor() {
        let mut ids = SequentialIds::default();
        let state = apply(
            ConsoleState::default(),
            &mut ids,
            Command::AddMessages(vec![log_at("p10", Some(10)), log_at("p20", Some(20))]),
        );
        let state = apply(
            state,
            &mut ids,
            Command::SetPaused(PausePoint::new(ExecutionPoint::from(10), 10.0)),
        );
        let (state, transition) = ConsoleState::apply(
            state,
            Command::AddMessages(vec![
                MessageDraft::new(
                    MessageKind::Command { eval_id: EvalId(1) },
                    Level::Log,
                    MessageSource::ConsoleFrontend,
                    "x",
                ),
                MessageDraft::new(
                    MessageKind::Result {
                        eval_id: EvalId(1),
                        paired_command: None,
                    },
                    Level::Log,
                    MessageSource::ConsoleFrontend,
                    "42",
                ),
            ]),
            &mut ids,
        );
        assert_eq!(transition.stored, vec![MessageId(3), MessageId(4)]);
        assert_eq!(
            state.visible_ids(),
            &[MessageId(1), MessageId(3), MessageId(4), MessageId(2)]
        );
        let result = state.message(MessageId(4)).map(|m| m.kind.clone());
        assert_eq!(
            result,
            Some(MessageKind::Result {
                eval_id: EvalId(1),
                paired_command: Some(MessageId(3)),
            })
        );
        assert_eq!(
            state.position_relative_to_pause(MessageId(2)),
            Some(PausePosition::After)
        );
        assert_eq!(
            state.position_relative_to_pause(MessageId(3)),
            Some(PausePosition::AtPause)
        );
    }

    #[test]
    fn filter_change_recounts() {
        let mut ids = SequentialIds::default();
        let state = apply(
            ConsoleState::default(),
            &mut ids,
            Command::AddMessages(vec![log_at("alpha", Some(1)), log_at("beta", Some(2))]),
        );
        let (state, transition) =
            state.apply(Command::SetFilters(FilterPatch::text("alp")), &mut ids);
        assert!(transition.resorted);
        assert_eq!(state.visible_ids(), &[MessageId(1)]);
        assert_eq!(state.filtered_counts().text, 1);
        assert_eq!(state.hidden_cause(MessageId(2)), Some(FilterCause::Text));

        let (state, transition) =
            state.apply(Command::SetFilters(FilterPatch::text("alp")), &mut ids);
        assert!(!transition.resorted);
        let state = apply(state, &mut ids, Command::SetFilters(FilterPatch::text("")));
        assert_eq!(state.visible_ids(), &[MessageId(1), MessageId(2)]);
        assert_eq!(state.filtered_counts(), FilteredCounts::default());
    }

    #[test]
    fn removing_hidden_message_decrements_counts() {
        let mut ids = SequentialIds::default();
        let state = apply(
            ConsoleState::default(),
            &mut ids,
            Command::SetFilters(FilterPatch::text("keep")),
        );
        let state = apply(
            state,
            &mut ids,
            Command::AddMessages(vec![log_at("keep", Some(1)), log_at("drop", Some(2))]),
        );
        assert_eq!(state.filtered_counts().global, 1);
        let state = apply(state, &mut ids, Command::RemoveMessages(vec![MessageId(2)]));
        assert_eq!(state.filtered_counts().global, 0);
        assert_eq!(state.filtered_counts().text, 0);
    }

    #[test]
    fn clear_messages_keeps_session_flags() {
        let mut ids = SequentialIds::default();
        let state = apply(
            ConsoleState::default(),
            &mut ids,
            Command::AddMessages(vec![log_at("a", Some(1))]),
        );
        let state = apply(state, &mut ids, Command::MarkOverflow);
        let state = apply(
            state,
            &mut ids,
            Command::ClearLogpointGroup(LogGroupId::new("g")),
        );
        let (state, transition) = state.apply(Command::ClearMessages, &mut ids);
        assert_eq!(transition.removed, vec![MessageId(1)]);
        assert!(state.is_empty());
        assert!(state.overflow());
        assert!(state.logpoints().is_suppressed(&LogGroupId::new("g")));
    }

    #[test]
    fn cohort_counter_is_monotonic_per_anchor() {
        let mut ids = SequentialIds::default();
        let state = apply(
            ConsoleState::default(),
            &mut ids,
            Command::AddMessages(vec![log_at("x", None), log_at("y", None)]),
        );
        let state = apply(state, &mut ids, Command::ClearMessages);
        let state = apply(
            state,
            &mut ids,
            Command::AddMessages(vec![log_at("z", None)]),
        );
        assert_eq!(state.message(MessageId(3)).map(|m| m.cohort()), Some(3));
    }
}
