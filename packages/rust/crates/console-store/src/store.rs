//! Owner of the current console snapshot.

use console_types::{FilterPatch, LogGroupId, MessageDraft, MessageId, PausePoint};

use crate::ids::{IdGenerator, SequentialIds};
use crate::state::{Command, ConsoleState, StoreConfig, Transition};

/// Explicitly constructed message store; one per recording session.
pub struct MessageStore {
    config: StoreConfig,
    state: ConsoleState,
    ids: Box<dyn IdGenerator>,
}

impl std::fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStore")
            .field("config", &self.config)
            .field("messages", &self.state.len())
            .field("visible", &self.state.visible_ids().len())
            .finish_non_exhaustive()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::create()
    }
}

impl MessageStore {
    /// Store with default configuration and sequential ids.
    #[must_use]
    pub fn create() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Store with explicit configuration and sequential ids.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self::with_id_generator(config, Box::new(SequentialIds::default()))
    }

    /// Store with an injected id generator.
    #[must_use]
    pub fn with_id_generator(config: StoreConfig, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            state: ConsoleState::new(config.clone()),
            config,
            ids,
        }
    }

    /// Drop everything and start over with the same configuration.
    ///
    /// Ids keep increasing across resets.
    pub fn reset(&mut self) {
        self.state = ConsoleState::new(self.config.clone());
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ConsoleState {
        self.state.clone()
    }

    /// Borrow the current snapshot.
    #[must_use]
    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    /// Store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Run one transition.
    pub fn apply(&mut self, command: Command) -> Transition {
        let label = command.label();
        let current = std::mem::take(&mut self.state);
        let (next, transition) = current.apply(command, self.ids.as_mut());
        self.state = next;
        tracing::trace!(
            command = label,
            stored = transition.stored.len(),
            removed = transition.removed.len(),
            rejected = transition.rejected,
            resorted = transition.resorted,
            "store transition applied"
        );
        transition
    }

    /// Store one message.
    pub fn add_message(&mut self, draft: MessageDraft) -> Transition {
        self.apply(Command::AddMessages(vec![draft]))
    }

    /// Store a batch as one transition.
    pub fn add_messages(&mut self, drafts: Vec<MessageDraft>) -> Transition {
        self.apply(Command::AddMessages(drafts))
    }

    /// Remove messages by id.
    pub fn remove_messages(&mut self, ids: Vec<MessageId>) -> Transition {
        self.apply(Command::RemoveMessages(ids))
    }

    /// Remove every command and result.
    pub fn clear_evaluations(&mut self) -> Transition {
        self.apply(Command::ClearEvaluations)
    }

    /// Remove one command and its result.
    pub fn clear_evaluation(&mut self, command_id: MessageId) -> Transition {
        self.apply(Command::ClearEvaluation(command_id))
    }

    /// Remove a logpoint group and drop its late messages.
    pub fn clear_logpoint_group(&mut self, group: LogGroupId) -> Transition {
        self.apply(Command::ClearLogpointGroup(group))
    }

    /// Drop every message.
    pub fn clear_messages(&mut self) -> Transition {
        self.apply(Command::ClearMessages)
    }

    /// Record the pause position.
    pub fn set_paused(&mut self, point: PausePoint) {
        self.apply(Command::SetPaused(point));
    }

    /// Update filters.
    pub fn set_filters(&mut self, patch: FilterPatch) -> Transition {
        self.apply(Command::SetFilters(patch))
    }

    /// Set the sticky overflow flag.
    pub fn mark_overflow(&mut self) {
        self.apply(Command::MarkOverflow);
    }

    /// Note that the backlog is loaded.
    pub fn mark_messages_loaded(&mut self) {
        self.apply(Command::MarkMessagesLoaded);
    }
}
