//! Session controller: one store, one batcher, one search front-end.

use console_store::{Command, ConsoleState, MessageStore, Transition};
use console_types::{
    FilterPatch, InboundEvent, LogGroupId, MessageDraft, MessageId, PausePoint, RawPacket,
};
use tokio::sync::watch;

use crate::batcher::{BatchHandle, BatchReport, BatchSink, IngestionBatcher};
use crate::error::SessionError;
use crate::observability::SessionEvent;
use crate::search::{SearchController, SearchSnapshot};
use crate::settings::ConsoleSettings;

/// Store plus the channels its snapshots are published on.
struct SessionCore {
    store: MessageStore,
    snapshots: watch::Sender<ConsoleState>,
    search: Option<SearchController>,
}

impl SessionCore {
    fn run(&mut self, command: Command) -> Transition {
        let transition = self.store.apply(command);
        self.publish(&transition);
        transition
    }

    fn publish(&self, transition: &Transition) {
        let snapshot = self.store.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        if (transition.changed_messages() || transition.resorted)
            && let Some(search) = &self.search
        {
            search.refresh(snapshot);
        }
    }
}

impl BatchSink for SessionCore {
    fn apply_batch(&mut self, batch_id: u64, drafts: Vec<MessageDraft>) -> BatchReport {
        let transition = self.run(Command::AddMessages(drafts));
        BatchReport {
            batch_id,
            applied: transition.stored.len(),
            rejected: transition.rejected,
        }
    }
}

/// One recording session's console.
pub struct ConsoleSession {
    settings: ConsoleSettings,
    batcher: IngestionBatcher<SessionCore>,
    snapshots: watch::Receiver<ConsoleState>,
    search: Option<SearchController>,
}

impl ConsoleSession {
    /// Build a session from settings.
    #[must_use]
    pub fn create(settings: ConsoleSettings) -> Self {
        let store = MessageStore::with_config(settings.store_config());
        let (sender, snapshots) = watch::channel(store.snapshot());
        let search = settings.search_enabled().then(SearchController::new);
        let core = SessionCore {
            store,
            snapshots: sender,
            search: search.clone(),
        };
        let batcher = IngestionBatcher::new(core, settings.batch_window());
        tracing::debug!(
            event = SessionEvent::SessionCreated.as_str(),
            batch_window_ms = u64::try_from(batcher.window().as_millis()).unwrap_or(u64::MAX),
            search_enabled = search.is_some(),
            "console session created"
        );
        Self {
            settings,
            batcher,
            snapshots,
            search,
        }
    }

    /// Settings the session was built from.
    #[must_use]
    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    /// Apply a non-packet command after the open batch, so commands and
    /// packets take effect in arrival order whichever entry point is used.
    fn run(&self, command: Command) -> Transition {
        self.flush();
        self.batcher.with_sink(|core| core.run(command))
    }

    /// Route one inbound notification.
    ///
    /// Packets join the open batch; returns their batch handle. Any other
    /// notification first flushes the open batch.
    ///
    /// # Errors
    ///
    /// Fails when a packet does not validate or no runtime can arm the timer.
    pub fn ingest(&self, event: InboundEvent) -> Result<Option<BatchHandle>, SessionError> {
        let command = match event {
            InboundEvent::Packet(packet) => return self.push_packet(packet).map(Some),
            InboundEvent::Paused(point) => Command::SetPaused(point),
            InboundEvent::Overflow => Command::MarkOverflow,
            InboundEvent::MessagesLoaded => Command::MarkMessagesLoaded,
            InboundEvent::Filters(patch) => Command::SetFilters(patch),
        };
        self.run(command);
        Ok(None)
    }

    /// Validate a packet and queue it.
    ///
    /// # Errors
    ///
    /// [`SessionError::Packet`] when the packet does not validate;
    /// [`SessionError::RuntimeUnavailable`] outside a tokio runtime.
    pub fn push_packet(&self, packet: RawPacket) -> Result<BatchHandle, SessionError> {
        let kind = packet.kind.clone();
        let draft = MessageDraft::try_from(packet).map_err(|error| {
            tracing::warn!(
                event = SessionEvent::PacketRejected.as_str(),
                kind = %kind,
                error = %error,
                "packet rejected at ingestion boundary"
            );
            SessionError::from(error)
        })?;
        self.batcher.push(draft)
    }

    /// Record the pause position.
    pub fn set_paused(&self, point: PausePoint) {
        self.run(Command::SetPaused(point));
    }

    /// Set the sticky overflow flag.
    pub fn mark_overflow(&self) {
        self.run(Command::MarkOverflow);
    }

    /// Note that the initial backlog is ingested.
    pub fn mark_messages_loaded(&self) {
        self.run(Command::MarkMessagesLoaded);
    }

    /// Apply a partial filter update.
    pub fn update_filters(&self, patch: FilterPatch) -> Transition {
        self.run(Command::SetFilters(patch))
    }

    /// Remove every command and result.
    pub fn clear_evaluations(&self) -> Transition {
        self.run(Command::ClearEvaluations)
    }

    /// Remove one evaluation.
    pub fn clear_evaluation(&self, command_id: MessageId) -> Transition {
        self.run(Command::ClearEvaluation(command_id))
    }

    /// Remove a logpoint group and suppress its late messages.
    pub fn clear_logpoint_group(&self, group: LogGroupId) -> Transition {
        self.run(Command::ClearLogpointGroup(group))
    }

    /// Drop every message.
    pub fn clear_messages(&self) -> Transition {
        self.run(Command::ClearMessages)
    }

    /// Remove messages by id.
    pub fn remove_messages(&self, ids: Vec<MessageId>) -> Transition {
        self.run(Command::RemoveMessages(ids))
    }

    /// Latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ConsoleState {
        self.snapshots.borrow().clone()
    }

    /// Snapshot stream; every transition publishes one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConsoleState> {
        self.snapshots.clone()
    }

    fn search_controller(&self) -> Result<&SearchController, SessionError> {
        self.search.as_ref().ok_or(SessionError::SearchDisabled)
    }

    /// Search the visible messages.
    ///
    /// # Errors
    ///
    /// [`SessionError::SearchDisabled`] when search is switched off.
    pub fn search(&self, query: &str) -> Result<(), SessionError> {
        let search = self.search_controller()?;
        search.search(query, self.snapshot());
        Ok(())
    }

    /// Select the next search result.
    pub fn go_to_next(&self) -> Option<MessageId> {
        self.search.as_ref().and_then(SearchController::go_to_next)
    }

    /// Select the previous search result.
    pub fn go_to_previous(&self) -> Option<MessageId> {
        self.search
            .as_ref()
            .and_then(SearchController::go_to_previous)
    }

    /// Open the search bar.
    ///
    /// # Errors
    ///
    /// [`SessionError::SearchDisabled`] when search is switched off.
    pub fn show_search(&self) -> Result<(), SessionError> {
        self.search_controller()?.show();
        Ok(())
    }

    /// Close the search bar.
    pub fn hide_search(&self) {
        if let Some(search) = &self.search {
            search.hide();
        }
    }

    /// Latest search snapshot; empty when search is disabled.
    #[must_use]
    pub fn search_state(&self) -> SearchSnapshot {
        self.search
            .as_ref()
            .map(SearchController::current)
            .unwrap_or_default()
    }

    /// Search snapshot stream.
    ///
    /// # Errors
    ///
    /// [`SessionError::SearchDisabled`] when search is switched off.
    pub fn subscribe_search(&self) -> Result<watch::Receiver<SearchSnapshot>, SessionError> {
        Ok(self.search_controller()?.subscribe())
    }

    /// Wait for pending search work to publish.
    pub async fn search_settled(&self) -> SearchSnapshot {
        match &self.search {
            Some(search) => search.settled().await,
            None => SearchSnapshot::default(),
        }
    }

    /// Apply the open batch now.
    pub fn flush(&self) -> Option<BatchReport> {
        self.batcher.flush()
    }

    /// Drafts waiting for the batch window.
    #[must_use]
    pub fn pending_packets(&self) -> usize {
        self.batcher.pending_len()
    }

    /// Start over: drop the open batch unapplied, cancel search work and
    /// install a fresh store.
    pub fn reset(&self) {
        let abandoned = self.batcher.abandon();
        if let Some(search) = &self.search {
            search.reset();
        }
        self.batcher.with_sink(|core| {
            core.store.reset();
            core.publish(&Transition::default());
        });
        tracing::debug!(
            event = SessionEvent::SessionReset.as_str(),
            abandoned,
            "console session reset"
        );
    }
}
