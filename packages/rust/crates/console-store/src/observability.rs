//! Stable event ids attached to store and search log records.

/// Event ids emitted as the `event` field of `tracing` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreEvent {
    /// A message was frozen and stored.
    MessageStored,
    /// A provisional message was replaced by a later one with the same key.
    MessageSuperseded,
    /// A message for a cleared logpoint group was dropped.
    MessageRejected,
    /// Messages were removed by id.
    MessagesRemoved,
    /// Every message was cleared.
    MessagesCleared,
    /// Filters changed and visibility was recomputed.
    FiltersRecomputed,
    /// A logpoint group was cleared and suppressed.
    LogpointGroupCleared,
    /// Console evaluations were cleared.
    EvaluationsCleared,
    /// The first real execution point arrived and ordering switched on.
    OrderingEnabled,
    /// The sticky overflow flag was set.
    OverflowMarked,
    /// A `/regex/` query failed to compile.
    RegexQueryRejected,
    /// Search results were recomputed.
    SearchRecomputed,
}

impl StoreEvent {
    /// Every event id, for catalog checks.
    pub const ALL: [Self; 12] = [
        Self::MessageStored,
        Self::MessageSuperseded,
        Self::MessageRejected,
        Self::MessagesRemoved,
        Self::MessagesCleared,
        Self::FiltersRecomputed,
        Self::LogpointGroupCleared,
        Self::EvaluationsCleared,
        Self::OrderingEnabled,
        Self::OverflowMarked,
        Self::RegexQueryRejected,
        Self::SearchRecomputed,
    ];

    /// Stable id string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MessageStored => "console.store.message_stored",
            Self::MessageSuperseded => "console.store.message_superseded",
            Self::MessageRejected => "console.store.message_rejected",
            Self::MessagesRemoved => "console.store.messages_removed",
            Self::MessagesCleared => "console.store.messages_cleared",
            Self::FiltersRecomputed => "console.store.filters_recomputed",
            Self::LogpointGroupCleared => "console.store.logpoint_group_cleared",
            Self::EvaluationsCleared => "console.store.evaluations_cleared",
            Self::OrderingEnabled => "console.store.ordering_enabled",
            Self::OverflowMarked => "console.store.overflow_marked",
            Self::RegexQueryRejected => "console.search.regex_rejected",
            Self::SearchRecomputed => "console.search.recomputed",
        }
    }
}
