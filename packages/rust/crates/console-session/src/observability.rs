//! Event ids for session, ingestion, search and settings log records.

/// Stable `event` field values.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    SessionCreated,
    SessionReset,
    BatchScheduled,
    BatchApplied,
    BatchFlushed,
    BatchAbandoned,
    PacketRejected,
    SearchRequested,
    SearchSuperseded,
    SearchPublished,
    SettingsReadFailed,
    SettingsParseFailed,
    ConfigHomeOverrideIgnored,
}

impl SessionEvent {
    /// Every event id.
    pub const ALL: [Self; 13] = [
        Self::SessionCreated,
        Self::SessionReset,
        Self::BatchScheduled,
        Self::BatchApplied,
        Self::BatchFlushed,
        Self::BatchAbandoned,
        Self::PacketRejected,
        Self::SearchRequested,
        Self::SearchSuperseded,
        Self::SearchPublished,
        Self::SettingsReadFailed,
        Self::SettingsParseFailed,
        Self::ConfigHomeOverrideIgnored,
    ];

    /// Stable id string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionCreated => "console.session.created",
            Self::SessionReset => "console.session.reset",
            Self::BatchScheduled => "console.ingest.batch_scheduled",
            Self::BatchApplied => "console.ingest.batch_applied",
            Self::BatchFlushed => "console.ingest.batch_flushed",
            Self::BatchAbandoned => "console.ingest.batch_abandoned",
            Self::PacketRejected => "console.ingest.packet_rejected",
            Self::SearchRequested => "console.search.requested",
            Self::SearchSuperseded => "console.search.superseded",
            Self::SearchPublished => "console.search.published",
            Self::SettingsReadFailed => "console.settings.read_failed",
            Self::SettingsParseFailed => "console.settings.parse_failed",
            Self::ConfigHomeOverrideIgnored => "console.settings.config_home_override_ignored",
        }
    }
}
