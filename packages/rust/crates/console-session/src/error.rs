use console_types::PacketError;
use thiserror::Error;

/// Errors raised by the session layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The packet failed validation at the ingestion boundary.
    #[error("packet rejected: {0}")]
    Packet(#[from] PacketError),
    /// The batch was dropped by a session reset before it was applied.
    #[error("batch {batch_id} was abandoned before it was applied")]
    BatchAbandoned {
        /// Abandoned batch.
        batch_id: u64,
    },
    /// Timers and background search need a tokio runtime.
    #[error("no tokio runtime is available to schedule {what}")]
    RuntimeUnavailable {
        /// What could not be scheduled.
        what: &'static str,
    },
    /// Search is switched off in the settings.
    #[error("search is disabled by configuration")]
    SearchDisabled,
}
