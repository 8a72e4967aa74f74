//! Message id generation.

use console_types::MessageId;

/// Source of fresh message ids. Ids must be strictly increasing.
pub trait IdGenerator: Send {
    /// Issue the next id.
    fn next_id(&mut self) -> MessageId;
}

/// Counter starting at 1.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    last: u64,
}

impl SequentialIds {
    /// Generator whose first id is `start`.
    #[must_use]
    pub const fn starting_at(start: u64) -> Self {
        Self {
            last: start.saturating_sub(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> MessageId {
        self.last += 1;
        MessageId(self.last)
    }
}
