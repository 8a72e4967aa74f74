//! Provisional/final message bookkeeping.
//!
//! A logpoint hit first shows a loading placeholder and later a final result
//! for the same `(group, point)`; an evaluation result may likewise replace an
//! earlier result for the same `(eval id, point)`. Whichever message claims a
//! key last wins, and the previous holder is scheduled for removal.
//!
//! Cleared groups are remembered for the rest of the session so late packets
//! for them are dropped instead of resurrected.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use console_types::{EvalId, ExecutionPoint, LogGroupId, Message, MessageId, MessageKind};

/// Key shared by a provisional message and the message that supersedes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SupersessionKey {
    /// Logpoint hit.
    Logpoint {
        /// Logpoint group.
        group: LogGroupId,
        /// Hit position.
        point: Option<ExecutionPoint>,
    },
    /// Evaluation result.
    Evaluation {
        /// Evaluation id.
        eval_id: EvalId,
        /// Result position.
        point: Option<ExecutionPoint>,
    },
}

impl SupersessionKey {
    /// Key for a message of `kind` at `point`, if that family supersedes.
    #[must_use]
    pub fn for_kind(kind: &MessageKind, point: Option<&ExecutionPoint>) -> Option<Self> {
        match kind {
            MessageKind::LogpointLoading { group } | MessageKind::LogpointResult { group } => {
                Some(Self::Logpoint {
                    group: group.clone(),
                    point: point.cloned(),
                })
            }
            MessageKind::Result { eval_id, .. } => Some(Self::Evaluation {
                eval_id: *eval_id,
                point: point.cloned(),
            }),
            _ => None,
        }
    }

    /// Key of a stored message.
    #[must_use]
    pub fn for_message(message: &Message) -> Option<Self> {
        Self::for_kind(&message.kind, message.execution_point.as_ref())
    }
}

/// Supersession index plus the set of suppressed logpoint groups.
#[derive(Debug, Clone, Default)]
pub struct LogpointLifecycle {
    index: Arc<HashMap<SupersessionKey, MessageId>>,
    removed_groups: Arc<HashSet<LogGroupId>>,
}

impl LogpointLifecycle {
    /// Whether messages for `group` are dropped on arrival.
    #[must_use]
    pub fn is_suppressed(&self, group: &LogGroupId) -> bool {
        self.removed_groups.contains(group)
    }

    /// Point `key` at `id`; returns the id it superseded.
    pub fn claim(&mut self, key: SupersessionKey, id: MessageId) -> Option<MessageId> {
        Arc::make_mut(&mut self.index)
            .insert(key, id)
            .filter(|previous| *previous != id)
    }

    /// Current holder of a key.
    #[must_use]
    pub fn holder(&self, key: &SupersessionKey) -> Option<MessageId> {
        self.index.get(key).copied()
    }

    /// Drop the index entry of a removed message, if it still holds its key.
    pub fn release(&mut self, message: &Message) {
        let Some(key) = SupersessionKey::for_message(message) else {
            return;
        };
        if self.index.get(&key) == Some(&message.id) {
            Arc::make_mut(&mut self.index).remove(&key);
        }
    }

    /// Suppress a group for the rest of the session.
    pub fn suppress(&mut self, group: LogGroupId) {
        Arc::make_mut(&mut self.removed_groups).insert(group);
    }

    /// Forget every key while keeping suppressed groups.
    pub fn clear_index(&mut self) {
        if !self.index.is_empty() {
            self.index = Arc::default();
        }
    }

    /// Number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no keys are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of suppressed groups.
    #[must_use]
    pub fn suppressed_groups(&self) -> usize {
        self.removed_groups.len()
    }
}
