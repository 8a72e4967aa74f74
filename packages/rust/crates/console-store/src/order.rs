//! Ordering of visible messages.
//!
//! Order, most to least significant: ordering point (real or synthetic),
//! evaluation tie-break (non-evaluations first, lower eval id first, command
//! before result), then the synthetic cohort counter.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use console_types::{Message, MessageId, MessageKind, compare_points};
use serde::{Deserialize, Serialize};

/// Which total order the visible list follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    /// Execution point order.
    #[default]
    ExecutionPoint,
    /// Legacy order by `executionPointTime`, ties broken by execution point order.
    Timestamp,
}

/// Compare two messages by recording position.
#[must_use]
pub fn compare_messages(a: &Message, b: &Message) -> Ordering {
    let by_point = match (a.ordering_point(), b.ordering_point()) {
        (Some(pa), Some(pb)) => compare_points(pa, pb),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_point
        .then_with(|| compare_evaluations(&a.kind, &b.kind))
        .then_with(|| a.cohort().cmp(&b.cohort()))
}

fn compare_evaluations(a: &MessageKind, b: &MessageKind) -> Ordering {
    match (a.eval_id(), b.eval_id()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(ea), Some(eb)) => ea.cmp(&eb).then_with(|| result_rank(a).cmp(&result_rank(b))),
    }
}

const fn result_rank(kind: &MessageKind) -> u8 {
    match kind {
        MessageKind::Result { .. } => 1,
        _ => 0,
    }
}

fn compare_by_time(a: &Message, b: &Message) -> Ordering {
    a.execution_point_time
        .total_cmp(&b.execution_point_time)
        .then_with(|| compare_messages(a, b))
}

impl OrderingMode {
    /// Comparator for this mode.
    #[must_use]
    pub fn compare(self, a: &Message, b: &Message) -> Ordering {
        match self {
            Self::ExecutionPoint => compare_messages(a, b),
            Self::Timestamp => compare_by_time(a, b),
        }
    }
}

/// Full stable re-sort of `visible`.
///
/// Ids missing from `messages` keep their relative place at the end.
pub fn sort_visible(
    visible: &mut [MessageId],
    messages: &BTreeMap<MessageId, Arc<Message>>,
    mode: OrderingMode,
) {
    visible.sort_by(|a, b| match (messages.get(a), messages.get(b)) {
        (Some(ma), Some(mb)) => mode.compare(ma, mb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Index at which `message` joins a sorted `visible` list: after every element
/// that compares less than or equal, which matches appending then stable
/// sorting.
#[must_use]
pub fn insertion_index(
    visible: &[MessageId],
    messages: &BTreeMap<MessageId, Arc<Message>>,
    message: &Message,
    mode: OrderingMode,
) -> usize {
    visible.partition_point(|id| {
        messages
            .get(id)
            .is_none_or(|other| mode.compare(other, message) != Ordering::Greater)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_types::{
        ConsoleCall, EvalId, ExecutionPoint, LastExecutionPoint, Level, MessageDraft,
        MessageSource,
    };

    fn log_at(id: u64, point: u64) -> Message {
        let draft = MessageDraft::new(
            MessageKind::ConsoleLog {
                call: ConsoleCall::Log,
            },
            Level::Log,
            MessageSource::ConsoleApi,
            format!("m{id}"),
        )
        .at_point(ExecutionPoint::from(point), point as f64);
        Message::from_draft(MessageId(id), draft, None)
    }

    fn anchored(id: u64, kind: MessageKind, anchor: u64, count: u32) -> Message {
        let draft = MessageDraft::new(kind, Level::Log, MessageSource::ConsoleFrontend, "eval");
        Message::from_draft(
            MessageId(id),
            draft,
            Some(LastExecutionPoint {
                point: ExecutionPoint::from(anchor),
                time: 0.0,
                message_count: count,
            }),
        )
    }

    #[test]
    fn point_order_dominates() {
        assert_eq!(
            compare_messages(&log_at(2, 5), &log_at(1, 30)),
            Ordering::Less
        );
    }

    #[test]
    fn non_evaluation_sorts_before_evaluation_at_same_point() {
        let log = log_at(1, 10);
        let command = anchored(2, MessageKind::Command { eval_id: EvalId(1) }, 10, 1);
        assert_eq!(compare_messages(&command, &log), Ordering::Greater);
    }

    #[test]
    fn result_follows_command_of_same_eval() {
        let command = anchored(5, MessageKind::Command { eval_id: EvalId(4) }, 10, 2);
        let result = anchored(
            4,
            MessageKind::Result {
                eval_id: EvalId(4),
                paired_command: None,
            },
            10,
            1,
        );
        assert_eq!(compare_messages(&result, &command), Ordering::Greater);
    }

    #[test]
    fn lower_eval_id_first() {
        let first = anchored(9, MessageKind::Command { eval_id: EvalId(1) }, 10, 3);
        let second = anchored(8, MessageKind::Command { eval_id: EvalId(2) }, 10, 1);
        assert_eq!(compare_messages(&first, &second), Ordering::Less);
    }

    #[test]
    fn insertion_index_places_after_equal_elements() {
        let mut messages = BTreeMap::new();
        for message in [log_at(1, 10), log_at(2, 20), log_at(3, 30)] {
            messages.insert(message.id, Arc::new(message));
        }
        let visible = vec![MessageId(1), MessageId(2), MessageId(3)];
        let newcomer = log_at(4, 20);
        assert_eq!(
            insertion_index(&visible, &messages, &newcomer, OrderingMode::ExecutionPoint),
            2
        );
    }
}
