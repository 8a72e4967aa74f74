//! MessageStore ordering, removal and logpoint tests.

#![allow(missing_docs)]

use console_store::{EvaluationPairing, MessageStore, OrderingMode, SequentialIds, StoreConfig};
use console_types::{
    ExecutionPoint, LogGroupId, MessageDraft, MessageId, MessageKind, PausePoint, RawPacket,
};
use serde_json::json;

fn draft(value: serde_json::Value) -> MessageDraft {
    let packet: RawPacket = serde_json::from_value(value).unwrap();
    MessageDraft::try_from(packet).unwrap()
}

fn log_at(text: &str, point: &str) -> MessageDraft {
    draft(json!({
        "type": "log",
        "level": "log",
        "source": "console-api",
        "text": text,
        "executionPoint": point,
        "executionPointTime": 1.0
    }))
}

fn texts(store: &MessageStore) -> Vec<String> {
    store
        .state()
        .visible_messages()
        .map(|message| message.message_text.clone())
        .collect()
}

#[test]
fn test_visible_order_follows_execution_points() {
    let mut store = MessageStore::create();
    store.add_messages(vec![
        log_at("third", "300"),
        log_at("first", "9"),
        log_at("second", "20"),
    ]);
    assert_eq!(texts(&store), vec!["first", "second", "third"]);
}

#[test]
fn test_points_beyond_u64_compare_by_magnitude() {
    let mut store = MessageStore::create();
    store.add_messages(vec![
        log_at("huge", "340282366920938463463374607431768211456"),
        log_at("big", "18446744073709551616"),
        log_at("small", "99999999"),
    ]);
    assert_eq!(texts(&store), vec!["small", "big", "huge"]);
}

#[test]
fn test_insertion_order_does_not_change_relative_position() {
    let mut forward = MessageStore::create();
    forward.add_message(log_at("a", "10"));
    forward.add_message(log_at("b", "20"));

    let mut backward = MessageStore::create();
    backward.add_message(log_at("b", "20"));
    backward.add_message(log_at("a", "10"));

    assert_eq!(texts(&forward), texts(&backward));
}

#[test]
fn test_removal_is_idempotent() {
    let mut store = MessageStore::create();
    store.add_messages(vec![log_at("a", "1"), log_at("b", "2")]);

    let first = store.remove_messages(vec![MessageId(1)]);
    assert_eq!(first.removed, vec![MessageId(1)]);
    let after_first = texts(&store);

    let second = store.remove_messages(vec![MessageId(1), MessageId(99)]);
    assert!(second.removed.is_empty());
    assert_eq!(texts(&store), after_first);
    assert_eq!(store.state().len(), 1);
}

#[test]
fn test_loading_is_superseded_by_result() {
    let mut store = MessageStore::create();
    store.add_message(draft(json!({
        "type": "logpoint-loading",
        "logpointId": "G",
        "text": "Loading...",
        "executionPoint": "500",
        "executionPointTime": 5.0
    })));
    let transition = store.add_message(draft(json!({
        "type": "log",
        "logpointId": "G",
        "text": "x = 3",
        "executionPoint": "500",
        "executionPointTime": 5.0
    })));

    assert_eq!(transition.superseded, vec![MessageId(1)]);
    assert_eq!(store.state().visible_ids(), &[MessageId(2)]);
    let kind = &store.state().message(MessageId(2)).unwrap().kind;
    assert_eq!(
        *kind,
        MessageKind::LogpointResult {
            group: LogGroupId::new("G")
        }
    );
}

#[test]
fn test_logpoint_hits_at_different_points_coexist() {
    let mut store = MessageStore::create();
    for point in ["100", "200"] {
        store.add_message(draft(json!({
            "type": "log",
            "logpointId": "G",
            "text": point,
            "executionPoint": point,
            "executionPointTime": 1.0
        })));
    }
    assert_eq!(store.state().visible_ids().len(), 2);
}

#[test]
fn test_cleared_group_drops_late_messages() {
    let mut store = MessageStore::create();
    store.add_message(draft(json!({
        "type": "logpoint-loading",
        "logpointId": "G",
        "executionPoint": "5",
        "executionPointTime": 0.5
    })));
    let cleared = store.clear_logpoint_group(LogGroupId::new("G"));
    assert_eq!(cleared.removed, vec![MessageId(1)]);

    let late = store.add_message(draft(json!({
        "type": "log",
        "logpointId": "G",
        "text": "stale",
        "executionPoint": "5",
        "executionPointTime": 0.5
    })));
    assert_eq!(late.rejected, 1);
    assert!(late.stored.is_empty());
    assert!(store.state().is_empty());
}

#[test]
fn test_clear_evaluation_removes_paired_result() {
    let mut store = MessageStore::create();
    store.add_message(log_at("program", "10"));
    store.set_paused(PausePoint::new(ExecutionPoint::from(10), 1.0));
    store.add_messages(vec![
        draft(json!({ "type": "command", "text": "a", "evalId": 1 })),
        draft(json!({ "type": "command", "text": "b", "evalId": 2 })),
        draft(json!({ "type": "result", "text": "A", "evalId": 1 })),
        draft(json!({ "type": "result", "text": "B", "evalId": 2 })),
    ]);
    assert_eq!(texts(&store), vec!["program", "a", "A", "b", "B"]);

    let transition = store.clear_evaluation(MessageId(2));
    assert_eq!(transition.removed, vec![MessageId(2), MessageId(4)]);
    assert_eq!(texts(&store), vec!["program", "b", "B"]);
}

#[test]
fn test_adjacent_pairing_removes_next_id() {
    let mut store = MessageStore::with_config(StoreConfig {
        pairing: EvaluationPairing::AdjacentId,
        ..StoreConfig::default()
    });
    store.add_messages(vec![
        draft(json!({ "type": "command", "text": "a", "evalId": 1 })),
        draft(json!({ "type": "result", "text": "A", "evalId": 1 })),
    ]);
    let transition = store.clear_evaluation(MessageId(1));
    assert_eq!(transition.removed, vec![MessageId(1), MessageId(2)]);

    // Nothing at id + 1: still a no-op for the missing half.
    store.add_message(draft(json!({ "type": "command", "text": "c", "evalId": 3 })));
    let transition = store.clear_evaluation(MessageId(3));
    assert_eq!(transition.removed, vec![MessageId(3)]);
}

#[test]
fn test_clear_evaluations_keeps_program_output() {
    let mut store = MessageStore::create();
    store.add_messages(vec![
        log_at("program", "1"),
        draft(json!({ "type": "command", "text": "a", "evalId": 1 })),
        draft(json!({ "type": "result", "text": "A", "evalId": 1 })),
    ]);
    store.clear_evaluations();
    assert_eq!(texts(&store), vec!["program"]);
}

#[test]
fn test_overflow_is_sticky() {
    let mut store = MessageStore::create();
    store.mark_overflow();
    store.add_message(log_at("a", "1"));
    store.clear_messages();
    store.add_message(log_at("b", "2"));
    assert!(store.state().overflow());
}

#[test]
fn test_reset_starts_a_fresh_session() {
    let mut store = MessageStore::create();
    store.mark_overflow();
    store.add_message(log_at("a", "1"));
    store.clear_logpoint_group(LogGroupId::new("G"));
    store.reset();
    assert!(store.state().is_empty());
    assert!(!store.state().overflow());
    assert!(!store.state().has_execution_points());
    assert_eq!(store.state().logpoints().suppressed_groups(), 0);
}

#[test]
fn test_timestamp_mode_orders_by_time() {
    let mut store = MessageStore::with_config(StoreConfig {
        ordering: OrderingMode::Timestamp,
        ..StoreConfig::default()
    });
    store.add_messages(vec![
        draft(json!({
            "type": "log",
            "text": "late",
            "executionPoint": "1",
            "executionPointTime": 9.0
        })),
        draft(json!({
            "type": "log",
            "text": "early",
            "executionPoint": "2",
            "executionPointTime": 3.0
        })),
    ]);
    assert_eq!(texts(&store), vec!["early", "late"]);
}

#[test]
fn test_injected_id_generator() {
    let mut store = MessageStore::with_id_generator(
        StoreConfig::default(),
        Box::new(SequentialIds::starting_at(100)),
    );
    let transition = store.add_message(log_at("a", "1"));
    assert_eq!(transition.stored, vec![MessageId(100)]);
}
