#![allow(missing_docs)]

use std::collections::HashSet;

use console_session::SessionEvent;
use console_store::StoreEvent;

fn all_ids() -> Vec<&'static str> {
    StoreEvent::ALL
        .iter()
        .copied()
        .map(StoreEvent::as_str)
        .chain(SessionEvent::ALL.iter().copied().map(SessionEvent::as_str))
        .collect()
}

#[test]
fn event_ids_are_non_empty_and_unique() {
    let mut seen = HashSet::new();
    for id in all_ids() {
        assert!(!id.is_empty());
        assert!(
            seen.insert(id),
            "duplicate observability event id detected: {id}"
        );
    }
}

#[test]
fn event_ids_follow_namespace_convention() {
    for id in all_ids() {
        assert!(
            id.starts_with("console.store.")
                || id.starts_with("console.search.")
                || id.starts_with("console.session.")
                || id.starts_with("console.ingest.")
                || id.starts_with("console.settings."),
            "unexpected event namespace: {id}"
        );
    }
}

#[test]
fn ingestion_events_are_registered() {
    let ids: HashSet<&str> = all_ids().into_iter().collect();
    for expected in [
        "console.ingest.batch_scheduled",
        "console.ingest.batch_applied",
        "console.ingest.batch_flushed",
        "console.ingest.batch_abandoned",
        "console.store.message_superseded",
        "console.search.published",
    ] {
        assert!(ids.contains(expected), "missing event id: {expected}");
    }
}
