//! Mail dispatch tests.
//!
//! Covers the literal → query → context fallback, which steps replace or
//! clear the context, and label name resolution.

use super::common::*;
use pretty_assertions::assert_eq;
use relay_core::Service;
use serde_json::json;

fn unread() -> Vec<String> {
    vec!["UNREAD".to_string()]
}

// =============================================================================
// CONTEXT PROPAGATION
// =============================================================================

#[tokio::test]
async fn list_replaces_context_with_listed_messages() {
    let log = CallLog::default();
    let mail = FakeMail::new(log.clone()).with_messages(vec![message("X", "S", "F")]);
    let mut h = Harness::with_mail(mail, log);

    let summary = h.run(Service::Mail, vec![step("list", json!({}))]).await;

    let items = summary.context.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "X");
    assert_eq!(items[0].field("subject"), Some("S"));
    assert_eq!(items[0].field("from"), Some("F"));
    assert_eq!(h.log.calls(), vec![Call::ListRecent(5)]);
}

#[tokio::test]
async fn delete_after_list_targets_only_listed_messages() {
    let log = CallLog::default();
    let mail = FakeMail::new(log.clone()).with_messages(vec![message("X", "S", "F")]);
    let mut h = Harness::with_mail(mail, log);

    let summary = h
        .run(
            Service::Mail,
            vec![step("list", json!({})), step("delete", json!({}))],
        )
        .await;

    assert_eq!(h.log.trashed(), vec!["X"]);
    assert!(summary.context.is_empty());
}

#[tokio::test]
async fn delete_consumes_whole_context() {
    let log = CallLog::default();
    let mail = FakeMail::new(log.clone())
        .with_messages(vec![message("A", "a", "x@example.com"), message("B", "b", "y@example.com")]);
    let mut h = Harness::with_mail(mail, log);

    let summary = h
        .run(
            Service::Mail,
            vec![step("list", json!({"count": 2})), step("batch_delete", json!({}))],
        )
        .await;

    assert_eq!(h.log.trashed(), vec!["A", "B"]);
    assert!(summary.context.is_empty());
    assert_eq!(h.lines(1), vec!["Deleted 2 messages"]);
}

#[tokio::test]
async fn delete_with_empty_context_fails_without_backend_calls() {
    let mut h = Harness::new();
    h.run(Service::Mail, vec![step("delete", json!({"ids": ["m1"]}))])
        .await;

    assert_eq!(h.failure(0), "missing_target");
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn mark_read_falls_back_to_listed_messages() {
    let mut h = Harness::new();
    let summary = h
        .run(
            Service::Mail,
            vec![step("list", json!({"count": 2})), step("mark_read", json!({}))],
        )
        .await;

    let modified = h.log.modified();
    assert_eq!(
        modified,
        vec![
            ("m1".to_string(), vec![], unread()),
            ("m2".to_string(), vec![], unread()),
        ]
    );
    assert!(summary.context.is_empty());
}

#[tokio::test]
async fn literal_id_wins_over_context() {
    let mut h = Harness::new();
    h.run(
        Service::Mail,
        vec![
            step("list", json!({"count": 2})),
            step("mark_unread", json!({"id": "m3"})),
        ],
    )
    .await;

    assert_eq!(
        h.log.modified(),
        vec![("m3".to_string(), unread(), vec![])]
    );
}

#[tokio::test]
async fn placeholder_ids_fall_back_to_context() {
    let mut h = Harness::new();
    h.run(
        Service::Mail,
        vec![
            step("list", json!({"count": 1})),
            step("mark_read", json!({"id": "{{steps.0.id}}"})),
        ],
    )
    .await;

    assert_eq!(h.log.modified(), vec![("m1".to_string(), vec![], unread())]);
}

#[tokio::test]
async fn batch_mark_read_uses_explicit_ids() {
    let mut h = Harness::new();
    h.run(
        Service::Mail,
        vec![step("batch_mark_read", json!({"ids": ["m2", "m3"]}))],
    )
    .await;

    let ids: Vec<String> = h.log.modified().into_iter().map(|(id, _, _)| id).collect();
    assert_eq!(ids, vec!["m2", "m3"]);
}

// =============================================================================
// READ
// =============================================================================

#[tokio::test]
async fn read_uses_literal_id() {
    let mut h = Harness::new();
    h.run(
        Service::Mail,
        vec![step("list", json!({})), step("read", json!({"id": "m3"}))],
    )
    .await;

    assert_eq!(
        h.log.calls(),
        vec![Call::ListRecent(5), Call::GetDetail("m3".to_string())]
    );
    let lines = h.lines(1);
    assert!(lines.contains(&"Subject: Lunch?".to_string()));
    assert!(lines.contains(&"Body of Lunch?".to_string()));
}

#[tokio::test]
async fn read_runs_query_before_context() {
    let mut h = Harness::new();
    h.run(
        Service::Mail,
        vec![
            step("list", json!({})),
            step("read", json!({"query": "Standup"})),
        ],
    )
    .await;

    assert_eq!(
        h.log.calls()[1..].to_vec(),
        vec![
            Call::Search("Standup".to_string(), 1),
            Call::GetDetail("m2".to_string()),
        ]
    );
}

#[tokio::test]
async fn read_takes_count_items_from_context_then_clears() {
    let mut h = Harness::new();
    let summary = h
        .run(
            Service::Mail,
            vec![step("list", json!({})), step("read", json!({"count": "2"}))],
        )
        .await;

    assert_eq!(
        h.log.calls()[1..].to_vec(),
        vec![
            Call::GetDetail("m1".to_string()),
            Call::GetDetail("m2".to_string()),
        ]
    );
    assert!(summary.context.is_empty());
}

#[tokio::test]
async fn search_fetches_detail_per_result() {
    let mut h = Harness::new();
    let summary = h
        .run(
            Service::Mail,
            vec![step("search", json!({"q": "example.com", "max_results": 2}))],
        )
        .await;

    assert_eq!(
        h.log.calls(),
        vec![
            Call::Search("example.com".to_string(), 2),
            Call::GetDetail("m1".to_string()),
            Call::GetDetail("m2".to_string()),
        ]
    );
    assert_eq!(summary.context.ids(), vec!["m1", "m2"]);
}

#[tokio::test]
async fn search_without_query_targets_recent_messages() {
    let mut h = Harness::new();
    let summary = h
        .run(
            Service::Mail,
            vec![
                step("search", json!({"count": 2})),
                step("mark_read", json!({})),
            ],
        )
        .await;

    assert_eq!(h.steps()[0].action, "search");
    assert_eq!(
        h.log.modified(),
        vec![
            ("m1".to_string(), vec![], unread()),
            ("m2".to_string(), vec![], unread()),
        ]
    );
    assert_eq!(h.log.calls()[0], Call::ListRecent(2));
    assert!(summary.context.is_empty());
}

#[tokio::test]
async fn attachments_info_defaults_to_first_context_item() {
    let mut h = Harness::new();
    h.run(
        Service::Mail,
        vec![step("list", json!({})), step("attachments_info", json!({}))],
    )
    .await;

    assert_eq!(h.log.calls()[1], Call::GetDetail("m1".to_string()));
    assert_eq!(h.lines(1), vec!["No attachments in 'Invoice'"]);
}

// =============================================================================
// LABELS
// =============================================================================

#[tokio::test]
async fn create_label_with_empty_name_fails_before_backend() {
    let mut h = Harness::new();
    h.run(Service::Mail, vec![step("create_label", json!({"name": ""}))])
        .await;

    assert_eq!(h.failure(0), "missing_parameter");
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn move_to_unknown_label_is_not_found() {
    let mut h = Harness::new();
    h.run(
        Service::Mail,
        vec![
            step("list", json!({"count": 1})),
            step("move", json!({"label_id": "Work"})),
        ],
    )
    .await;

    assert_eq!(h.failure(1), "not_found");
    assert!(h.log.modified().is_empty());
}

#[tokio::test]
async fn move_resolves_label_name_and_keeps_context() {
    let log = CallLog::default();
    let mail = FakeMail::new(log.clone()).with_label("L1", "Work");
    let mut h = Harness::with_mail(mail, log);

    let summary = h
        .run(
            Service::Mail,
            vec![
                step("list", json!({"count": 1})),
                step("move", json!({"label_id": "work"})),
                step("delete", json!({})),
            ],
        )
        .await;

    assert_eq!(
        h.log.modified(),
        vec![(
            "m1".to_string(),
            vec!["L1".to_string()],
            vec!["INBOX".to_string()]
        )]
    );
    assert_eq!(h.log.trashed(), vec!["m1"]);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn label_ids_are_used_unchanged() {
    let log = CallLog::default();
    let mail = FakeMail::new(log.clone()).with_label("Label_7", "Receipts");
    let mut h = Harness::with_mail(mail, log);

    h.run(
        Service::Mail,
        vec![step("update_label", json!({"id": "Label_7", "name": "Bills"}))],
    )
    .await;

    assert_eq!(
        h.log.calls(),
        vec![
            Call::ListLabels,
            Call::UpdateLabel("Label_7".to_string(), "Bills".to_string()),
        ]
    );
}

#[tokio::test]
async fn label_lists_are_never_cached() {
    let log = CallLog::default();
    let mail = FakeMail::new(log.clone()).with_label("L1", "Work");
    let mut h = Harness::with_mail(mail, log);

    h.run(
        Service::Mail,
        vec![
            step("delete_label", json!({"id": "Work"})),
            step("list_by_label", json!({"label_ids": ["Work"]})),
        ],
    )
    .await;

    let lookups = h
        .log
        .calls()
        .into_iter()
        .filter(|c| *c == Call::ListLabels)
        .count();
    assert_eq!(lookups, 2);
}

#[tokio::test]
async fn list_by_label_populates_bare_ids() {
    let log = CallLog::default();
    let mail = FakeMail::new(log.clone()).with_label("L1", "Work");
    let mut h = Harness::with_mail(mail, log);

    let summary = h
        .run(
            Service::Mail,
            vec![step("list_by_label", json!({"label_ids": "Work"}))],
        )
        .await;

    assert_eq!(
        h.log.calls()[1],
        Call::ListByLabel(vec!["L1".to_string()], 10)
    );
    assert_eq!(summary.context.ids(), vec!["m1", "m2"]);
    assert!(summary.context.items()[0].fields.is_empty());
}

#[tokio::test]
async fn list_by_label_requires_labels() {
    let mut h = Harness::new();
    h.run(Service::Mail, vec![step("list_by_label", json!({"label_ids": []}))])
        .await;

    assert_eq!(h.failure(0), "missing_parameter");
}

// =============================================================================
// SEND AND SUMMARIZE
// =============================================================================

#[tokio::test]
async fn send_goes_to_each_recipient_and_clears_context() {
    let mut h = Harness::new();
    let summary = h
        .run(
            Service::Mail,
            vec![
                step("list", json!({})),
                step(
                    "send",
                    json!({"to": ["a@example.com", "b@example.com"], "subject": "Hi", "body": "Hello"}),
                ),
            ],
        )
        .await;

    assert_eq!(
        h.log.calls()[1..].to_vec(),
        vec![
            Call::Send("a@example.com".to_string()),
            Call::Send("b@example.com".to_string()),
        ]
    );
    assert!(summary.context.is_empty());
}

#[tokio::test]
async fn summarize_reads_recent_messages_and_keeps_context() {
    let mut h = Harness::new();
    let summary = h
        .run(
            Service::Mail,
            vec![
                step("list", json!({"count": 1})),
                step("summarize_emails_with_ai", json!({})),
            ],
        )
        .await;

    assert_eq!(
        h.log.calls()[1..].to_vec(),
        vec![Call::ListRecent(3), Call::Summarize(3)]
    );
    assert_eq!(h.lines(1), vec!["3 messages, nothing urgent"]);
    assert_eq!(summary.context.ids(), vec!["m1"]);
}

// =============================================================================
// FAILURE BOUNDARY
// =============================================================================

#[tokio::test]
async fn failed_step_leaves_context_for_the_next_step() {
    let log = CallLog::default();
    let mail = FakeMail::new(log.clone()).failing("trash");
    let mut h = Harness::with_mail(mail, log);

    let summary = h
        .run(
            Service::Mail,
            vec![
                step("list", json!({"count": 2})),
                step("delete", json!({})),
                step("mark_read", json!({})),
            ],
        )
        .await;

    assert_eq!(h.failure(1), "backend");
    let ids: Vec<String> = h.log.modified().into_iter().map(|(id, _, _)| id).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn backend_failure_message_reaches_report() {
    let log = CallLog::default();
    let mail = FakeMail::new(log.clone()).failing("list_labels");
    let mut h = Harness::with_mail(mail, log);

    h.run(Service::Mail, vec![step("list_labels", json!({}))]).await;

    match &h.steps()[0].status {
        relay_runtime::StepStatus::Failed { kind, message } => {
            assert_eq!(*kind, "backend");
            assert!(message.contains("503 backend unavailable"), "{}", message);
        }
        other => panic!("expected failure, got {:?}", other),
    }
}
