//! Calendar dispatch tests. The harness clock reads 2024-05-01 10:00 at UTC+5:30.

use super::common::*;
use pretty_assertions::assert_eq;
use relay_core::Service;
use relay_runtime::NewEvent;
use serde_json::json;

fn inserted(h: &Harness) -> Vec<NewEvent> {
    h.log
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::InsertEvent(e) => Some(e),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn tomorrow_without_time_books_nine_to_ten() {
    let mut h = Harness::new();
    let summary = h
        .run(
            Service::Calendar,
            vec![step("create", json!({"date": "tomorrow"}))],
        )
        .await;

    assert_eq!(
        inserted(&h),
        vec![NewEvent {
            summary: "No Title".to_string(),
            start: "2024-05-02T09:00:00+05:30".to_string(),
            end: "2024-05-02T10:00:00+05:30".to_string(),
            description: None,
            time_zone: Some("Asia/Kolkata".to_string()),
        }]
    );
    assert_eq!(summary.context.ids(), vec!["evt-new"]);
}

#[tokio::test]
async fn time_sets_a_one_hour_slot() {
    let mut h = Harness::new();
    h.run(
        Service::Calendar,
        vec![step(
            "create",
            json!({"date": "2024-05-10", "time": "3pm", "summary": "Dentist", "description": "Bring forms"}),
        )],
    )
    .await;

    let event = &inserted(&h)[0];
    assert_eq!(event.summary, "Dentist");
    assert_eq!(event.start, "2024-05-10T15:00:00+05:30");
    assert_eq!(event.end, "2024-05-10T16:00:00+05:30");
    assert_eq!(event.description.as_deref(), Some("Bring forms"));
}

#[tokio::test]
async fn explicit_start_and_end_are_passed_through() {
    let mut h = Harness::new();
    h.run(
        Service::Calendar,
        vec![step(
            "create",
            json!({"start": "2024-05-03T08:00:00+05:30", "end": "2024-05-03T08:30:00+05:30"}),
        )],
    )
    .await;

    let event = &inserted(&h)[0];
    assert_eq!(event.start, "2024-05-03T08:00:00+05:30");
    assert_eq!(event.end, "2024-05-03T08:30:00+05:30");
}

#[tokio::test]
async fn create_without_date_or_window_fails_before_backend() {
    let mut h = Harness::new();
    h.run(
        Service::Calendar,
        vec![step("create", json!({"summary": "Sync"}))],
    )
    .await;

    assert_eq!(h.failure(0), "missing_parameter");
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn unparseable_time_is_invalid() {
    let mut h = Harness::new();
    h.run(
        Service::Calendar,
        vec![step("create", json!({"date": "today", "time": "after lunch"}))],
    )
    .await;

    assert_eq!(h.failure(0), "invalid_parameter");
    assert!(inserted(&h).is_empty());
}

#[tokio::test]
async fn list_populates_context_with_start_and_summary() {
    let mut h = Harness::new();
    let summary = h
        .run(Service::Calendar, vec![step("list", json!({}))])
        .await;

    assert_eq!(h.log.calls(), vec![Call::ListEvents(5)]);
    let items = summary.context.items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].id, "e1");
    assert_eq!(items[0].field("start"), Some("2024-05-02T10:00:00+05:30"));
    assert_eq!(items[0].field("summary"), Some("Event 1"));
}

#[tokio::test]
async fn create_replaces_listed_events() {
    let mut h = Harness::new();
    let summary = h
        .run(
            Service::Calendar,
            vec![
                step("list", json!({"count": 2})),
                step("create", json!({"date": "today", "time": "4:30 pm"})),
            ],
        )
        .await;

    assert_eq!(summary.context.ids(), vec!["evt-new"]);
    assert_eq!(inserted(&h)[0].start, "2024-05-01T16:30:00+05:30");
}
