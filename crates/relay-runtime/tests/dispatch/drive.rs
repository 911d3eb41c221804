//! Drive dispatch tests: file name heuristics and the folder cache.

use super::common::*;
use pretty_assertions::assert_eq;
use relay_core::{DriveConfig, Service};
use relay_runtime::{DriveQuery, FOLDER_MIME_TYPE};
use serde_json::json;

fn folder_scans(h: &Harness) -> usize {
    h.log
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::ListFiles(q) if q.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)))
        .count()
}

// =============================================================================
// FOLDER CACHE
// =============================================================================

#[tokio::test]
async fn folder_names_are_resolved_once() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![
            step("move_file", json!({"file_id": "doc-budget_1", "folder": "Reports"})),
            step("move_file", json!({"file_id": "doc-notes_1", "folder": "Reports"})),
        ],
    )
    .await;

    assert_eq!(folder_scans(&h), 1);
    assert_eq!(h.dispatcher.cache().folder("Reports"), Some("fld-reports_1"));
    assert!(h.log.calls().contains(&Call::UpdateParents(
        "doc-budget_1".to_string(),
        "fld-reports_1".to_string(),
        vec!["root".to_string()],
    )));
}

#[tokio::test]
async fn folder_cache_outlives_the_batch() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![step("move_file", json!({"file_id": "doc-budget_1", "folder": "Archive"}))],
    )
    .await;
    h.run(
        Service::Drive,
        vec![step("move_file", json!({"file_id": "doc-notes_1", "folder": "Archive"}))],
    )
    .await;

    assert_eq!(folder_scans(&h), 1);
}

#[tokio::test]
async fn created_folders_resolve_without_lookup() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![
            step("create_folder", json!({"name": "Taxes"})),
            step("move_file", json!({"file_id": "doc-budget_1", "folder": "Taxes"})),
        ],
    )
    .await;

    assert_eq!(folder_scans(&h), 0);
    assert!(h.log.calls().contains(&Call::UpdateParents(
        "doc-budget_1".to_string(),
        "fld-new_1".to_string(),
        vec!["root".to_string()],
    )));
}

#[tokio::test]
async fn folder_names_are_case_sensitive() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![step("move_file", json!({"file_id": "doc-budget_1", "folder": "reports"}))],
    )
    .await;

    assert_eq!(h.failure(0), "not_found");
}

#[tokio::test]
async fn deleted_folder_is_not_served_from_cache() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![
            step("move_file", json!({"file_id": "doc-budget_1", "folder": "Reports"})),
            step("delete_file", json!({"file_id": "fld-reports_1"})),
            step("move_file", json!({"file_id": "doc-notes_1", "folder": "Reports"})),
        ],
    )
    .await;

    assert_eq!(h.dispatcher.cache().folder("Reports"), None);
    assert_eq!(folder_scans(&h), 2);
    assert_eq!(h.failure(2), "not_found");
}

#[tokio::test]
async fn folder_names_are_filtered_by_the_backend() {
    let mut h = Harness::new();
    h.drive
        .insert((0..1500).map(|n| folder(&format!("fld-bulk_{}", n), &format!("Bulk {}", n))));
    h.run(
        Service::Drive,
        vec![step("move_file", json!({"file_id": "doc-budget_1", "folder": "Bulk 1499"}))],
    )
    .await;

    assert_eq!(
        h.log.calls()[0],
        Call::ListFiles(DriveQuery::folder_named("Bulk 1499", 10))
    );
    assert!(h.log.calls().contains(&Call::UpdateParents(
        "doc-budget_1".to_string(),
        "fld-bulk_1499".to_string(),
        vec!["root".to_string()],
    )));
}

#[tokio::test]
async fn folder_ids_are_confirmed_with_get() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![step("move_file", json!({"file_id": "doc-budget_1", "folder": "fld-archive_1"}))],
    )
    .await;

    let calls = h.log.calls();
    assert_eq!(calls[0], Call::ListFiles(DriveQuery::folder_named("fld-archive_1", 10)));
    assert_eq!(calls[1], Call::GetFile("fld-archive_1".to_string()));
    assert!(calls.contains(&Call::UpdateParents(
        "doc-budget_1".to_string(),
        "fld-archive_1".to_string(),
        vec!["root".to_string()],
    )));
    assert_eq!(h.dispatcher.cache().folder("fld-archive_1"), None);
}

#[tokio::test]
async fn file_id_is_not_accepted_as_folder() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![step("move_file", json!({"file_id": "doc-budget_1", "folder": "doc-notes_1"}))],
    )
    .await;

    assert_eq!(h.failure(0), "not_found");
    assert!(!h.log.calls().iter().any(|c| matches!(c, Call::UpdateParents(..))));
}

#[tokio::test]
async fn recreated_folder_replaces_stale_entry() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![
            step("create_folder", json!({"name": "Inbox Scans"})),
            step("delete_file", json!({"file_id": "fld-new_1"})),
            step("create_folder", json!({"name": "Inbox Scans"})),
        ],
    )
    .await;

    assert_eq!(h.dispatcher.cache().folder("Inbox Scans"), Some("fld-new_2"));
}

// =============================================================================
// FILES
// =============================================================================

#[tokio::test]
async fn download_resolves_bare_names() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("budget-copy.pdf");

    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![step(
            "download_file",
            json!({"file_id": "budget.pdf", "destination": dest.to_string_lossy()}),
        )],
    )
    .await;

    assert_eq!(
        h.log.calls(),
        vec![
            Call::ListFiles(DriveQuery::named("budget.pdf", 10)),
            Call::Download("doc-budget_1".to_string()),
        ]
    );
    assert_eq!(
        std::fs::read_to_string(&dest).unwrap(),
        "content of budget.pdf"
    );
}

#[tokio::test]
async fn default_download_lands_in_download_dir() {
    let dir = tempfile::tempdir().unwrap();
    let download_dir = dir.path().join("downloads");

    let mut h = Harness::new().with_drive_config(DriveConfig {
        download_dir: download_dir.clone(),
        ..Default::default()
    });
    h.run(
        Service::Drive,
        vec![step("download_file", json!({"file_id": "doc-budget_1"}))],
    )
    .await;

    assert_eq!(
        std::fs::read_to_string(download_dir.join("budget.pdf")).unwrap(),
        "content of budget.pdf"
    );
}

#[tokio::test]
async fn remote_names_cannot_escape_download_dir() {
    let dir = tempfile::tempdir().unwrap();
    let download_dir = dir.path().join("a").join("b");

    let mut h = Harness::new().with_drive_config(DriveConfig {
        download_dir: download_dir.clone(),
        ..Default::default()
    });
    h.drive.insert([
        file("doc-evil_1", "../../outside/evil.sh", "root"),
        file("doc-dots_1", "..", "root"),
    ]);
    h.run(
        Service::Drive,
        vec![
            step("download_file", json!({"file_id": "doc-evil_1"})),
            step("download_file", json!({"file_id": "doc-dots_1"})),
        ],
    )
    .await;

    assert_eq!(
        std::fs::read_to_string(download_dir.join("evil.sh")).unwrap(),
        "content of ../../outside/evil.sh"
    );
    assert!(!dir.path().join("outside").exists());
    assert_eq!(h.failure(1), "invalid_parameter");
    assert!(!h.log.calls().contains(&Call::Download("doc-dots_1".to_string())));
}

#[tokio::test]
async fn ids_are_never_looked_up_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("notes.pdf");

    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![step(
            "download_file",
            json!({"file_id": "doc-notes_1", "destination": dest.to_string_lossy()}),
        )],
    )
    .await;

    assert_eq!(h.log.calls(), vec![Call::Download("doc-notes_1".to_string())]);
}

#[tokio::test]
async fn unknown_file_name_is_not_found() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![step("download_file", json!({"file_id": "missing.pdf"}))],
    )
    .await;

    assert_eq!(h.failure(0), "not_found");
}

#[tokio::test]
async fn upload_resolves_target_folder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.pdf");
    std::fs::write(&path, b"%PDF").unwrap();

    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![step(
            "upload_file",
            json!({"path": path.to_string_lossy(), "folder": "Archive"}),
        )],
    )
    .await;

    assert!(h.log.calls().contains(&Call::Upload(
        "scan.pdf".to_string(),
        Some("fld-archive_1".to_string())
    )));
}

#[tokio::test]
async fn upload_of_missing_local_file_is_invalid() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![step("upload_file", json!({"path": "/nonexistent/relay/scan.pdf"}))],
    )
    .await;

    assert_eq!(h.failure(0), "invalid_parameter");
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn list_files_composes_filters_and_keeps_context() {
    let mut h = Harness::new();
    let summary = h
        .run(
            Service::Drive,
            vec![step(
                "list_files",
                json!({"name": "pdf", "mime_type": "application/pdf", "count": 5}),
            )],
        )
        .await;

    assert_eq!(
        h.log.calls(),
        vec![Call::ListFiles(DriveQuery {
            name_contains: Some("pdf".to_string()),
            mime_type: Some("application/pdf".to_string()),
            limit: 5,
            ..Default::default()
        })]
    );
    assert_eq!(h.lines(0)[0], "Found 2 files");
    assert!(summary.context.is_empty());
}

#[tokio::test]
async fn share_sends_permission() {
    let mut h = Harness::new();
    h.run(
        Service::Drive,
        vec![step(
            "share_file",
            json!({"file_id": "doc-budget_1", "email": "cfo@example.com", "role": "writer"}),
        )],
    )
    .await;

    match &h.log.calls()[0] {
        Call::Share(id, request) => {
            assert_eq!(id, "doc-budget_1");
            assert_eq!(request.email, "cfo@example.com");
            assert_eq!(request.role, "writer");
            assert_eq!(request.kind, "user");
        }
        other => panic!("expected share, got {:?}", other),
    }
}
