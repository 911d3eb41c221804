//! Capability boundaries consumed by the dispatcher.
//!
//! Each backend (mail, calendar, drive) is a black box behind one of these
//! traits. Implementations own transport, auth and serialization; the
//! dispatcher only sees the normalized records defined here.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// MIME type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Gmail system label carrying unread state.
pub const UNREAD_LABEL: &str = "UNREAD";

/// Gmail system label removed when a message is moved elsewhere.
pub const INBOX_LABEL: &str = "INBOX";

// ============================================================================
// Mail
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageSummary {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub snippet: String,
}

/// Bare message reference as returned by search and label listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentInfo {
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
}

/// Full message with decoded bodies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageDetail {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub to: String,
    pub date: String,
    pub snippet: String,
    pub body_plain: Option<String>,
    pub body_html: Option<String>,
    pub attachments: Vec<AttachmentInfo>,
}

impl MessageDetail {
    /// Plain body when present, otherwise the HTML body.
    pub fn body(&self) -> &str {
        self.body_plain
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .or(self.body_html.as_deref())
            .unwrap_or("")
    }
}

/// A message to send to a single recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
    pub attachments: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

#[async_trait]
pub trait MailCapability: Send + Sync {
    /// Most recent messages, newest first, with headers resolved.
    async fn list_recent(&self, max: usize) -> anyhow::Result<Vec<MessageSummary>>;

    async fn search(&self, query: &str, max: usize) -> anyhow::Result<Vec<MessageRef>>;

    async fn get_detail(&self, id: &str) -> anyhow::Result<MessageDetail>;

    async fn send(&self, message: &OutgoingMessage) -> anyhow::Result<()>;

    /// Move a message to the trash.
    async fn trash(&self, id: &str) -> anyhow::Result<()>;

    async fn modify_labels(&self, id: &str, add: &[String], remove: &[String])
    -> anyhow::Result<()>;

    /// Modify labels on several messages. Backends with a bulk endpoint
    /// should override this.
    async fn batch_modify_labels(
        &self,
        ids: &[String],
        add: &[String],
        remove: &[String],
    ) -> anyhow::Result<()> {
        for id in ids {
            self.modify_labels(id, add, remove).await?;
        }
        Ok(())
    }

    async fn list_labels(&self) -> anyhow::Result<Vec<Label>>;

    async fn create_label(&self, name: &str) -> anyhow::Result<Label>;

    async fn update_label(&self, id: &str, name: &str) -> anyhow::Result<Label>;

    async fn delete_label(&self, id: &str) -> anyhow::Result<()>;

    async fn list_by_label(&self, label_ids: &[String], max: usize)
    -> anyhow::Result<Vec<MessageRef>>;
}

/// Produces a prose summary of a set of messages.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, messages: &[MessageSummary]) -> anyhow::Result<String>;
}

// ============================================================================
// Calendar
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    /// RFC3339 date-time, or a bare date for all-day events.
    pub start: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub summary: String,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedEvent {
    pub id: String,
    pub link: Option<String>,
}

#[async_trait]
pub trait CalendarCapability: Send + Sync {
    /// Upcoming events in start-time order.
    async fn list_upcoming(&self, max: usize) -> anyhow::Result<Vec<CalendarEvent>>;

    async fn insert_event(&self, event: &NewEvent) -> anyhow::Result<CreatedEvent>;
}

// ============================================================================
// Drive
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub parents: Vec<String>,
    pub modified_time: Option<String>,
    pub web_view_link: Option<String>,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// File listing filter. All present conditions are ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriveQuery {
    pub name_contains: Option<String>,
    pub name_equals: Option<String>,
    pub mime_type: Option<String>,
    pub limit: usize,
}

impl DriveQuery {
    /// Folders whose name equals `name` exactly.
    pub fn folder_named(name: &str, limit: usize) -> Self {
        Self {
            name_equals: Some(name.to_string()),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            limit,
            ..Default::default()
        }
    }

    /// Files whose name equals `name` exactly.
    pub fn named(name: &str, limit: usize) -> Self {
        Self {
            name_equals: Some(name.to_string()),
            limit,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionRequest {
    pub email: String,
    pub role: String,
    pub kind: String,
}

#[async_trait]
pub trait DriveCapability: Send + Sync {
    async fn list(&self, query: &DriveQuery) -> anyhow::Result<Vec<DriveFile>>;

    async fn get(&self, id: &str) -> anyhow::Result<DriveFile>;

    /// Download file content to `dest`, returning the number of bytes written.
    async fn download(&self, id: &str, dest: &Path) -> anyhow::Result<u64>;

    async fn upload(
        &self,
        path: &Path,
        folder_id: Option<&str>,
        mime_type: Option<&str>,
    ) -> anyhow::Result<DriveFile>;

    async fn delete(&self, id: &str) -> anyhow::Result<()>;

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> anyhow::Result<DriveFile>;

    /// Add `add_parent` and remove every id in `remove_parents`.
    async fn update_parents(
        &self,
        id: &str,
        add_parent: &str,
        remove_parents: &[String],
    ) -> anyhow::Result<DriveFile>;

    async fn create_permission(&self, id: &str, request: &PermissionRequest) -> anyhow::Result<()>;
}
