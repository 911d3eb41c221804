//! Gmail API v1.

use crate::error::GoogleApiError;
use crate::http::ApiClient;
use crate::mime::{self, Attachment, Message};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use relay_runtime::{
    AttachmentInfo, Label, MailCapability, MessageDetail, MessageRef, MessageSummary,
    OutgoingMessage,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Gmail caps `batchModify` at 1000 ids per call.
const BATCH_MODIFY_LIMIT: usize = 1000;

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageStub>,
}

#[derive(Debug, Deserialize)]
struct MessageStub {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    payload: Option<Payload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payload {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    body: Option<PayloadBody>,
    #[serde(default)]
    parts: Vec<Payload>,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadBody {
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    attachment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelListResponse {
    #[serde(default)]
    labels: Vec<RawLabel>,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    id: String,
    #[serde(default)]
    name: String,
}

impl From<RawLabel> for Label {
    fn from(raw: RawLabel) -> Self {
        Label {
            id: raw.id,
            name: raw.name,
        }
    }
}

impl RawMessage {
    fn header(&self, name: &str) -> String {
        self.payload
            .as_ref()
            .and_then(|p| p.headers.iter().find(|h| h.name.eq_ignore_ascii_case(name)))
            .map(|h| h.value.clone())
            .unwrap_or_default()
    }

    fn into_summary(self) -> MessageSummary {
        MessageSummary {
            subject: self.header("Subject"),
            from: self.header("From"),
            id: self.id,
            snippet: self.snippet,
        }
    }

    fn into_detail(self) -> MessageDetail {
        let mut detail = MessageDetail {
            subject: self.header("Subject"),
            from: self.header("From"),
            to: self.header("To"),
            date: self.header("Date"),
            ..Default::default()
        };
        if let Some(payload) = &self.payload {
            detail.body_plain = find_body(payload, "text/plain");
            detail.body_html = find_body(payload, "text/html");
            collect_attachments(payload, &mut detail.attachments);
        }
        detail.id = self.id;
        detail.snippet = self.snippet;
        detail
    }
}

/// Depth-first search for an inline body of the given MIME type.
fn find_body(payload: &Payload, mime_type: &str) -> Option<String> {
    if payload.mime_type == mime_type && payload.filename.is_empty() {
        if let Some(data) = payload.body.as_ref().and_then(|b| b.data.as_deref()) {
            return decode_url_safe_base64(data);
        }
    }
    payload.parts.iter().find_map(|p| find_body(p, mime_type))
}

fn collect_attachments(payload: &Payload, out: &mut Vec<AttachmentInfo>) {
    let is_attachment = !payload.filename.is_empty()
        && payload
            .body
            .as_ref()
            .is_some_and(|b| b.attachment_id.is_some() || b.size > 0);
    if is_attachment {
        out.push(AttachmentInfo {
            filename: payload.filename.clone(),
            mime_type: payload.mime_type.clone(),
            size: payload.body.as_ref().map_or(0, |b| b.size),
        });
    }
    for part in &payload.parts {
        collect_attachments(part, out);
    }
}

/// Gmail pads inconsistently; strip padding before decoding.
fn decode_url_safe_base64(data: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

// ============================================================================
// Client
// ============================================================================

pub struct GmailClient {
    api: ApiClient,
    base_url: String,
}

impl GmailClient {
    pub fn new(api: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn list_ids(&self, params: &[(&str, String)]) -> Result<Vec<MessageRef>, GoogleApiError> {
        let list: MessageListResponse = self
            .api
            .json(self.api.get(&self.url("messages")).query(params))
            .await?;
        Ok(list
            .messages
            .into_iter()
            .map(|m| MessageRef { id: m.id })
            .collect())
    }

    async fn fetch(&self, id: &str, params: &[(&str, &str)]) -> Result<RawMessage, GoogleApiError> {
        self.api
            .json(self.api.get(&self.url(&format!("messages/{}", id))).query(params))
            .await
    }
}

#[async_trait]
impl MailCapability for GmailClient {
    async fn list_recent(&self, max: usize) -> anyhow::Result<Vec<MessageSummary>> {
        let refs = self.list_ids(&[("maxResults", max.to_string())]).await?;
        let mut messages = Vec::with_capacity(refs.len());
        for r in refs {
            let raw = self
                .fetch(
                    &r.id,
                    &[
                        ("format", "metadata"),
                        ("metadataHeaders", "From"),
                        ("metadataHeaders", "Subject"),
                    ],
                )
                .await?;
            messages.push(raw.into_summary());
        }
        debug!(count = messages.len(), "listed recent messages");
        Ok(messages)
    }

    async fn search(&self, query: &str, max: usize) -> anyhow::Result<Vec<MessageRef>> {
        Ok(self
            .list_ids(&[("q", query.to_string()), ("maxResults", max.to_string())])
            .await?)
    }

    async fn get_detail(&self, id: &str) -> anyhow::Result<MessageDetail> {
        Ok(self.fetch(id, &[("format", "full")]).await?.into_detail())
    }

    async fn send(&self, message: &OutgoingMessage) -> anyhow::Result<()> {
        let mut attachments = Vec::with_capacity(message.attachments.len());
        for path in &message.attachments {
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| anyhow::anyhow!("cannot read attachment {}: {}", path.display(), e))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            attachments.push(Attachment::new(filename, data));
        }

        let rendered = mime::render(
            &Message {
                to: &message.to,
                subject: &message.subject,
                text: &message.body_text,
                html: message.body_html.as_deref(),
                attachments: &attachments,
            },
            &uuid::Uuid::new_v4().simple().to_string(),
        );
        self.api
            .execute(
                self.api
                    .post(&self.url("messages/send"))
                    .json(&json!({ "raw": mime::encode_raw(&rendered) })),
            )
            .await?;
        Ok(())
    }

    async fn trash(&self, id: &str) -> anyhow::Result<()> {
        self.api
            .execute(self.api.post(&self.url(&format!("messages/{}/trash", id))))
            .await?;
        Ok(())
    }

    async fn modify_labels(
        &self,
        id: &str,
        add: &[String],
        remove: &[String],
    ) -> anyhow::Result<()> {
        self.api
            .execute(
                self.api
                    .post(&self.url(&format!("messages/{}/modify", id)))
                    .json(&json!({ "addLabelIds": add, "removeLabelIds": remove })),
            )
            .await?;
        Ok(())
    }

    async fn batch_modify_labels(
        &self,
        ids: &[String],
        add: &[String],
        remove: &[String],
    ) -> anyhow::Result<()> {
        for chunk in ids.chunks(BATCH_MODIFY_LIMIT) {
            self.api
                .execute(self.api.post(&self.url("messages/batchModify")).json(&json!({
                    "ids": chunk,
                    "addLabelIds": add,
                    "removeLabelIds": remove,
                })))
                .await?;
        }
        Ok(())
    }

    async fn list_labels(&self) -> anyhow::Result<Vec<Label>> {
        let list: LabelListResponse = self.api.json(self.api.get(&self.url("labels"))).await?;
        Ok(list.labels.into_iter().map(Label::from).collect())
    }

    async fn create_label(&self, name: &str) -> anyhow::Result<Label> {
        let raw: RawLabel = self
            .api
            .json(self.api.post(&self.url("labels")).json(&json!({
                "name": name,
                "labelListVisibility": "labelShow",
                "messageListVisibility": "show",
            })))
            .await?;
        Ok(raw.into())
    }

    async fn update_label(&self, id: &str, name: &str) -> anyhow::Result<Label> {
        let raw: RawLabel = self
            .api
            .json(
                self.api
                    .patch(&self.url(&format!("labels/{}", id)))
                    .json(&json!({ "name": name })),
            )
            .await?;
        Ok(raw.into())
    }

    async fn delete_label(&self, id: &str) -> anyhow::Result<()> {
        self.api
            .execute(self.api.delete(&self.url(&format!("labels/{}", id))))
            .await?;
        Ok(())
    }

    async fn list_by_label(
        &self,
        label_ids: &[String],
        max: usize,
    ) -> anyhow::Result<Vec<MessageRef>> {
        let mut params: Vec<(&str, String)> = label_ids
            .iter()
            .map(|id| ("labelIds", id.clone()))
            .collect();
        params.push(("maxResults", max.to_string()));
        Ok(self.list_ids(&params).await?)
    }
}
