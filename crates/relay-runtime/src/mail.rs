//! Mail actions.
//!
//! Parameters are validated while parsing a step into a [`MailAction`], so a
//! step with a missing required parameter fails before any backend call.

use crate::capability::{
    INBOX_LABEL, MailCapability, MessageDetail, MessageSummary, OutgoingMessage, Summarizer,
    UNREAD_LABEL,
};
use crate::context::{ContextUpdate, ExecutionContext, ResultItem, Take, TargetSource, select_targets};
use crate::dispatcher::StepOutcome;
use crate::resolver::NameResolver;
use relay_core::{ActionStep, DispatchError, MailActionKind, Params, Service};
use std::path::PathBuf;
use tracing::debug;

const COUNT_KEYS: &[&str] = &["count", "maxResults", "max_results"];
const QUERY_KEYS: &[&str] = &["query", "q"];

const DEFAULT_LIST_COUNT: usize = 5;
const DEFAULT_LABEL_LIST_COUNT: usize = 10;
const DEFAULT_SUMMARY_COUNT: usize = 3;

/// Longest body excerpt printed by `read`.
const BODY_PREVIEW_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq)]
pub enum MailAction {
    List {
        count: usize,
        query: Option<String>,
    },
    Search {
        query: String,
        count: usize,
    },
    Send {
        recipients: Vec<String>,
        subject: String,
        body_text: String,
        body_html: Option<String>,
        attachments: Vec<PathBuf>,
    },
    Read {
        ids: Vec<String>,
        query: Option<String>,
        count: Option<usize>,
    },
    AttachmentsInfo {
        id: Option<String>,
    },
    ListLabels,
    CreateLabel {
        name: String,
    },
    UpdateLabel {
        label: String,
        name: String,
    },
    DeleteLabel {
        label: String,
    },
    ListByLabel {
        labels: Vec<String>,
        count: usize,
    },
    MarkRead {
        ids: Vec<String>,
    },
    MarkUnread {
        ids: Vec<String>,
    },
    Move {
        ids: Vec<String>,
        label: String,
    },
    /// Trash every message in the context. There is no direct-ID form.
    Delete {
        kind: MailActionKind,
    },
    BatchMarkRead {
        ids: Vec<String>,
    },
    Summarize {
        count: usize,
    },
}

impl MailAction {
    pub fn parse(step: &ActionStep) -> Result<Self, DispatchError> {
        let kind = MailActionKind::parse(&step.action).ok_or_else(|| {
            DispatchError::UnsupportedAction {
                service: Service::Mail,
                action: step.action.clone(),
            }
        })?;
        let name = kind.name();
        let p = &step.parameters;

        let action = match kind {
            MailActionKind::List => MailAction::List {
                count: p.count(name, COUNT_KEYS)?.unwrap_or(DEFAULT_LIST_COUNT),
                query: p.string_any(QUERY_KEYS),
            },
            // A search without a query lists recent mail.
            MailActionKind::Search => {
                let count = p.count(name, COUNT_KEYS)?.unwrap_or(DEFAULT_LIST_COUNT);
                match p.string_any(QUERY_KEYS) {
                    Some(query) => MailAction::Search { query, count },
                    None => MailAction::List { count, query: None },
                }
            }
            MailActionKind::Send => {
                let recipients = p.string_list("to");
                if recipients.is_empty() {
                    return Err(DispatchError::missing_parameter(name, "to"));
                }
                MailAction::Send {
                    recipients,
                    subject: p.require_string(name, "subject")?,
                    body_text: p
                        .string_any(&["body", "body_text"])
                        .ok_or_else(|| DispatchError::missing_parameter(name, "body"))?,
                    body_html: p.string_any(&["html", "body_html"]),
                    attachments: p.string_list("attachments").into_iter().map(PathBuf::from).collect(),
                }
            }
            MailActionKind::Read => MailAction::Read {
                ids: explicit_ids(p),
                query: p.string_any(QUERY_KEYS),
                count: p.count(name, COUNT_KEYS)?,
            },
            MailActionKind::AttachmentsInfo => MailAction::AttachmentsInfo {
                id: p.literal_id("id"),
            },
            MailActionKind::ListLabels => MailAction::ListLabels,
            MailActionKind::CreateLabel => MailAction::CreateLabel {
                name: p.require_string(name, "name")?,
            },
            MailActionKind::UpdateLabel => MailAction::UpdateLabel {
                label: label_identifier(p, name, "id")?,
                name: p
                    .string_any(&["name", "new_name"])
                    .ok_or_else(|| DispatchError::missing_parameter(name, "name"))?,
            },
            MailActionKind::DeleteLabel => MailAction::DeleteLabel {
                label: label_identifier(p, name, "id")?,
            },
            MailActionKind::ListByLabel => {
                let mut labels = p.string_list("label_ids");
                labels.extend(p.string_list("label_id"));
                if labels.is_empty() {
                    return Err(DispatchError::missing_parameter(name, "label_ids"));
                }
                MailAction::ListByLabel {
                    labels,
                    count: p.count(name, COUNT_KEYS)?.unwrap_or(DEFAULT_LABEL_LIST_COUNT),
                }
            }
            MailActionKind::MarkRead => MailAction::MarkRead {
                ids: explicit_ids(p),
            },
            MailActionKind::MarkUnread => MailAction::MarkUnread {
                ids: explicit_ids(p),
            },
            MailActionKind::Move => MailAction::Move {
                ids: explicit_ids(p),
                label: label_identifier(p, name, "label_id")?,
            },
            MailActionKind::Delete | MailActionKind::BatchDelete => MailAction::Delete { kind },
            MailActionKind::BatchMarkRead => MailAction::BatchMarkRead {
                ids: p.literal_ids("ids"),
            },
            MailActionKind::Summarize => MailAction::Summarize {
                count: p.count(name, COUNT_KEYS)?.unwrap_or(DEFAULT_SUMMARY_COUNT),
            },
        };
        Ok(action)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MailAction::List { .. } => MailActionKind::List.name(),
            MailAction::Search { .. } => MailActionKind::Search.name(),
            MailAction::Send { .. } => MailActionKind::Send.name(),
            MailAction::Read { .. } => MailActionKind::Read.name(),
            MailAction::AttachmentsInfo { .. } => MailActionKind::AttachmentsInfo.name(),
            MailAction::ListLabels => MailActionKind::ListLabels.name(),
            MailAction::CreateLabel { .. } => MailActionKind::CreateLabel.name(),
            MailAction::UpdateLabel { .. } => MailActionKind::UpdateLabel.name(),
            MailAction::DeleteLabel { .. } => MailActionKind::DeleteLabel.name(),
            MailAction::ListByLabel { .. } => MailActionKind::ListByLabel.name(),
            MailAction::MarkRead { .. } => MailActionKind::MarkRead.name(),
            MailAction::MarkUnread { .. } => MailActionKind::MarkUnread.name(),
            MailAction::Move { .. } => MailActionKind::Move.name(),
            MailAction::Delete { kind } => kind.name(),
            MailAction::BatchMarkRead { .. } => MailActionKind::BatchMarkRead.name(),
            MailAction::Summarize { .. } => MailActionKind::Summarize.name(),
        }
    }
}

/// Literal ids under `ids`, else the single literal `id`.
fn explicit_ids(p: &Params) -> Vec<String> {
    let ids = p.literal_ids("ids");
    if !ids.is_empty() {
        return ids;
    }
    p.literal_id("id").into_iter().collect()
}

fn label_identifier(p: &Params, action: &str, key: &str) -> Result<String, DispatchError> {
    p.string_any(&[key, "label", "label_name"])
        .ok_or_else(|| DispatchError::missing_parameter(action, key))
}

/// Runs mail actions against one capability.
pub struct MailExecutor<'a> {
    pub mail: &'a dyn MailCapability,
    pub summarizer: Option<&'a dyn Summarizer>,
    pub resolver: &'a NameResolver,
}

impl MailExecutor<'_> {
    pub async fn run(
        &self,
        action: MailAction,
        context: &ExecutionContext,
    ) -> Result<StepOutcome, DispatchError> {
        let name = action.name();

        match action {
            MailAction::List { count, query } => match query {
                Some(query) => self.search(&query, count).await,
                None => {
                    let messages = self.mail.list_recent(count).await?;
                    Ok(listing(messages))
                }
            },

            MailAction::Search { query, count } => self.search(&query, count).await,

            MailAction::Send {
                recipients,
                subject,
                body_text,
                body_html,
                attachments,
            } => {
                let mut outcome = StepOutcome::new(ContextUpdate::Clear);
                for to in recipients {
                    let message = OutgoingMessage {
                        to,
                        subject: subject.clone(),
                        body_text: body_text.clone(),
                        body_html: body_html.clone(),
                        attachments: attachments.clone(),
                    };
                    self.mail.send(&message).await?;
                    outcome = outcome.line(format!("Email sent to {}", message.to));
                }
                Ok(outcome)
            }

            MailAction::Read { ids, query, count } => {
                let take = count.unwrap_or(1);
                let ids = self
                    .resolve_targets(name, ids, query, context, Take::First(take), take)
                    .await?;

                let mut outcome = StepOutcome::new(ContextUpdate::Clear);
                for id in &ids {
                    let detail = self.mail.get_detail(id).await?;
                    outcome = outcome.lines(render_detail(&detail));
                }
                Ok(outcome)
            }

            MailAction::AttachmentsInfo { id } => {
                let id = self
                    .resolve_targets(name, id.into_iter().collect(), None, context, Take::First(1), 1)
                    .await?
                    .remove(0);

                let detail = self.mail.get_detail(&id).await?;
                let outcome = StepOutcome::new(ContextUpdate::Clear);
                if detail.attachments.is_empty() {
                    return Ok(outcome.line(format!("No attachments in '{}'", detail.subject)));
                }
                Ok(outcome
                    .line(format!("Attachments in '{}':", detail.subject))
                    .lines(detail.attachments.iter().map(|a| {
                        format!("- {} ({}, {} bytes)", a.filename, a.mime_type, a.size)
                    })))
            }

            MailAction::ListLabels => {
                let labels = self.mail.list_labels().await?;
                Ok(StepOutcome::new(ContextUpdate::Clear)
                    .line(format!("{} labels", labels.len()))
                    .lines(labels.iter().map(|l| format!("- {} ({})", l.name, l.id))))
            }

            MailAction::CreateLabel { name } => {
                let label = self.mail.create_label(&name).await?;
                Ok(StepOutcome::new(ContextUpdate::Clear)
                    .line(format!("Label '{}' created ({})", label.name, label.id)))
            }

            MailAction::UpdateLabel { label, name } => {
                let id = self.resolver.label(self.mail, &label).await?;
                let updated = self.mail.update_label(&id, &name).await?;
                Ok(StepOutcome::new(ContextUpdate::Clear)
                    .line(format!("Label {} renamed to '{}'", updated.id, updated.name)))
            }

            MailAction::DeleteLabel { label } => {
                let id = self.resolver.label(self.mail, &label).await?;
                self.mail.delete_label(&id).await?;
                Ok(StepOutcome::new(ContextUpdate::Clear).line(format!("Label '{}' deleted", label)))
            }

            MailAction::ListByLabel { labels, count } => {
                let mut label_ids = Vec::with_capacity(labels.len());
                for label in &labels {
                    label_ids.push(self.resolver.label(self.mail, label).await?);
                }
                let refs = self.mail.list_by_label(&label_ids, count).await?;
                let items: Vec<ResultItem> = refs.into_iter().map(|r| ResultItem::new(r.id)).collect();
                Ok(StepOutcome::new(ContextUpdate::Replace(items.clone()))
                    .line(format!("{} messages labelled {}", items.len(), labels.join(", ")))
                    .lines(items.iter().map(|i| format!("- {}", i.id))))
            }

            MailAction::MarkRead { ids } => {
                let ids = self.context_fallback(name, ids, context)?;
                self.mail
                    .batch_modify_labels(&ids, &[], &[UNREAD_LABEL.to_string()])
                    .await?;
                Ok(StepOutcome::new(ContextUpdate::Clear)
                    .line(format!("Marked {} messages as read", ids.len())))
            }

            MailAction::MarkUnread { ids } => {
                let ids = self.context_fallback(name, ids, context)?;
                self.mail
                    .batch_modify_labels(&ids, &[UNREAD_LABEL.to_string()], &[])
                    .await?;
                Ok(StepOutcome::new(ContextUpdate::Clear)
                    .line(format!("Marked {} messages as unread", ids.len())))
            }

            MailAction::Move { ids, label } => {
                let ids = self.context_fallback(name, ids, context)?;
                let label_id = self.resolver.label(self.mail, &label).await?;
                let add = [label_id];
                let remove = [INBOX_LABEL.to_string()];
                for id in &ids {
                    self.mail.modify_labels(id, &add, &remove).await?;
                }
                // Moved messages stay addressable by later steps.
                Ok(StepOutcome::new(ContextUpdate::Keep)
                    .line(format!("Moved {} messages to {}", ids.len(), label)))
            }

            MailAction::Delete { .. } => {
                let ids = context.ids();
                if ids.is_empty() {
                    return Err(DispatchError::missing_target(name));
                }
                for id in &ids {
                    self.mail.trash(id).await?;
                }
                Ok(StepOutcome::new(ContextUpdate::Clear)
                    .line(format!("Deleted {} messages", ids.len())))
            }

            MailAction::BatchMarkRead { ids } => {
                let ids = self.context_fallback(name, ids, context)?;
                self.mail
                    .batch_modify_labels(&ids, &[], &[UNREAD_LABEL.to_string()])
                    .await?;
                Ok(StepOutcome::new(ContextUpdate::Clear)
                    .line(format!("Marked {} messages as read", ids.len())))
            }

            MailAction::Summarize { count } => {
                let summarizer = self
                    .summarizer
                    .ok_or_else(|| anyhow::anyhow!("no summarizer configured"))?;
                let messages = self.mail.list_recent(count).await?;
                if messages.is_empty() {
                    return Ok(StepOutcome::new(ContextUpdate::Keep).line("No messages to summarize"));
                }
                let summary = summarizer.summarize(&messages).await?;
                Ok(StepOutcome::new(ContextUpdate::Keep).line(summary))
            }
        }
    }

    async fn search(&self, query: &str, count: usize) -> Result<StepOutcome, DispatchError> {
        let refs = self.mail.search(query, count).await?;
        let mut messages = Vec::with_capacity(refs.len());
        for r in refs {
            let detail = self.mail.get_detail(&r.id).await?;
            messages.push(MessageSummary {
                id: detail.id,
                subject: detail.subject,
                from: detail.from,
                snippet: detail.snippet,
            });
        }
        debug!(query, found = messages.len(), "mail search");
        Ok(listing(messages))
    }

    /// Literal ids, then a fresh search, then the context.
    async fn resolve_targets(
        &self,
        action: &str,
        literal: Vec<String>,
        query: Option<String>,
        context: &ExecutionContext,
        take: Take,
        query_limit: usize,
    ) -> Result<Vec<String>, DispatchError> {
        let ids = match select_targets(literal, query, context, take) {
            TargetSource::Literal(ids) | TargetSource::Context(ids) => ids,
            TargetSource::Query(query) => self
                .mail
                .search(&query, query_limit)
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect(),
        };
        if ids.is_empty() {
            return Err(DispatchError::missing_target(action));
        }
        Ok(ids)
    }

    /// Literal ids, else every id in the context.
    fn context_fallback(
        &self,
        action: &str,
        literal: Vec<String>,
        context: &ExecutionContext,
    ) -> Result<Vec<String>, DispatchError> {
        let ids = match select_targets(literal, None, context, Take::All) {
            TargetSource::Literal(ids) | TargetSource::Context(ids) => ids,
            TargetSource::Query(_) => Vec::new(),
        };
        if ids.is_empty() {
            return Err(DispatchError::missing_target(action));
        }
        Ok(ids)
    }
}

fn listing(messages: Vec<MessageSummary>) -> StepOutcome {
    let lines: Vec<String> = std::iter::once(format!("Found {} messages", messages.len()))
        .chain(
            messages
                .iter()
                .map(|m| format!("- {} | From: {} ({})", m.subject, m.from, m.id)),
        )
        .collect();
    let items = messages
        .into_iter()
        .map(|m| {
            ResultItem::new(m.id)
                .with("subject", m.subject)
                .with("from", m.from)
        })
        .collect();
    StepOutcome::new(ContextUpdate::Replace(items)).lines(lines)
}

fn render_detail(detail: &MessageDetail) -> Vec<String> {
    let body = detail.body();
    let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    let mut lines = vec![
        format!("From: {}", detail.from),
        format!("To: {}", detail.to),
        format!("Date: {}", detail.date),
        format!("Subject: {}", detail.subject),
        String::new(),
        preview,
    ];
    if body.chars().count() > BODY_PREVIEW_CHARS {
        lines.push("[...]".to_string());
    }
    lines
}
