//! Google Calendar API v3, primary calendar only.

use crate::http::ApiClient;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use relay_runtime::{CalendarCapability, CalendarEvent, CreatedEvent, NewEvent};
use serde::{Deserialize, Serialize};

const CALENDAR_ID: &str = "primary";

// ============================================================================
// API types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    start: Option<EventDateTime>,
    #[serde(default)]
    html_link: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventInsert<'a> {
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    start: EventDateTime,
    end: EventDateTime,
}

impl<'a> EventInsert<'a> {
    fn from_event(event: &'a NewEvent) -> Self {
        let at = |date_time: &str| EventDateTime {
            date_time: Some(date_time.to_string()),
            date: None,
            time_zone: event.time_zone.clone(),
        };
        Self {
            summary: &event.summary,
            description: event.description.as_deref(),
            start: at(&event.start),
            end: at(&event.end),
        }
    }
}

impl RawEvent {
    fn into_event(self) -> CalendarEvent {
        let start = self
            .start
            .and_then(|s| s.date_time.or(s.date))
            .unwrap_or_default();
        CalendarEvent {
            id: self.id,
            start,
            summary: self.summary.unwrap_or_else(|| "(no title)".to_string()),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct CalendarClient {
    api: ApiClient,
    base_url: String,
}

impl CalendarClient {
    pub fn new(api: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, CALENDAR_ID)
    }
}

#[async_trait]
impl CalendarCapability for CalendarClient {
    async fn list_upcoming(&self, max: usize) -> anyhow::Result<Vec<CalendarEvent>> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let list: EventListResponse = self
            .api
            .json(self.api.get(&self.events_url()).query(&[
                ("timeMin", now),
                ("maxResults", max.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]))
            .await?;
        Ok(list.items.into_iter().map(RawEvent::into_event).collect())
    }

    async fn insert_event(&self, event: &NewEvent) -> anyhow::Result<CreatedEvent> {
        let created: RawEvent = self
            .api
            .json(
                self.api
                    .post(&self.events_url())
                    .json(&EventInsert::from_event(event)),
            )
            .await?;
        Ok(CreatedEvent {
            id: created.id,
            link: created.html_link,
        })
    }
}
