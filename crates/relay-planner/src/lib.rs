//! Natural-language front end for the dispatcher.
//!
//! A [`Planner`] turns a prompt into an [`Intent`] with the help of a
//! [`ChatModel`], answers general questions, and summarizes mail for the
//! `summarize` action.

use async_trait::async_trait;
use relay_core::action::catalog;
use relay_core::{CalendarConfig, Intent, PlannerConfig};
use relay_runtime::{Clock, MessageSummary, Summarizer, SystemClock};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub mod error;
pub mod gemini;
pub mod prompt;
pub mod schema;

pub use error::PlannerError;
pub use gemini::GeminiModel;

/// One model call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub system: Option<String>,
    pub prompt: String,
    /// Ask for a JSON response body.
    pub json: bool,
}

impl Completion {
    pub fn json(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            prompt: prompt.into(),
            json: true,
        }
    }

    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            json: false,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, completion: &Completion) -> Result<String, PlannerError>;
}

/// What a prompt turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPrompt {
    Intent(Intent),
    /// The model did not produce a usable intent; this is its plain answer.
    Chat(String),
}

#[async_trait]
pub trait IntentParser: Send + Sync {
    async fn parse(&self, prompt: &str) -> Result<ParsedPrompt, PlannerError>;
}

pub struct Planner {
    model: Arc<dyn ChatModel>,
    clock: Arc<dyn Clock>,
    calendar: CalendarConfig,
    history: Mutex<Vec<String>>,
    history_limit: usize,
}

impl Planner {
    pub fn new(model: Arc<dyn ChatModel>, config: &PlannerConfig) -> Self {
        Self {
            model,
            clock: Arc::new(SystemClock),
            calendar: CalendarConfig::default(),
            history: Mutex::new(Vec::new()),
            history_limit: config.history_limit,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Calendar settings supply the local offset and zone name for the
    /// system prompt.
    pub fn with_calendar_config(mut self, calendar: CalendarConfig) -> Self {
        self.calendar = calendar;
        self
    }

    /// Prompts remembered since the last reset.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Answer a general question.
    pub async fn chat(&self, prompt: &str) -> Result<String, PlannerError> {
        self.model
            .complete(&Completion::text(prompt).with_system(prompt::CHAT_INSTRUCTION))
            .await
    }

    fn remember(&self, prompt: &str) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push(prompt.to_string());
        if history.len() > self.history_limit {
            history.clear();
            info!(limit = self.history_limit, "prompt history cleared");
        }
    }

    fn system_prompt(&self) -> String {
        let now = self.clock.now().with_timezone(&self.calendar.offset());
        prompt::system_prompt(now, &self.calendar.time_zone, &catalog())
    }

    /// Decode and validate model output as an intent.
    fn decode(text: &str) -> Result<Intent, PlannerError> {
        let value: serde_json::Value = serde_json::from_str(prompt::strip_code_fences(text))?;
        schema::validate_intent(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl IntentParser for Planner {
    async fn parse(&self, prompt: &str) -> Result<ParsedPrompt, PlannerError> {
        self.remember(prompt);

        let raw = self
            .model
            .complete(&Completion::json(self.system_prompt(), prompt))
            .await?;
        debug!(raw = %raw, "model intent output");

        match Self::decode(&raw) {
            Ok(intent) => Ok(ParsedPrompt::Intent(intent)),
            Err(e) => {
                warn!(error = %e, "model output is not an intent; falling back to chat");
                let reply = self.model.complete(&Completion::text(prompt)).await?;
                Ok(ParsedPrompt::Chat(reply))
            }
        }
    }
}

#[async_trait]
impl Summarizer for Planner {
    async fn summarize(&self, messages: &[MessageSummary]) -> anyhow::Result<String> {
        let summary = self
            .model
            .complete(&Completion::text(prompt::summary_prompt(messages)))
            .await?;
        Ok(summary)
    }
}
