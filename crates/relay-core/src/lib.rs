use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod action;
// Configuration types shared across all Relay crates
pub mod config;
pub mod error;
pub mod params;

pub use action::{ActionSpec, CalendarActionKind, DriveActionKind, MailActionKind};
pub use config::{CalendarConfig, DriveConfig, GoogleConfig, PlannerConfig, RelayConfig};
pub use error::{DispatchError, EntityKind};
pub use params::{Params, is_placeholder};

/// Structured directive produced by the intent parser.
///
/// The `service` is kept as the raw string the parser emitted so that an
/// unknown or missing service can be reported verbatim at routing time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionStep>,
}

impl Intent {
    pub fn new(service: Service, actions: Vec<ActionStep>) -> Self {
        Self {
            service: Some(service.to_string()),
            actions,
        }
    }

    /// Resolve the target service, or fail with `UnroutableIntent`.
    pub fn route(&self) -> Result<Service, DispatchError> {
        let raw = self
            .service
            .as_deref()
            .ok_or_else(|| DispatchError::UnroutableIntent {
                service: "(none)".to_string(),
            })?;
        raw.parse()
    }
}

/// One action plus its parameters within an intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    pub action: String,
    #[serde(default, deserialize_with = "params_or_null")]
    pub parameters: Params,
}

impl ActionStep {
    pub fn new(action: impl Into<String>, parameters: Params) -> Self {
        Self {
            action: action.into(),
            parameters,
        }
    }
}

fn params_or_null<'de, D>(deserializer: D) -> Result<Params, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Params>::deserialize(deserializer)?.unwrap_or_default())
}

/// Backend service an intent is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Mail,
    Calendar,
    Drive,
    /// Free-form conversation; answered by the chat collaborator, never dispatched.
    Chat,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Mail,
        Service::Calendar,
        Service::Drive,
        Service::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Mail => "mail",
            Service::Calendar => "calendar",
            Service::Drive => "drive",
            Service::Chat => "chat",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mail" | "gmail" | "email" => Ok(Service::Mail),
            "calendar" | "gcal" => Ok(Service::Calendar),
            "drive" | "gdrive" => Ok(Service::Drive),
            "chat" => Ok(Service::Chat),
            _ => Err(DispatchError::UnroutableIntent {
                service: s.to_string(),
            }),
        }
    }
}
