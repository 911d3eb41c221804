//! Error types for intent dispatch.
//!
//! Routing errors (`UnroutableIntent`, `ServiceUnavailable`) abort a whole
//! batch. Everything else is raised inside a single step and reported at the
//! step boundary.

use crate::Service;
use std::fmt;
use thiserror::Error;

/// Kind of entity a name was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Label,
    Folder,
    File,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Label => "label",
            EntityKind::Folder => "folder",
            EntityKind::File => "file",
        })
    }
}

/// Errors that can occur while routing or executing an intent.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The intent named a service nobody can handle.
    #[error("cannot route intent for service '{service}'")]
    UnroutableIntent { service: String },

    /// The service is known but no capability was configured for it.
    #[error("{service} service is not configured")]
    ServiceUnavailable { service: Service },

    /// The action name is not part of the service's action set.
    #[error("unsupported {service} action '{action}'")]
    UnsupportedAction { service: Service, action: String },

    /// A required parameter was absent or empty.
    #[error("missing required parameter '{parameter}' for {action}")]
    MissingParameter { action: String, parameter: String },

    /// A parameter was present but could not be coerced.
    #[error("invalid parameter '{parameter}' for {action}: {reason}")]
    InvalidParameter {
        action: String,
        parameter: String,
        reason: String,
    },

    /// No target ID could be obtained from parameters, query or context.
    #[error("no target IDs available for {action}")]
    MissingTarget { action: String },

    /// Name resolution found no match.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    /// The capability call itself failed.
    #[error("backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl DispatchError {
    pub fn missing_parameter(action: &str, parameter: &str) -> Self {
        Self::MissingParameter {
            action: action.to_string(),
            parameter: parameter.to_string(),
        }
    }

    pub fn invalid_parameter(action: &str, parameter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            action: action.to_string(),
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing_target(action: &str) -> Self {
        Self::MissingTarget {
            action: action.to_string(),
        }
    }

    pub fn not_found(kind: EntityKind, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    /// Stable short name for reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnroutableIntent { .. } => "unroutable_intent",
            Self::ServiceUnavailable { .. } => "service_unavailable",
            Self::UnsupportedAction { .. } => "unsupported_action",
            Self::MissingParameter { .. } => "missing_parameter",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::MissingTarget { .. } => "missing_target",
            Self::NotFound { .. } => "not_found",
            Self::Backend(_) => "backend",
        }
    }

    /// Whether the error aborts the whole batch rather than a single step.
    pub fn is_routing(&self) -> bool {
        matches!(
            self,
            Self::UnroutableIntent { .. } | Self::ServiceUnavailable { .. }
        )
    }
}
