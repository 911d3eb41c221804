//! Configuration types for Relay.
//!
//! A single `RelayConfig` is loaded from `relay.toml` by the CLI. Every
//! section and field has a default, so an absent file yields a working
//! configuration as long as the access token and API key environment
//! variables are set.
//!
//! # Sections
//!
//! - **google**: access token source, enabled services, API base URLs
//! - **planner**: language-model settings for intent parsing
//! - **calendar**: local offset and event defaults
//! - **drive**: download directory and listing defaults

pub mod calendar;
pub mod drive;
pub mod google;
pub mod planner;

use serde::{Deserialize, Serialize};

pub use calendar::CalendarConfig;
pub use drive::DriveConfig;
pub use google::GoogleConfig;
pub use planner::PlannerConfig;

/// Complete Relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Google Workspace access.
    #[serde(default)]
    pub google: GoogleConfig,

    /// Intent parser settings.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Calendar defaults.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Drive defaults.
    #[serde(default)]
    pub drive: DriveConfig,
}
