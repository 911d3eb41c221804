//! Calendar defaults.
//!
//! Relative dates ("today", "tomorrow") and bare dates are interpreted at a
//! fixed UTC offset rather than the host's local zone.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Offset from UTC used for relative dates and generated timestamps.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    /// IANA zone name attached to created events.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Title used when `create` has no summary.
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Start hour of the slot used when `create` has a date but no time.
    #[serde(default = "default_start_hour")]
    pub default_start_hour: u32,

    /// Number of events `list` returns without a count.
    #[serde(default = "default_list_count")]
    pub default_list_count: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            time_zone: default_time_zone(),
            default_title: default_title(),
            default_start_hour: default_start_hour(),
            default_list_count: default_list_count(),
        }
    }
}

impl CalendarConfig {
    /// Configured offset; out-of-range values fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

fn default_utc_offset_minutes() -> i32 {
    330
}

fn default_time_zone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_title() -> String {
    "No Title".to_string()
}

fn default_start_hour() -> u32 {
    9
}

fn default_list_count() -> usize {
    5
}
