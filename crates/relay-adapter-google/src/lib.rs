//! Google Workspace capabilities for the Relay dispatcher.
//!
//! Each client implements one runtime capability trait over the
//! corresponding REST API. [`connect`] builds the enabled set from
//! configuration.

pub mod calendar;
pub mod drive;
pub mod error;
pub mod gmail;
pub mod http;
pub mod mime;
pub mod token;

use relay_core::GoogleConfig;
use relay_runtime::Capabilities;
use std::sync::Arc;
use tracing::info;

pub use calendar::CalendarClient;
pub use drive::DriveClient;
pub use error::GoogleApiError;
pub use gmail::GmailClient;
pub use http::ApiClient;
pub use token::load_access_token;

/// Build capabilities for every service enabled in `config`.
///
/// Fails only when a token is needed and none can be found. With every
/// service disabled no token is read.
pub fn connect(config: &GoogleConfig) -> Result<Capabilities, GoogleApiError> {
    let mut capabilities = Capabilities::new();
    if !(config.mail || config.calendar || config.drive) {
        return Ok(capabilities);
    }

    let api = ApiClient::new(load_access_token(config)?);
    if config.mail {
        capabilities = capabilities.with_mail(Arc::new(GmailClient::new(
            api.clone(),
            &config.gmail_base_url,
        )));
    }
    if config.calendar {
        capabilities = capabilities.with_calendar(Arc::new(CalendarClient::new(
            api.clone(),
            &config.calendar_base_url,
        )));
    }
    if config.drive {
        capabilities = capabilities.with_drive(Arc::new(DriveClient::new(
            api,
            &config.drive_base_url,
            &config.drive_upload_url,
        )));
    }

    info!(
        mail = config.mail,
        calendar = config.calendar,
        drive = config.drive,
        "google services connected"
    );
    Ok(capabilities)
}
