//! Google Calendar access: OAuth client files, token handling and the
//! REST client for calendar events.

mod api;
mod client;
pub mod credentials;
pub mod models;
pub mod token;

pub use api::CalendarApi;
pub use client::GoogleCalendarClient;
pub use credentials::{load_credentials, Credentials};
pub use models::{CalendarEvent, EventDateTime, EventQuery, ReminderOverride, Reminders, SendUpdates};
pub use token::{load_tokens, save_tokens, StoredTokens, TokenManager, TokenSet};

use crate::config::Config;
use crate::error::VisitResult;
use reqwest::Client;
use tracing::{info, warn};

/// Load credentials and tokens from disk, refresh an expired access token,
/// and return a client for the configured calendar
pub async fn connect(config: &Config) -> VisitResult<GoogleCalendarClient> {
    let credentials = load_credentials(&config.credentials_path)?;
    let stored = load_tokens(&config.token_path)?;
    let wrapped = stored.wrapped;

    let http = Client::new();
    let mut token_manager =
        TokenManager::new(credentials, stored.tokens, http.clone(), &config.token_url);

    let refreshed = token_manager.ensure_fresh().await?;
    if refreshed {
        if config.persist_refreshed_token {
            save_tokens(
                &config.token_path,
                &StoredTokens {
                    tokens: token_manager.tokens().clone(),
                    wrapped,
                },
            )?;
            info!("Saved refreshed token to {}", config.token_path.display());
        } else {
            warn!(
                "Refreshed token kept in memory only; {} still holds the expired one",
                config.token_path.display()
            );
        }
    }

    let access_token = token_manager.access_token()?;
    Ok(GoogleCalendarClient::new(
        http,
        &config.api_base_url,
        &config.google_calendar_id,
        access_token,
    ))
}
