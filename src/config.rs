use crate::error::{env_error, VisitResult};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Calendar that holds the family's school visits
pub const DEFAULT_CALENDAR_ID: &str = "kce7ml7l9bjtbj9ndsatnaf87o@group.calendar.google.com";

/// Human name of the calendar, printed in the run report
pub const DEFAULT_CALENDAR_LABEL: &str = "Tontitos";

/// Google Calendar v3 REST root
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Google OAuth2 token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Optional overrides file, relative to the repository root
pub const CALENDAR_CONFIG_FILE: &str = "config/calendar.toml";

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the default credential paths are resolved against
    pub repo_root: PathBuf,
    /// OAuth token set file
    pub token_path: PathBuf,
    /// OAuth client credentials file
    pub credentials_path: PathBuf,
    /// Calendar the visit lives in
    pub google_calendar_id: String,
    /// Calendar name for output
    pub calendar_label: String,
    pub api_base_url: String,
    pub token_url: String,
    /// Write a refreshed token set back to `token_path`
    pub persist_refreshed_token: bool,
}

/// Keys accepted in `config/calendar.toml`
#[derive(Debug, Default, Deserialize)]
struct CalendarFileConfig {
    calendar_id: Option<String>,
    calendar_label: Option<String>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> VisitResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let default_root = match env::current_exe().ok().and_then(|exe| repo_root_from_exe(&exe)) {
            Some(root) => root,
            None => env::current_dir()?,
        };
        Self::from_lookup(|key| env::var(key).ok(), default_root)
    }

    /// Build the configuration from an arbitrary variable source.
    /// `default_root` is the repository root unless `VISITA_REPO_ROOT` says otherwise.
    pub fn from_lookup<F>(lookup: F, default_root: PathBuf) -> VisitResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let repo_root = var("VISITA_REPO_ROOT").map(PathBuf::from).unwrap_or(default_root);
        let creds_dir = repo_root.join(".creds");

        let token_path = var("GOOGLE_CALENDAR_MCP_TOKEN_PATH")
            .or_else(|| var("MCP_CALENDAR_TOKEN_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| creds_dir.join("google-calendar-token.json"));

        let credentials_path = var("GOOGLE_OAUTH_CREDENTIALS")
            .map(PathBuf::from)
            .unwrap_or_else(|| creds_dir.join("gcp-oauth.keys.json"));

        let api_base_url = var("GOOGLE_CALENDAR_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let token_url =
            var("GOOGLE_OAUTH_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());

        let persist_refreshed_token = match var("VISITA_PERSIST_REFRESHED_TOKEN") {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| env_error("VISITA_PERSIST_REFRESHED_TOKEN"))?,
            None => false,
        };

        let file_config = read_calendar_file(&repo_root.join(CALENDAR_CONFIG_FILE));

        Ok(Config {
            google_calendar_id: file_config
                .calendar_id
                .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            calendar_label: file_config
                .calendar_label
                .unwrap_or_else(|| DEFAULT_CALENDAR_LABEL.to_string()),
            repo_root,
            token_path,
            credentials_path,
            api_base_url,
            token_url,
            persist_refreshed_token,
        })
    }
}

/// Checkout that a built binary belongs to: `<root>/target/<profile>/<binary>`
pub fn repo_root_from_exe(exe: &Path) -> Option<PathBuf> {
    exe.ancestors().nth(3).map(Path::to_path_buf)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A missing or malformed overrides file falls back to the defaults
fn read_calendar_file(path: &Path) -> CalendarFileConfig {
    let Ok(content) = fs::read_to_string(path) else {
        return CalendarFileConfig::default();
    };

    match toml::from_str::<CalendarFileConfig>(&content) {
        Ok(file_config) => {
            debug!("Loaded calendar overrides from {}", path.display());
            file_config
        }
        Err(e) => {
            warn!("Ignoring malformed {}: {}", path.display(), e);
            CalendarFileConfig::default()
        }
    }
}
