use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Error loading credentials: {0}")]
    #[diagnostic(code(escola_visita::credentials))]
    Credentials(String),

    #[error("Error loading tokens: {0}")]
    #[diagnostic(code(escola_visita::tokens))]
    Tokens(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(escola_visita::environment))]
    Environment(String),

    /// A Google endpoint answered with a failure status.
    /// `details` holds the response body, parsed as JSON when possible.
    #[error("{message}")]
    #[diagnostic(code(escola_visita::google_calendar))]
    GoogleCalendar {
        message: String,
        status: Option<u16>,
        details: Option<serde_json::Value>,
    },

    #[error("HTTP error: {0}")]
    #[diagnostic(code(escola_visita::http))]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(escola_visita::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(escola_visita::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(escola_visita::other))]
    Other(String),
}

impl Error {
    /// Structured response payload attached to a remote failure, if any
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Error::GoogleCalendar { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// HTTP status of a remote failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::GoogleCalendar { status, .. } => *status,
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type VisitResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create credential loading errors
pub fn credentials_error(message: &str) -> Error {
    Error::Credentials(message.to_string())
}

/// Helper to create token loading errors
pub fn tokens_error(message: &str) -> Error {
    Error::Tokens(message.to_string())
}

/// Helper to create Google Calendar errors that carry no response
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar {
        message: message.to_string(),
        status: None,
        details: None,
    }
}

/// Helper to create Google Calendar errors from a failed HTTP response
pub fn api_error(message: &str, status: u16, details: Option<serde_json::Value>) -> Error {
    Error::GoogleCalendar {
        message: message.to_string(),
        status: Some(status),
        details,
    }
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
