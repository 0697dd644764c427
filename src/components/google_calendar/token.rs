use super::credentials::Credentials;
use crate::error::{api_error, google_calendar_error, tokens_error, VisitResult};
use crate::utils::time::{expiry_after, format_millis, is_expired, now_millis};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Key some token files nest the actual token set under
const WRAPPER_KEY: &str = "normal";

/// OAuth token set as stored on disk.
/// Fields this program does not use are kept so a write-back loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TokenSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A token set plus whether the file wrapped it under `normal`
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTokens {
    pub tokens: TokenSet,
    pub wrapped: bool,
}

/// Token endpoint reply
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
    token_type: Option<String>,
    id_token: Option<String>,
}

/// Parse the contents of a token file
pub fn parse_tokens(content: &str) -> VisitResult<StoredTokens> {
    let value: Value = serde_json::from_str(content).map_err(|e| tokens_error(&e.to_string()))?;

    let (inner, wrapped) = match value {
        Value::Object(mut root) if root.get(WRAPPER_KEY).is_some_and(Value::is_object) => {
            (root.remove(WRAPPER_KEY).unwrap_or_default(), true)
        }
        other => (other, false),
    };

    let tokens: TokenSet =
        serde_json::from_value(inner).map_err(|e| tokens_error(&e.to_string()))?;

    Ok(StoredTokens { tokens, wrapped })
}

/// Read and parse the token file at `path`
pub fn load_tokens(path: &Path) -> VisitResult<StoredTokens> {
    let content =
        fs::read_to_string(path).map_err(|e| tokens_error(&format!("{}: {}", path.display(), e)))?;
    parse_tokens(&content)
}

/// Write a token set to `path`, keeping a `normal` wrapper and any sibling keys
/// the existing file has
pub fn save_tokens(path: &Path, stored: &StoredTokens) -> VisitResult<()> {
    let token_value = serde_json::to_value(&stored.tokens)?;

    let document = if stored.wrapped {
        let mut root = fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str::<Value>(&content).ok())
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default();
        root.insert(WRAPPER_KEY.to_string(), token_value);
        Value::Object(root)
    } else {
        token_value
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(&document)?)?;
    Ok(())
}

/// Write a newly granted token set to `path`, keeping the layout of the file
/// it replaces: a `normal` wrapper stays a wrapper, siblings are untouched
pub fn save_fresh_tokens(path: &Path, tokens: TokenSet) -> VisitResult<StoredTokens> {
    let wrapped = load_tokens(path).map(|existing| existing.wrapped).unwrap_or(false);
    let stored = StoredTokens { tokens, wrapped };
    save_tokens(path, &stored)?;
    Ok(stored)
}

/// Holds the client credentials and the live token set, and talks to the
/// OAuth token endpoint
#[derive(Clone)]
pub struct TokenManager {
    credentials: Credentials,
    tokens: TokenSet,
    client: Client,
    token_url: String,
}

impl TokenManager {
    pub fn new(credentials: Credentials, tokens: TokenSet, client: Client, token_url: &str) -> Self {
        Self {
            credentials,
            tokens,
            client,
            token_url: token_url.to_string(),
        }
    }

    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    /// True once `expiry_date` is at or before `now_ms`
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        is_expired(self.tokens.expiry_date, now_ms)
    }

    /// True when the access token is absent or empty but a refresh token
    /// can replace it
    pub fn is_missing_access_token(&self) -> bool {
        let has_access = self
            .tokens
            .access_token
            .as_deref()
            .is_some_and(|token| !token.is_empty());
        !has_access && self.tokens.refresh_token.is_some()
    }

    /// Refresh the access token if it has expired or was never issued.
    /// Returns whether a refresh happened.
    pub async fn ensure_fresh(&mut self) -> VisitResult<bool> {
        if self.is_missing_access_token() {
            info!("No access token stored, refreshing");
        } else if self.is_expired_at(now_millis()) {
            info!("Access token expired, refreshing");
        } else {
            if let Some(expiry) = self.tokens.expiry_date {
                debug!("Access token valid until {}", format_millis(expiry));
            }
            return Ok(false);
        }

        self.refresh_token().await?;
        Ok(true)
    }

    /// Access token for API calls
    pub fn access_token(&self) -> VisitResult<&str> {
        self.tokens
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| google_calendar_error("No access token available"))
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh_token(&mut self) -> VisitResult<&TokenSet> {
        let refresh_token = self
            .tokens
            .refresh_token
            .clone()
            .ok_or_else(|| google_calendar_error("No refresh token is set."))?;

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = request_token(&self.client, &self.token_url, &params).await?;

        self.tokens.access_token = Some(response.access_token);
        self.tokens.expiry_date = response
            .expires_in
            .map(|expires_in| expiry_after(now_millis(), expires_in));
        // Google omits refresh_token on refresh; keep the one we have
        if let Some(new_refresh) = response.refresh_token {
            self.tokens.refresh_token = Some(new_refresh);
        }
        if response.scope.is_some() {
            self.tokens.scope = response.scope;
        }
        if response.token_type.is_some() {
            self.tokens.token_type = response.token_type;
        }
        if let Some(id_token) = response.id_token {
            self.tokens.extra.insert("id_token".to_string(), Value::String(id_token));
        }

        info!("Access token refreshed");
        Ok(&self.tokens)
    }
}

/// Exchange an authorization code from the consent screen for a token set
pub async fn exchange_authorization_code(
    client: &Client,
    token_url: &str,
    credentials: &Credentials,
    code: &str,
) -> VisitResult<TokenSet> {
    let params = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("code", code),
        ("redirect_uri", credentials.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ];
    let response = request_token(client, token_url, &params).await?;

    let mut extra = Map::new();
    if let Some(id_token) = response.id_token {
        extra.insert("id_token".to_string(), Value::String(id_token));
    }

    Ok(TokenSet {
        access_token: Some(response.access_token),
        refresh_token: response.refresh_token,
        expiry_date: response
            .expires_in
            .map(|expires_in| expiry_after(now_millis(), expires_in)),
        scope: response.scope,
        token_type: response.token_type,
        extra,
    })
}

async fn request_token(
    client: &Client,
    token_url: &str,
    params: &[(&str, &str)],
) -> VisitResult<TokenResponse> {
    let response = client.post(token_url).form(params).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let details = serde_json::from_str::<Value>(&body)
            .unwrap_or_else(|_| Value::String(body.clone()));
        // {"error": "invalid_grant", "error_description": "Token has been expired or revoked."}
        let reason = details
            .get("error_description")
            .or_else(|| details.get("error"))
            .and_then(Value::as_str)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("token request failed"))
            .to_string();
        return Err(api_error(&reason, status.as_u16(), Some(details)));
    }

    let token: TokenResponse = response.json().await?;
    Ok(token)
}
