use crate::error::{credentials_error, VisitResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Redirect used when the client file lists none
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3500/oauth2callback";

/// OAuth client credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Fields shared by both accepted file layouts
#[derive(Debug, Deserialize)]
struct ClientKeys {
    client_id: Option<String>,
    client_secret: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

/// Either `{"installed": {...}}` as downloaded from the Cloud console,
/// or the same keys at the top level
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientKeys>,
    #[serde(flatten)]
    raw: ClientKeys,
}

impl ClientKeys {
    fn redirect_uri(&self) -> String {
        self.redirect_uris
            .first()
            .filter(|uri| !uri.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string())
    }
}

/// Parse the contents of an OAuth client file
pub fn parse_credentials(content: &str) -> VisitResult<Credentials> {
    let file: CredentialsFile =
        serde_json::from_str(content).map_err(|e| credentials_error(&e.to_string()))?;

    if let Some(installed) = file.installed {
        return Ok(Credentials {
            redirect_uri: installed.redirect_uri(),
            client_id: installed.client_id.unwrap_or_default(),
            client_secret: installed.client_secret.unwrap_or_default(),
        });
    }

    match (&file.raw.client_id, &file.raw.client_secret) {
        (Some(client_id), Some(client_secret))
            if !client_id.is_empty() && !client_secret.is_empty() =>
        {
            Ok(Credentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                redirect_uri: file.raw.redirect_uri(),
            })
        }
        _ => Err(credentials_error("Invalid credentials format")),
    }
}

/// Read and parse the OAuth client file at `path`
pub fn load_credentials(path: &Path) -> VisitResult<Credentials> {
    let content = fs::read_to_string(path)
        .map_err(|e| credentials_error(&format!("{}: {}", path.display(), e)))?;
    parse_credentials(&content)
}
