use escola_visita::components::google_calendar::credentials::load_credentials;
use escola_visita::components::google_calendar::token::{
    exchange_authorization_code, save_fresh_tokens,
};
use escola_visita::config::Config;
use escola_visita::error::{other_error, VisitResult};
use escola_visita::startup;
use url::Url;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    if let Err(err) = authorize().await {
        startup::report_failure(&err);
        std::process::exit(1);
    }

    Ok(())
}

async fn authorize() -> VisitResult<()> {
    // Load configuration
    let config = Config::load()?;
    let credentials = load_credentials(&config.credentials_path)?;

    let redirect = Url::parse(&credentials.redirect_uri)
        .map_err(|e| other_error(&format!("Invalid redirect URI: {}", e)))?;
    let port = redirect.port_or_known_default().unwrap_or(80);
    let host = redirect.host_str().unwrap_or("localhost").to_string();

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();

    // Construct authorization URL
    let auth_url = Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("redirect_uri", credentials.redirect_uri.as_str()),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", CALENDAR_SCOPE),
            ("state", state.as_str()),
        ],
    )
    .map_err(|e| other_error(&format!("Failed to build authorization URL: {}", e)))?;

    // Start local server to receive the callback
    let server = tiny_http::Server::http((host.as_str(), port))
        .map_err(|e| other_error(&format!("Failed to listen on {}:{}: {}", host, port, e)))?;

    // Open browser for authorization
    println!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Open this URL to continue:\n{}", auth_url);
    }
    println!("Waiting for authorization callback on {}...", credentials.redirect_uri);

    let code = loop {
        let request = server.recv()?;

        // request.url() is path + query only
        let callback = redirect
            .join(request.url())
            .map_err(|e| other_error(&format!("Malformed callback URL: {}", e)))?;

        if callback.path() != redirect.path() {
            request.respond(tiny_http::Response::empty(tiny_http::StatusCode(404)))?;
            continue;
        }

        let param = |name: &str| {
            callback
                .query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        if let Some(error) = param("error") {
            request.respond(tiny_http::Response::from_string(format!(
                "Authorization failed: {}",
                error
            )))?;
            return Err(other_error(&format!("Authorization denied: {}", error)));
        }

        if param("state").as_deref() != Some(state.as_str()) {
            request.respond(
                tiny_http::Response::from_string("State mismatch")
                    .with_status_code(tiny_http::StatusCode(400)),
            )?;
            return Err(other_error("State mismatch in authorization callback"));
        }

        let code = param("code")
            .ok_or_else(|| other_error("No authorization code found in callback"))?;

        // Send success response to browser
        request.respond(tiny_http::Response::from_string(
            "Authorization successful! You can close this window.",
        ))?;
        break code;
    };

    // Exchange code for tokens
    let client = reqwest::Client::new();
    let tokens = exchange_authorization_code(&client, &config.token_url, &credentials, &code).await?;

    if tokens.refresh_token.is_none() {
        println!("Warning: no refresh token returned; the saved token cannot be refreshed.");
    }

    // An existing file keeps its `normal` wrapper and sibling entries
    save_fresh_tokens(&config.token_path, tokens)?;

    println!("Token successfully saved to {}!", config.token_path.display());

    Ok(())
}
