use crate::components::google_calendar;
use crate::components::school_visit::{self, VisitOutcome};
use crate::config::Config;
use crate::error::{Error, VisitResult};
use std::io::{self, Write};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration.
/// Logs go to stderr; stdout is reserved for the run report.
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> VisitResult<Config> {
    match Config::load() {
        Ok(config) => {
            info!(
                "Using calendar {} ({})",
                config.calendar_label, config.google_calendar_id
            );
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e)
        }
    }
}

/// Authenticate and bring the visit event up to date
pub async fn run(config: &Config) -> VisitResult<VisitOutcome> {
    let client = google_calendar::connect(config).await?;
    let outcome = school_visit::ensure_visit(&client, &config.calendar_label).await?;

    info!(
        "Visit {:?}, {} superseded event(s) removed",
        outcome.action,
        outcome.removed.len()
    );
    Ok(outcome)
}

/// Print a failed run to stderr, including the API response body when there is one
pub fn report_failure(err: &Error) {
    let stderr = io::stderr();
    if let Err(e) = write_failure(&mut stderr.lock(), err) {
        error!("Failed to write the error report: {}", e);
    }
}

/// Render the `Error:` line, then `Error details:` with the pretty-printed body
pub fn write_failure(out: &mut impl Write, err: &Error) -> io::Result<()> {
    writeln!(out, "Error: {}", err)?;
    if let Some(details) = err.details() {
        let rendered =
            serde_json::to_string_pretty(details).unwrap_or_else(|_| details.to_string());
        writeln!(out, "Error details: {}", rendered)?;
    }
    Ok(())
}
