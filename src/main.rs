use escola_visita::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Ensuring MA Escola Montessori visit");

    let result = match startup::load_config() {
        Ok(config) => startup::run(&config).await,
        Err(e) => Err(e),
    };

    if let Err(err) = result {
        startup::report_failure(&err);
        std::process::exit(1);
    }

    Ok(())
}
