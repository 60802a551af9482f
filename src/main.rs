use gcalorg::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting gcalorg");

    // Load configuration
    let config = startup::load_config()?;

    // Export all accounts
    startup::run(config).await
}
