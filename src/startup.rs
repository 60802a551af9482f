use crate::components::google_calendar::time::fetch_window;
use crate::components::google_calendar::{FetchWindow, GoogleCalendarClient, TokenManager};
use crate::components::org::{OrgRenderer, DOCUMENT_PREAMBLE};
use crate::components::Exporter;
use crate::config::{AccountConfig, Config};
use crate::error::{Error, ExportResult};
use chrono::{Local, TimeZone, Utc};
use std::fmt::Display;
use std::io::Write;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging on stderr; stdout carries the document
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

/// Load the exporter config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Export every configured account to stdout
pub async fn run(config: Config) -> miette::Result<()> {
    match config.display_timezone()? {
        Some(tz) => {
            info!("Rendering times in {}", tz);
            run_with(&config, tz).await?
        }
        None => run_with(&config, Local).await?,
    }
    Ok(())
}

async fn run_with<Tz>(config: &Config, tz: Tz) -> ExportResult<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let exporter = Exporter::from_config(config, OrgRenderer::new(tz));
    let window = fetch_window(Utc::now(), config.window.past_months, config.window.future_months)?;
    let credentials_dir = config.credentials_dir()?;
    info!("Fetching events between {} and {}", window.time_min, window.time_max);

    let mut stdout = std::io::stdout();
    stdout.write_all(DOCUMENT_PREAMBLE.as_bytes())?;

    for account in &config.accounts {
        let section = export_account(&exporter, account, &credentials_dir, &window).await?;
        stdout.write_all(section.as_bytes())?;
        stdout.flush()?;
    }

    Ok(())
}

async fn export_account<Tz>(
    exporter: &Exporter<Tz>,
    account: &AccountConfig,
    credentials_dir: &Path,
    window: &FetchWindow,
) -> ExportResult<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    info!("Getting client for: {}", account.client_secret.display());
    let token_manager = TokenManager::new(&account.client_secret, credentials_dir)?;
    let access_token = token_manager.get_token().await?;
    let client = GoogleCalendarClient::new(access_token)?;

    exporter.export_account(&client, account, window).await
}
