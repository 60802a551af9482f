use crate::components::google_calendar::TitleFilters;
use crate::error::{config_error, env_error, ExportResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file used when `GCALORG_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/gcalorg.toml";

/// Months of history fetched before tomorrow
pub const DEFAULT_PAST_MONTHS: u32 = 9;

/// Months fetched after tomorrow
pub const DEFAULT_FUTURE_MONTHS: u32 = 12;

/// Calendars fetched at the same time
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// One set of Google credentials and the calendars exported with it
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Tag appended to every calendar heading of this account
    pub tag: String,
    /// Path to the OAuth client secret JSON downloaded from Google
    pub client_secret: PathBuf,
    /// Calendar IDs to export, in output order
    pub calendars: Vec<String>,
}

/// Range of months around tomorrow that events are fetched for
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub past_months: u32,
    pub future_months: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            past_months: DEFAULT_PAST_MONTHS,
            future_months: DEFAULT_FUTURE_MONTHS,
        }
    }
}

/// Main configuration structure for the exporter
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Timezone used to print timed events; the machine zone when unset
    #[serde(default)]
    pub timezone: Option<String>,
    /// Drop events the account owner has declined
    #[serde(default = "default_skip_declined")]
    pub skip_declined: bool,
    /// Directory holding cached OAuth tokens
    #[serde(default)]
    pub credentials_dir: Option<PathBuf>,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    pub accounts: Vec<AccountConfig>,
    /// Calendar ID to title substrings that hide an event series
    #[serde(default)]
    pub title_filters: HashMap<String, Vec<String>>,
}

fn default_skip_declined() -> bool {
    true
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> ExportResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let path = env::var("GCALORG_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;

        if let Ok(timezone) = env::var("TIMEZONE") {
            config.timezone = Some(timezone);
            config.validate()?;
        }

        Ok(config)
    }

    /// Read and validate a TOML config file
    pub fn from_file(path: &Path) -> ExportResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config from TOML text
    pub fn from_toml_str(content: &str) -> ExportResult<Self> {
        let mut config: Config = toml::from_str(content)?;
        for account in &mut config.accounts {
            account.client_secret = expand_home(&account.client_secret)?;
        }
        if let Some(dir) = &config.credentials_dir {
            config.credentials_dir = Some(expand_home(dir)?);
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ExportResult<()> {
        if self.accounts.is_empty() {
            return Err(config_error("At least one [[accounts]] entry is required"));
        }
        for (index, account) in self.accounts.iter().enumerate() {
            if account.tag.trim().is_empty() {
                return Err(config_error(&format!("Account #{} has an empty tag", index + 1)));
            }
            if account.client_secret.as_os_str().is_empty() {
                return Err(config_error(&format!(
                    "Account '{}' has no client_secret path",
                    account.tag
                )));
            }
            if account.calendars.is_empty() {
                return Err(config_error(&format!(
                    "Account '{}' lists no calendars",
                    account.tag
                )));
            }
        }
        if self.max_concurrent_fetches == 0 {
            return Err(config_error("max_concurrent_fetches must be at least 1"));
        }
        self.display_timezone()?;
        Ok(())
    }

    /// Parsed display timezone, `None` meaning the machine local zone
    pub fn display_timezone(&self) -> ExportResult<Option<Tz>> {
        match &self.timezone {
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|_| config_error(&format!("Unknown timezone: {}", name))),
            None => Ok(None),
        }
    }

    /// Directory for cached tokens, `~/.credentials` by default
    pub fn credentials_dir(&self) -> ExportResult<PathBuf> {
        match &self.credentials_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(home_dir()?.join(".credentials")),
        }
    }

    /// Title filters as an injectable value
    pub fn title_filters(&self) -> TitleFilters {
        TitleFilters::new(self.title_filters.clone())
    }
}

fn home_dir() -> ExportResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| env_error("HOME"))
}

fn expand_home(path: &Path) -> ExportResult<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(home_dir()?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}
