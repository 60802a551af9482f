use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the exporter
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(gcalorg::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(gcalorg::config), help("check the file named by GCALORG_CONFIG"))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(gcalorg::google_calendar))]
    GoogleCalendar(String),

    #[error("Token error: {0}")]
    #[diagnostic(code(gcalorg::token), help("run `get_calendar_token` to authorize this account"))]
    Token(String),

    #[error("Invalid timestamp '{value}': {source}")]
    #[diagnostic(code(gcalorg::timestamp))]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    #[diagnostic(code(gcalorg::http))]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(gcalorg::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(gcalorg::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(gcalorg::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type ExportResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create token errors
pub fn token_error(message: &str) -> Error {
    Error::Token(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
