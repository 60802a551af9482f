use crate::error::{token_error, ExportResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Read-only access is all the exporter needs
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Seconds before expiry at which a token is refreshed early
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// OAuth client credentials from a Google client secret file
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Google wraps the credentials in `installed` or `web`
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<OAuthClient>,
    web: Option<OAuthClient>,
}

impl OAuthClient {
    /// Parse the JSON downloaded from the Google Cloud console
    pub fn from_json(content: &str) -> ExportResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(content)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| token_error("Client secret has neither an 'installed' nor a 'web' section"))
    }
}

/// Token as cached on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp after which `access_token` is no longer valid
    pub expires_at: i64,
}

impl StoredToken {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_LEEWAY_SECS <= now
    }
}

/// Response of the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_stored(self, previous_refresh: Option<String>) -> StoredToken {
        let expires_in = self.expires_in.unwrap_or(3600);
        StoredToken {
            access_token: self.access_token,
            // Refresh responses usually omit the refresh token
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: Utc::now().timestamp() + expires_in,
        }
    }
}

/// File name of the token cache for a client secret file
pub fn token_cache_file_name(secret_path: &Path) -> String {
    let base = secret_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = format!("calendar-api-quickstart.{}.json", base);
    url::form_urlencoded::byte_serialize(name.as_bytes()).collect()
}

/// Loads, refreshes and stores the OAuth token of one account
#[derive(Clone)]
pub struct TokenManager {
    oauth: OAuthClient,
    cache_path: PathBuf,
    client: Client,
}

impl TokenManager {
    /// Read the client secret and locate the token cache
    pub fn new(secret_path: &Path, credentials_dir: &Path) -> ExportResult<Self> {
        let content = fs::read_to_string(secret_path).map_err(|e| {
            token_error(&format!(
                "Unable to read client secret file {}: {}",
                secret_path.display(),
                e
            ))
        })?;
        let oauth = OAuthClient::from_json(&content)?;
        let cache_path = credentials_dir.join(token_cache_file_name(secret_path));

        Ok(Self::with_client(oauth, cache_path))
    }

    pub fn with_client(oauth: OAuthClient, cache_path: PathBuf) -> Self {
        Self {
            oauth,
            cache_path,
            client: Client::new(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Get a valid access token, refreshing the cached one if needed
    pub async fn get_token(&self) -> ExportResult<String> {
        let token = self.load_cached()?.ok_or_else(|| {
            token_error(&format!("No cached token at {}", self.cache_path.display()))
        })?;

        if !token.is_expired(Utc::now().timestamp()) {
            debug!("Using cached token from {}", self.cache_path.display());
            return Ok(token.access_token);
        }

        info!("Cached token expired, refreshing");
        let refreshed = self.refresh_token(&token).await?;
        self.save_token(&refreshed)?;
        Ok(refreshed.access_token)
    }

    /// Read the cached token, `None` when there is no cache file
    pub fn load_cached(&self) -> ExportResult<Option<StoredToken>> {
        if !self.cache_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.cache_path)?;
        let token = serde_json::from_str(&content)?;
        Ok(Some(token))
    }

    /// Write the token cache, creating the credentials directory
    pub fn save_token(&self, token: &StoredToken) -> ExportResult<()> {
        if let Some(dir) = self.cache_path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
                // Only a directory we created is ours to lock down
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
                }
            }
        }
        fs::write(&self.cache_path, serde_json::to_string_pretty(token)?)?;
        Ok(())
    }

    /// Consent page the user opens to authorize read access
    pub fn consent_url(&self, redirect_uri: &str, state: &str) -> ExportResult<Url> {
        let mut url = Url::parse(&self.oauth.auth_uri)
            .map_err(|e| token_error(&format!("Invalid auth URI: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.oauth.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("scope", CALENDAR_READONLY_SCOPE)
            .append_pair("state", state);
        Ok(url)
    }

    /// Exchange an authorization code for a token
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> ExportResult<StoredToken> {
        let params = [
            ("client_id", self.oauth.client_id.as_str()),
            ("client_secret", self.oauth.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];
        let response = self.request_token(&params).await?;
        Ok(response.into_stored(None))
    }

    /// Refresh an expired token
    async fn refresh_token(&self, token: &StoredToken) -> ExportResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| token_error("No refresh token in cached token"))?;

        let params = [
            ("client_id", self.oauth.client_id.as_str()),
            ("client_secret", self.oauth.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = self.request_token(&params).await?;
        Ok(response.into_stored(token.refresh_token.clone()))
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> ExportResult<TokenResponse> {
        let response = self
            .client
            .post(&self.oauth.token_uri)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(token_error(&format!(
                "Token request failed: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| token_error(&format!("Failed to parse token response: {}", e)))
    }
}
