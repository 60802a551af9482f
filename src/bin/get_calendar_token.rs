use gcalorg::components::google_calendar::TokenManager;
use gcalorg::config::Config;
use gcalorg::error::{other_error, ExportResult};

const REDIRECT_URI: &str = "http://localhost:8080";
const LISTEN_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Load configuration
    let config = Config::load()?;
    let credentials_dir = config.credentials_dir()?;

    for account in &config.accounts {
        let token_manager = TokenManager::new(&account.client_secret, &credentials_dir)?;

        if token_manager.load_cached()?.is_some() {
            println!(
                "Account {} already has a token at {}",
                account.tag,
                token_manager.cache_path().display()
            );
            continue;
        }

        println!("Authorizing account {}...", account.tag);
        authorize(&token_manager).await?;
        println!("Saving credential file to: {}", token_manager.cache_path().display());
    }

    Ok(())
}

/// Run the browser consent flow and cache the resulting token
async fn authorize(token_manager: &TokenManager) -> ExportResult<()> {
    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = token_manager.consent_url(REDIRECT_URI, &state)?;

    // Open browser for authorization
    println!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Go to the following link in your browser:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http(LISTEN_ADDR)
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    // Handle the callback
    let request = server.recv()?;
    let callback = url::Url::parse(&format!("http://localhost{}", request.url()))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if param("state").as_deref() != Some(state.as_str()) {
        return Err(other_error("Callback state does not match the request"));
    }
    let code = param("code").ok_or_else(|| other_error("No authorization code found in callback"))?;

    // Exchange code for tokens
    let token = token_manager.exchange_code(&code, REDIRECT_URI).await?;
    token_manager.save_token(&token)?;

    // Send success response to browser
    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(response)?;

    Ok(())
}
