//! Configuration management for the playlist statistics CLI.
//!
//! Values come from environment variables. A `.env` file in the local data
//! directory is loaded first when present, so credentials need not be exported
//! in every shell:
//!
//! - Linux: `~/.local/share/playlist-stats/.env`
//! - macOS: `~/Library/Application Support/playlist-stats/.env`
//! - Windows: `%LOCALAPPDATA%/playlist-stats/.env`
//!
//! The client id is only needed when no cached token is available; every
//! endpoint has the public Spotify default.

use std::{env, path::PathBuf};

use crate::{Error, Res};

pub const APP_DIR: &str = "playlist-stats";

/// Default location of the token cache.
pub const DEFAULT_TOKEN_FILE: &str = "/tmp/spotify-playlist-token";

/// Nonce round-tripped through the authorization redirect.
pub const OAUTH_STATE: &str = "spotiplaylistanalyzer";

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_SCOPE: &str =
    "playlist-read-private playlist-read-collaborative playlist-modify-public";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Path of the optional `.env` file.
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path.push(".env");
    path
}

/// Loads environment variables from the `.env` file in the local data directory.
///
/// Returns `Ok(false)` when there is no such file. Variables already present
/// in the environment take precedence over the file.
pub async fn load_env() -> Res<bool> {
    let path = env_path();
    if !path.is_file() {
        return Ok(false);
    }

    dotenv::from_path(&path)
        .map_err(|e| Error::Config(format!("cannot load {}: {}", path.display(), e)))?;
    Ok(true)
}

fn var_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// Returns the Spotify API client ID, if configured.
///
/// A cached token works without it; only the authorization URL, the code
/// exchange and a token refresh need it.
pub fn spotify_client_id() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Unwraps a client id that an operation can not do without.
pub fn require_client_id(client_id: Option<&str>) -> Res<&str> {
    client_id.ok_or_else(missing_client_id)
}

pub fn missing_client_id() -> Error {
    Error::Config(format!(
        "SPOTIFY_API_AUTH_CLIENT_ID must be set (see {})",
        env_path().display()
    ))
}

/// Returns the client secret if one is configured.
///
/// The client secret should be kept confidential and never exposed in logs.
pub fn spotify_client_secret() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Returns the OAuth redirect URI, derived from the callback port unless
/// `SPOTIFY_API_REDIRECT_URI` overrides it.
pub fn spotify_redirect_uri(port: u16) -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", &redirect_uri_for_port(port))
}

pub fn redirect_uri_for_port(port: u16) -> String {
    format!("http://localhost:{}/callback", port)
}

pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Returns the Spotify Web API base URL, without trailing slash.
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
        .trim_end_matches('/')
        .to_string()
}

/// Everything the authorization flow needs to talk to the accounts service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub state: String,
}

impl AuthConfig {
    /// Reads the configuration from the environment. Missing credentials are
    /// only reported once something needs them.
    pub fn from_env(port: u16) -> Self {
        Self {
            client_id: spotify_client_id(),
            client_secret: spotify_client_secret(),
            redirect_uri: spotify_redirect_uri(port),
            scope: spotify_scope(),
            auth_url: spotify_apiauth_url(),
            token_url: spotify_apitoken_url(),
            api_url: spotify_apiurl(),
            state: OAUTH_STATE.to_string(),
        }
    }
}
