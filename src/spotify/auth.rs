use std::{net::SocketAddr, sync::Arc};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use reqwest::{Client, StatusCode, Url};
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, oneshot};

use crate::{
    Error, Res,
    config::{self, AuthConfig},
    info,
    management::TokenCache,
    server,
    spotify::SpotifyClient,
    types::{CallbackParams, Token, TokenResponse},
    warning,
};

/// Where the authorization flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, nothing running yet.
    Idle,
    /// Listener and cache read are running, no token delivered yet.
    AwaitingClient,
    /// A token was delivered and turned into a client.
    Ready,
}

/// PKCE proof for one authorization (RFC 7636, S256 method).
#[derive(Debug, Clone)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    /// A fresh 128 character verifier and its challenge.
    pub fn generate() -> Self {
        let verifier: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(128)
            .map(char::from)
            .collect();
        let challenge = Self::challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    /// base64url (unpadded) SHA-256 of `verifier`.
    pub fn challenge_for(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }
}

/// Produces an authenticated [`SpotifyClient`] exactly once per run.
///
/// [`AuthFlow::start`] reads the token cache and serves the callback endpoint
/// concurrently. Whichever path yields a token first resolves the one-shot
/// handoff that [`AuthFlow::await_client`] waits on.
pub struct AuthFlow {
    shared: Arc<AuthShared>,
    ready: Option<oneshot::Receiver<Res<Token>>>,
    phase: Phase,
    open_browser: bool,
}

impl AuthFlow {
    pub fn new(config: AuthConfig, cache: TokenCache) -> Res<Self> {
        let (tx, rx) = oneshot::channel();
        let pkce = Pkce::generate();
        // without a client id only a cached token can authenticate
        let authorize_url = match config.client_id {
            Some(_) => Some(authorize_url(&config, &pkce.challenge)?),
            None => None,
        };

        Ok(Self {
            shared: Arc::new(AuthShared {
                config,
                cache,
                http: Client::new(),
                code_verifier: pkce.verifier,
                authorize_url,
                handoff: Mutex::new(Some(tx)),
            }),
            ready: Some(rx),
            phase: Phase::Idle,
            open_browser: false,
        })
    }

    /// Opens the authorization URL in the default browser when the cache misses.
    pub fn open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn authorize_url(&self) -> Option<&str> {
        self.shared.authorize_url.as_deref()
    }

    pub fn shared(&self) -> Arc<AuthShared> {
        Arc::clone(&self.shared)
    }

    /// Spawns the token cache read and the callback listener on `port`.
    ///
    /// Returns the bound address, or `None` when the port is unavailable. A
    /// missing listener only fails the flow if the cache misses as well.
    pub async fn start(&mut self, port: u16) -> Option<SocketAddr> {
        let (bound_tx, bound_rx) = oneshot::channel();
        tokio::spawn(read_cache(
            Arc::clone(&self.shared),
            self.open_browser,
            port,
            bound_rx,
        ));
        self.phase = Phase::AwaitingClient;

        let bound = match server::bind(port).await {
            Ok(listener) => listener.local_addr().map(|addr| (addr, listener)).map_err(Error::Io),
            Err(e) => Err(e),
        };

        match bound {
            Ok((addr, listener)) => {
                let server_state = Arc::clone(&self.shared);
                tokio::spawn(async move {
                    if let Err(e) = server::start_api_server(listener, server_state).await {
                        warning!("Callback server stopped: {}", e);
                    }
                });
                let _ = bound_tx.send(Ok(addr));
                Some(addr)
            }
            Err(e) => {
                warning!("Cannot listen on port {}: {}", port, e);
                let _ = bound_tx.send(Err(e.to_string()));
                None
            }
        }
    }

    /// Blocks until the cache or the callback delivers a token.
    pub async fn await_token(&mut self) -> Res<Token> {
        let ready = self.ready.take().ok_or(Error::Handoff)?;
        let token = ready.await.map_err(|_| Error::Handoff)??;
        self.phase = Phase::Ready;
        Ok(token)
    }

    /// Blocks until authentication completes and returns the API client.
    pub async fn await_client(mut self) -> Res<SpotifyClient> {
        let token = self.await_token().await?;
        let config = &self.shared.config;

        Ok(SpotifyClient::new(&config.api_url, token).with_refresh(TokenRefresh {
            http: self.shared.http.clone(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            cache: Some(self.shared.cache.clone()),
        }))
    }
}

/// Delivers the cached token, or falls back to the interactive grant once the
/// listener outcome is known.
async fn read_cache(
    shared: Arc<AuthShared>,
    open_browser: bool,
    port: u16,
    bound: oneshot::Receiver<Result<SocketAddr, String>>,
) {
    let miss = match shared.cache.read().await {
        Ok(token) => {
            shared.deliver(Ok(token)).await;
            return;
        }
        Err(e) => e,
    };
    info!("{}, authorization required", miss);

    match bound.await {
        Ok(Ok(_)) => {}
        Ok(Err(reason)) => {
            shared.deliver(Err(Error::Listener { port, reason })).await;
            return;
        }
        Err(_) => {
            shared.deliver(Err(Error::Handoff)).await;
            return;
        }
    }

    match shared.authorize_url() {
        Ok(url) => {
            info!("To authenticate visit: {}", url);
            if open_browser && webbrowser::open(url).is_err() {
                warning!("Failed to open browser. Please navigate to the URL above manually.");
            }
        }
        Err(e) => {
            shared.deliver(Err(e)).await;
        }
    }
}

/// State the callback server shares with the flow.
pub struct AuthShared {
    config: AuthConfig,
    cache: TokenCache,
    http: Client,
    code_verifier: String,
    authorize_url: Option<String>,
    handoff: Mutex<Option<oneshot::Sender<Res<Token>>>>,
}

impl AuthShared {
    /// The consent URL, unavailable without a configured client id.
    pub fn authorize_url(&self) -> Res<&str> {
        match &self.authorize_url {
            Some(url) => Ok(url),
            None => Err(config::missing_client_id()),
        }
    }

    /// Whether a token (or a fatal error) was already handed off.
    pub async fn is_resolved(&self) -> bool {
        self.handoff.lock().await.is_none()
    }

    /// Hands `result` to the waiting flow. Only the first delivery is kept;
    /// returns `false` for every later one.
    pub async fn deliver(&self, result: Res<Token>) -> bool {
        let Some(tx) = self.handoff.lock().await.take() else {
            return false;
        };
        tx.send(result).is_ok()
    }

    /// Validates the callback query, exchanges the code and caches the token.
    pub async fn complete_callback(&self, params: CallbackParams) -> Res<Token> {
        if let Some(error) = params.error {
            return Err(Error::Authorization(error));
        }

        let received = params.state.unwrap_or_default();
        if received != self.config.state {
            return Err(Error::StateMismatch {
                expected: self.config.state.clone(),
                received,
            });
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::Authorization("callback carried no code".to_string()))?;

        let token = exchange_code(&self.http, &self.config, &code, &self.code_verifier).await?;
        self.cache.write(&token).await?;
        Ok(token)
    }
}

/// Builds the consent URL the user has to visit.
pub fn authorize_url(config: &AuthConfig, code_challenge: &str) -> Res<String> {
    let client_id = config::require_client_id(config.client_id.as_deref())?;
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", config.scope.as_str()),
            ("state", config.state.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid authorization url {}: {}", config.auth_url, e)))?;

    Ok(url.into())
}

/// Exchanges an authorization code for a token.
///
/// The PKCE verifier is always sent; the client secret only when configured.
pub async fn exchange_code(
    http: &Client,
    config: &AuthConfig,
    code: &str,
    verifier: &str,
) -> Res<Token> {
    let client_id = config::require_client_id(config.client_id.as_deref())?;
    let mut request = http.post(&config.token_url).form(&[
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("client_id", client_id),
        ("code_verifier", verifier),
    ]);
    if let Some(secret) = &config.client_secret {
        request = request.basic_auth(client_id, Some(secret));
    }

    let response = read_token_response(request.send().await?).await?;
    Ok(response.into_token(Utc::now(), None))
}

/// Credentials needed to renew an expired access token.
#[derive(Debug, Clone)]
pub struct TokenRefresh {
    pub http: Client,
    pub token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Receives the renewed token when set.
    pub cache: Option<TokenCache>,
}

impl TokenRefresh {
    /// Exchanges the refresh token of `token` for a fresh one.
    pub async fn refresh(&self, token: &Token) -> Res<Token> {
        let client_id = config::require_client_id(self.client_id.as_deref())?;
        let mut request = self.http.post(&self.token_url).form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", token.refresh_token.as_str()),
            ("client_id", client_id),
        ]);
        if let Some(secret) = &self.client_secret {
            request = request.basic_auth(client_id, Some(secret));
        }

        let response = read_token_response(request.send().await?).await?;
        let renewed = response.into_token(Utc::now(), Some(&token.refresh_token));

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.write(&renewed).await {
                warning!("Failed to save refreshed token to cache: {}", e);
            }
        }

        Ok(renewed)
    }
}

async fn read_token_response(response: reqwest::Response) -> Res<TokenResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::ApiStatus { status, body });
    }

    Ok(response.json::<TokenResponse>().await?)
}

/// HTTP status the callback answers with for a failed authorization.
pub fn callback_status(error: &Error) -> StatusCode {
    match error {
        Error::StateMismatch { .. } | Error::Authorization(_) => StatusCode::BAD_REQUEST,
        Error::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Api(_) | Error::ApiStatus { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
