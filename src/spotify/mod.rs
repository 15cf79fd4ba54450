//! # Spotify Integration Module
//!
//! A thin client for the parts of the Spotify Web API the analyzer needs,
//! plus the OAuth 2.0 authorization code flow in [`auth`].
//!
//! ```text
//! Application Layer (CLI, Analyzer)
//!          ↓
//! PlaylistSource ← SpotifyClient (bearer token, lazy refresh)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! The analyzer only depends on the [`PlaylistSource`] trait, which keeps it
//! usable against canned pages in tests.

use std::future::Future;

use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::{
    Error, Res,
    types::{Page, PlaylistItem, PrivateUser, SimplePlaylist, Token},
};

pub mod auth;

pub use auth::{AuthFlow, Phase, TokenRefresh};

/// Page selection for paginated listings.
///
/// `None` leaves the parameter out so the API applies its own default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageRequest {
    pub fn first() -> Self {
        Self::default()
    }

    pub fn at(offset: u32, limit: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        query
    }
}

/// Paginated playlist listings the analyzer reads from.
pub trait PlaylistSource {
    fn user_playlists(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> impl Future<Output = Res<Page<SimplePlaylist>>> + Send;

    fn playlist_tracks(
        &self,
        playlist_id: &str,
        page: PageRequest,
    ) -> impl Future<Output = Res<Page<PlaylistItem>>> + Send;
}

/// Authenticated Spotify Web API client.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token: Mutex<Token>,
    refresh: Option<TokenRefresh>,
}

impl SpotifyClient {
    pub fn new(api_url: &str, token: Token) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: Mutex::new(token),
            refresh: None,
        }
    }

    /// Renew expired tokens before requests instead of failing on them.
    pub fn with_refresh(mut self, refresh: TokenRefresh) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub async fn token(&self) -> Token {
        self.token.lock().await.clone()
    }

    /// Fetches the profile of the user the token belongs to.
    pub async fn current_user(&self) -> Res<PrivateUser> {
        self.get("/me", &[]).await
    }

    async fn access_token(&self) -> Res<String> {
        let mut token = self.token.lock().await;
        if let Some(refresh) = &self.refresh {
            if !token.refresh_token.is_empty() && token.is_expired_at(Utc::now()) {
                *token = refresh.refresh(&token).await?;
            }
        }
        Ok(token.access_token.clone())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Res<T> {
        let access_token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}{}", self.api_url, path))
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ApiStatus { status, body });
        }

        Ok(response.json::<T>().await?)
    }
}

impl PlaylistSource for SpotifyClient {
    async fn user_playlists(&self, user_id: &str, page: PageRequest) -> Res<Page<SimplePlaylist>> {
        self.get(&format!("/users/{}/playlists", user_id), &page.query())
            .await
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        page: PageRequest,
    ) -> Res<Page<PlaylistItem>> {
        self.get(&format!("/playlists/{}/tracks", playlist_id), &page.query())
            .await
    }
}
