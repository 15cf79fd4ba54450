//! A local stand-in for the Spotify accounts service and Web API.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use playlist_stats::config::AuthConfig;
use rand::{Rng, distr::Alphanumeric};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const ACCESS_TOKEN: &str = "valid";
pub const REFRESHED_TOKEN: &str = "refreshed-access";
pub const REFRESH_TOKEN: &str = "refresh-abc";

#[derive(Default)]
pub struct Vendor {
    token_calls: AtomicUsize,
    pub forms: Mutex<Vec<HashMap<String, String>>>,
}

impl Vendor {
    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }
}

pub struct FakeSpotify {
    pub base_url: String,
    pub vendor: Arc<Vendor>,
}

impl FakeSpotify {
    pub fn api_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.base_url)
    }

    pub fn auth_config(&self, port: u16) -> AuthConfig {
        AuthConfig {
            client_id: Some("client-123".to_string()),
            client_secret: Some("secret-456".to_string()),
            redirect_uri: format!("http://localhost:{}/callback", port),
            scope: "playlist-read-private playlist-read-collaborative".to_string(),
            auth_url: "https://accounts.spotify.com/authorize".to_string(),
            token_url: self.token_url(),
            api_url: self.api_url(),
            state: "spotiplaylistanalyzer".to_string(),
        }
    }
}

pub async fn spawn_fake_spotify() -> FakeSpotify {
    let vendor = Arc::new(Vendor::default());
    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/me", get(me))
        .route("/v1/users/{user_id}/playlists", get(playlists))
        .route("/v1/playlists/{playlist_id}/tracks", get(tracks))
        .with_state(Arc::clone(&vendor));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeSpotify {
        base_url: format!("http://{}", addr),
        vendor,
    }
}

pub fn temp_token_path() -> PathBuf {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    std::env::temp_dir()
        .join(format!("playlist-stats-test-{}", suffix))
        .join("token")
}

async fn token(
    State(vendor): State<Arc<Vendor>>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    vendor.token_calls.fetch_add(1, Ordering::SeqCst);
    let grant = form.get("grant_type").cloned().unwrap_or_default();
    vendor.forms.lock().unwrap().push(form);

    if grant == "refresh_token" {
        Json(json!({
            "access_token": REFRESHED_TOKEN,
            "token_type": "Bearer",
            "scope": "playlist-read-private",
            "expires_in": 3600
        }))
    } else {
        Json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "scope": "playlist-read-private",
            "expires_in": 3600,
            "refresh_token": REFRESH_TOKEN
        }))
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let accepted = [
        format!("Bearer {}", ACCESS_TOKEN),
        format!("Bearer {}", REFRESHED_TOKEN),
    ];
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| accepted.iter().any(|a| a == v))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"status": 401, "message": "The access token expired"}})),
    )
        .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"id": "me", "display_name": "Me Myself", "type": "user"})).into_response()
}

fn playlist_json(id: &str, owner: &str, collaborative: bool, tracks: u32) -> Value {
    json!({
        "id": id,
        "name": format!("Playlist {}", id),
        "collaborative": collaborative,
        "public": true,
        "owner": {"id": owner, "display_name": owner, "type": "user"},
        "tracks": {"href": "ignored", "total": tracks},
        "type": "playlist"
    })
}

fn paging(query: &HashMap<String, String>, default_limit: usize) -> (usize, usize) {
    let limit = query
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(default_limit);
    let offset = query
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);
    (offset, limit)
}

fn page_json(all: Vec<Value>, offset: usize, limit: usize) -> Value {
    let total = all.len();
    let items: Vec<Value> = all.into_iter().skip(offset).take(limit).collect();
    json!({
        "href": "ignored",
        "items": items,
        "limit": limit,
        "offset": offset,
        "total": total,
        "next": null,
        "previous": null
    })
}

/// User `me` has four playlists, served two per page by default:
/// p1 (own), p2 (foreign), p3 (foreign), p4 (foreign, collaborative).
async fn playlists(
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if user_id != "me" {
        return (StatusCode::NOT_FOUND, "no such user").into_response();
    }

    let all = vec![
        playlist_json("p1", "me", false, 2),
        playlist_json("p2", "other", false, 1),
        playlist_json("p3", "other", false, 1),
        playlist_json("p4", "other", true, 2),
    ];
    let (offset, limit) = paging(&query, 2);
    Json(page_json(all, offset, limit)).into_response()
}

fn track_json(artists: &[&str]) -> Value {
    let artists: Vec<Value> = artists
        .iter()
        .map(|a| json!({"id": format!("id-{}", a), "name": a, "type": "artist"}))
        .collect();
    json!({
        "added_at": "2020-01-01T00:00:00Z",
        "is_local": false,
        "track": {"id": "t", "name": "song", "artists": artists, "type": "track"}
    })
}

async fn tracks(
    headers: HeaderMap,
    Path(playlist_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let all = match playlist_id.as_str() {
        "p1" => vec![track_json(&["A", "B"]), track_json(&["A"])],
        "p2" => vec![track_json(&["A"])],
        "p3" => vec![track_json(&["D"])],
        "p4" => vec![
            track_json(&["C"]),
            json!({"added_at": null, "is_local": false, "track": null}),
        ],
        _ => return (StatusCode::NOT_FOUND, "missing playlist").into_response(),
    };
    let (offset, limit) = paging(&query, 100);
    Json(page_json(all, offset, limit)).into_response()
}
