mod common;

use chrono::{Duration, Utc};
use common::{ACCESS_TOKEN, REFRESH_TOKEN, REFRESHED_TOKEN, spawn_fake_spotify, temp_token_path};
use playlist_stats::{
    Error,
    analyzer::{AnalyzeOptions, PlaylistStats},
    management::TokenCache,
    report::render_stats,
    spotify::{PageRequest, PlaylistSource, SpotifyClient, TokenRefresh},
    types::Token,
};
use reqwest::StatusCode;

fn token(access: &str, expiry: Option<chrono::DateTime<Utc>>) -> Token {
    Token {
        access_token: access.to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: REFRESH_TOKEN.to_string(),
        expiry,
    }
}

#[tokio::test]
async fn test_user_playlists_pages() {
    let fake = spawn_fake_spotify().await;
    let client = SpotifyClient::new(&fake.api_url(), token(ACCESS_TOKEN, None));

    let first = client
        .user_playlists("me", PageRequest::first())
        .await
        .unwrap();
    assert_eq!(first.limit, 2);
    assert_eq!(first.total, 4);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].id, "p1");
    assert_eq!(first.items[0].owner.id, "me");

    let second = client
        .user_playlists("me", PageRequest::at(2, 2))
        .await
        .unwrap();
    assert_eq!(second.offset, 2);
    assert_eq!(second.items[1].id, "p4");
    assert!(second.items[1].collaborative);
}

#[tokio::test]
async fn test_playlist_tracks_tolerates_null_tracks() {
    let fake = spawn_fake_spotify().await;
    let client = SpotifyClient::new(&fake.api_url(), token(ACCESS_TOKEN, None));

    let page = client
        .playlist_tracks("p4", PageRequest::first())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].track.as_ref().unwrap().artists[0].name, "C");
    assert!(page.items[1].track.is_none());
}

#[tokio::test]
async fn test_error_status_is_returned() {
    let fake = spawn_fake_spotify().await;
    let client = SpotifyClient::new(&fake.api_url(), token(ACCESS_TOKEN, None));

    let result = client
        .playlist_tracks("missing", PageRequest::first())
        .await;
    assert!(matches!(
        result,
        Err(Error::ApiStatus { status, .. }) if status == StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn test_expired_token_without_refresh_surfaces_api_error() {
    let fake = spawn_fake_spotify().await;
    let client = SpotifyClient::new(
        &fake.api_url(),
        token("stale", Some(Utc::now() - Duration::hours(1))),
    );

    let result = client.current_user().await;
    assert!(matches!(
        result,
        Err(Error::ApiStatus { status, .. }) if status == StatusCode::UNAUTHORIZED
    ));
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_cached() {
    let fake = spawn_fake_spotify().await;
    let path = temp_token_path();
    let client = SpotifyClient::new(
        &fake.api_url(),
        token("stale", Some(Utc::now() - Duration::hours(1))),
    )
    .with_refresh(TokenRefresh {
        http: reqwest::Client::new(),
        token_url: fake.token_url(),
        client_id: Some("client-123".to_string()),
        client_secret: None,
        cache: Some(TokenCache::new(&path)),
    });

    let user = client.current_user().await.unwrap();
    assert_eq!(user.id, "me");

    let renewed = client.token().await;
    assert_eq!(renewed.access_token, REFRESHED_TOKEN);
    // the accounts service did not rotate the refresh token
    assert_eq!(renewed.refresh_token, REFRESH_TOKEN);
    assert!(renewed.expiry.unwrap() > Utc::now());

    assert_eq!(TokenCache::new(&path).read().await.unwrap(), renewed);

    let forms = fake.vendor.forms.lock().unwrap().clone();
    assert_eq!(forms[0]["grant_type"], "refresh_token");
    assert_eq!(forms[0]["refresh_token"], REFRESH_TOKEN);

    // a second request reuses the renewed token
    client.current_user().await.unwrap();
    assert_eq!(fake.vendor.token_calls(), 1);
}

#[tokio::test]
async fn test_analysis_against_web_api() {
    let fake = spawn_fake_spotify().await;
    let client = SpotifyClient::new(&fake.api_url(), token(ACCESS_TOKEN, None));

    let mut stats = PlaylistStats::new(&client);
    stats.analyze_user("me").await.unwrap();
    let counts = stats.into_counts();

    // p1 and p2 from the unfiltered first page, p4 for being collaborative
    assert_eq!(counts.get("A"), Some(&3));
    assert_eq!(counts.get("B"), Some(&1));
    assert_eq!(counts.get("C"), Some(&1));
    assert_eq!(counts.get("D"), None);

    let report = render_stats(&counts, 2);
    assert!(report.ends_with("* A - 3\n"));
}

#[tokio::test]
async fn test_analysis_with_filtered_first_page() {
    let fake = spawn_fake_spotify().await;
    let client = SpotifyClient::new(&fake.api_url(), token(ACCESS_TOKEN, None));

    let mut stats = PlaylistStats::new(&client).with_options(AnalyzeOptions {
        filter_first_page: true,
        all_track_pages: true,
    });
    stats.analyze_user("me").await.unwrap();
    let counts = stats.into_counts();

    assert_eq!(counts.get("A"), Some(&2));
    assert_eq!(counts.get("B"), Some(&1));
    assert_eq!(counts.get("C"), Some(&1));
}
