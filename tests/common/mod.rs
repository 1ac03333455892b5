#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use patou_api::app::{build_router, AppState};
use patou_api::config::AppConfig;
use patou_api::database::{
    DatabaseError, Decision, DecisionFilter, DecisionStore, MemoryDecisionStore, Pagination, TrackDecision,
};

pub const ADMIN_SECRET: &str = "s3cret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

/// Serve `router` on a free local port for the rest of the test
pub async fn serve(router: Router) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
    })
}

/// Patou server over `store` with the admin secret set
pub async fn spawn_app(config: AppConfig, store: Arc<dyn DecisionStore>) -> Result<TestServer> {
    serve(build_router(AppState::new(config, store))).await
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.admin_secret = Some(ADMIN_SECRET.to_string());
    config
}

/// Client that hands redirects back to the test instead of following them
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build test client")
}

/// Five allowed tracks, A oldest and E newest, plus two blocked tracks whose
/// name or artist contains "arti".
pub fn decisions() -> Vec<TrackDecision> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let mut records: Vec<TrackDecision> = ["A", "B", "C", "D", "E"]
        .iter()
        .enumerate()
        .map(|(i, name)| TrackDecision {
            id: format!("track-{}", name),
            name: name.to_string(),
            artist: "Band".to_string(),
            decision: Decision::Allowed,
            decided_at: base + Duration::minutes(i as i64),
        })
        .collect();

    records.push(TrackDecision {
        id: "track-smarties".to_string(),
        name: "Smarties".to_string(),
        artist: "Sugar".to_string(),
        decision: Decision::Blocked,
        decided_at: base + Duration::hours(1),
    });
    records.push(TrackDecision {
        id: "track-martin".to_string(),
        name: "Loud".to_string(),
        artist: "MARTIN".to_string(),
        decision: Decision::Blocked,
        decided_at: base + Duration::hours(2),
    });
    records
}

pub fn memory_store() -> Arc<MemoryDecisionStore> {
    Arc::new(MemoryDecisionStore::new(decisions()))
}

/// Memory store that counts listing calls
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryDecisionStore,
    calls: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryDecisionStore::new(decisions()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecisionStore for RecordingStore {
    async fn query_latest_decisions(
        &self,
        filter: &DecisionFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<TrackDecision>, i64), DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.query_latest_decisions(filter, pagination).await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.inner.ping().await
    }
}

/// Store whose every call fails the way a missing view does
pub struct FailingStore;

#[async_trait]
impl DecisionStore for FailingStore {
    async fn query_latest_decisions(
        &self,
        _filter: &DecisionFilter,
        _pagination: &Pagination,
    ) -> Result<(Vec<TrackDecision>, i64), DatabaseError> {
        Err(DatabaseError::QueryError(
            "relation \"latest_track_decisions\" does not exist".to_string(),
        ))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Err(DatabaseError::QueryError("connection refused".to_string()))
    }
}

pub const GOOD_CODE: &str = "good-code";
pub const REFRESH_TOKEN: &str = "rt-1";
pub const ROTATING_REFRESH_TOKEN: &str = "rt-old";

/// Stand-in for the Spotify token endpoint.
///
/// * `authorization_code` with `good-code` issues `at-1` / `rt-1`
/// * `refresh_token` with `rt-1` issues `at-2` and keeps the refresh token
/// * `refresh_token` with `rt-old` issues `at-3` and rotates to `rt-new`
/// * anything else is `400 invalid_grant`
pub async fn spawn_token_endpoint() -> Result<TestServer> {
    serve(Router::new().route("/api/token", post(token_endpoint))).await
}

async fn token_endpoint(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Basic "))
        .unwrap_or(false);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" }))).into_response();
    }

    let grant = form.get("grant_type").map(String::as_str);
    let code = form.get("code").map(String::as_str);
    let refresh = form.get("refresh_token").map(String::as_str);

    match (grant, code, refresh) {
        (Some("authorization_code"), Some(GOOD_CODE), _) => Json(json!({
            "access_token": "at-1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": REFRESH_TOKEN,
            "scope": "streaming"
        }))
        .into_response(),
        (Some("refresh_token"), _, Some(REFRESH_TOKEN)) => Json(json!({
            "access_token": "at-2",
            "token_type": "Bearer",
            "expires_in": 3600
        }))
        .into_response(),
        (Some("refresh_token"), _, Some(ROTATING_REFRESH_TOKEN)) => Json(json!({
            "access_token": "at-3",
            "token_type": "Bearer",
            "expires_in": 1800,
            "refresh_token": "rt-new"
        }))
        .into_response(),
        _ => (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" }))).into_response(),
    }
}

/// Config pointing the Spotify flow at `token_server`
pub fn spotify_config(token_server: &TestServer) -> AppConfig {
    let mut config = test_config();
    config.spotify.client_id = Some("client-123".to_string());
    config.spotify.client_secret = Some("secret-456".to_string());
    config.spotify.redirect_uri = Some("http://127.0.0.1/auth/callback".to_string());
    config.spotify.token_url = format!("{}/api/token", token_server.base_url);
    config.spotify.app_url = "http://localhost:5173/".to_string();
    config
}

/// Every `Set-Cookie` header value on a response
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Value of cookie `name` from a list of `Set-Cookie` headers
pub fn cookie_value(set_cookies: &[String], name: &str) -> Option<String> {
    set_cookies.iter().find_map(|c| {
        let first = c.split(';').next()?;
        let (k, v) = first.split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}
