mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode as AxumStatus},
};
use reqwest::StatusCode;
use serde_json::Value;
use tower::ServiceExt;

use patou_api::app::{build_router, AppState};
use patou_api::client::{ClientError, PatouClient, SongsQuery};
use patou_api::database::{Decision, UnconfiguredStore};

use common::{memory_store, spawn_app, test_config, FailingStore, ADMIN_SECRET};

async fn list(base_url: &str, query: &str) -> Result<(StatusCode, Value)> {
    let res = reqwest::Client::new()
        .get(format!("{}/admin/songs{}", base_url, query))
        .header("x-admin-token", ADMIN_SECRET)
        .send()
        .await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

fn names(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn first_page_is_newest_first() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;

    let (status, body) = list(&server.base_url, "?page=1&pageSize=2").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["E", "D"]);
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 2);
    assert_eq!(body["items"][0]["decision"], "allowed");
    Ok(())
}

#[tokio::test]
async fn last_page_may_be_short() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;

    let (_, body) = list(&server.base_url, "?page=3&pageSize=2").await?;
    assert_eq!(names(&body), vec!["A"]);
    assert_eq!(body["total"], 5);

    let (status, body) = list(&server.base_url, "?page=4&pageSize=2").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(names(&body).is_empty());
    assert_eq!(body["total"], 5);
    Ok(())
}

#[tokio::test]
async fn defaults_apply_without_parameters() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;

    let (status, body) = list(&server.base_url, "").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 50);
    assert_eq!(names(&body), vec!["E", "D", "C", "B", "A"]);
    Ok(())
}

#[tokio::test]
async fn search_matches_name_or_artist_case_insensitively() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;

    let (_, body) = list(&server.base_url, "?status=blocked&q=arti").await?;
    assert_eq!(body["total"], 2);
    assert_eq!(names(&body), vec!["Loud", "Smarties"]);

    let (_, body) = list(&server.base_url, "?status=allowed&q=arti").await?;
    assert_eq!(body["total"], 0);
    Ok(())
}

#[tokio::test]
async fn blank_search_is_ignored() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;

    let (_, body) = list(&server.base_url, "?status=blocked&q=%20%20").await?;
    assert_eq!(body["total"], 2);
    Ok(())
}

#[tokio::test]
async fn unknown_status_falls_back_to_allowed() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;

    let (status, body) = list(&server.base_url, "?status=pending").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    Ok(())
}

#[tokio::test]
async fn bad_numbers_fall_back_and_page_size_is_clamped() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;

    let (_, body) = list(&server.base_url, "?page=0&pageSize=abc").await?;
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 50);

    let (_, body) = list(&server.base_url, "?page=-3&pageSize=1000").await?;
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 200);
    assert_eq!(names(&body).len(), 5);
    Ok(())
}

#[tokio::test]
async fn page_length_matches_remaining_rows() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;
    let total: usize = 5;

    for size in 1..=6usize {
        for page in 1..=7usize {
            let (status, body) = list(&server.base_url, &format!("?page={}&pageSize={}", page, size)).await?;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["total"], 5);

            let offset = (page - 1) * size;
            let expected = if offset < total { size.min(total - offset) } else { 0 };
            assert_eq!(
                names(&body).len(),
                expected,
                "page {} with pageSize {} returned the wrong number of items",
                page,
                size
            );
        }
    }
    Ok(())
}

#[tokio::test]
async fn store_failure_is_500_with_message() -> Result<()> {
    let server = spawn_app(test_config(), Arc::new(FailingStore)).await?;

    let (status, body) = list(&server.base_url, "").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "UPSTREAM_QUERY_ERROR");
    assert!(body["error"].as_str().unwrap_or_default().contains("does not exist"));
    Ok(())
}

#[tokio::test]
async fn router_serves_listing_without_a_socket() -> Result<()> {
    let app = build_router(AppState::new(test_config(), memory_store()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/songs?pageSize=1")
                .header("x-admin-token", ADMIN_SECRET)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), AxumStatus::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["items"][0]["name"], "E");
    assert_eq!(body["pageSize"], 1);
    Ok(())
}

#[tokio::test]
async fn client_lists_songs() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;
    let client = PatouClient::new(&server.base_url)?.with_admin_secret("x-admin-token", ADMIN_SECRET);

    let page = client
        .list_songs(&SongsQuery {
            status: Some(Decision::Blocked),
            q: Some("smart".to_string()),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, "track-smarties");
    assert_eq!(page.items[0].decision, Decision::Blocked);
    Ok(())
}

#[tokio::test]
async fn client_surfaces_forbidden() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;
    let client = PatouClient::new(&server.base_url)?.with_admin_secret("x-admin-token", "wrong");

    match client.list_songs(&SongsQuery::default()).await {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Forbidden");
        }
        other => panic!("expected 403, got {:?}", other.map(|p| p.total)),
    }
    Ok(())
}

#[tokio::test]
async fn missing_database_is_configuration_error() -> Result<()> {
    let server = spawn_app(test_config(), Arc::new(UnconfiguredStore::new("DATABASE_URL"))).await?;

    let (status, body) = list(&server.base_url, "").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "CONFIGURATION_ERROR");
    assert_eq!(body["error"], "Missing configuration: DATABASE_URL");
    Ok(())
}
