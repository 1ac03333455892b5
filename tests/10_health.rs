mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use common::{memory_store, spawn_app, test_config, FailingStore};

#[tokio::test]
async fn health_reports_ok_when_store_answers() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;

    let res = reqwest::get(format!("{}/health", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["ok"], true);
    Ok(())
}

#[tokio::test]
async fn health_reports_store_failure() -> Result<()> {
    let server = spawn_app(test_config(), Arc::new(FailingStore)).await?;

    let res = reqwest::get(format!("{}/health", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap_or_default().contains("connection refused"));
    Ok(())
}

#[tokio::test]
async fn ping_ignores_the_store() -> Result<()> {
    let server = spawn_app(test_config(), Arc::new(FailingStore)).await?;

    let res = reqwest::get(format!("{}/ping", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["ok"], true);
    Ok(())
}

#[tokio::test]
async fn health_is_open_to_any_origin() -> Result<()> {
    let server = spawn_app(test_config(), memory_store()).await?;

    let res = reqwest::Client::new()
        .get(format!("{}/ping", server.base_url))
        .header("Origin", "https://somewhere.example")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    Ok(())
}
