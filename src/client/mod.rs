// HTTP client for a running Patou server: admin listing and token refresh

use reqwest::{header, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::auth::spotify::AccessToken;
use crate::database::models::{Decision, PageResult};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Admin listing filters. Unset fields are left to the server defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SongsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Decision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "pageSize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct PatouClient {
    http: reqwest::Client,
    base_url: Url,
    admin_header: String,
    admin_secret: Option<String>,
    refresh_token: Option<String>,
}

impl PatouClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // Url::join drops the last segment unless the base ends with '/'
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(&base)?,
            admin_header: "x-admin-token".to_string(),
            admin_secret: None,
            refresh_token: None,
        })
    }

    pub fn with_admin_secret(mut self, header: impl Into<String>, secret: impl Into<String>) -> Self {
        self.admin_header = header.into();
        self.admin_secret = Some(secret.into());
        self
    }

    /// The refresh cookie a browser would send along with `/auth/refresh`
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// GET /admin/songs
    pub async fn list_songs(&self, query: &SongsQuery) -> Result<PageResult, ClientError> {
        let mut request = self.http.get(self.base_url.join("admin/songs")?).query(query);
        if let Some(secret) = &self.admin_secret {
            request = request.header(self.admin_header.as_str(), secret);
        }

        let response = check(request.send().await?).await?;
        Ok(response.json::<PageResult>().await?)
    }

    /// POST /auth/refresh. A non-success status is an error; nothing is retried.
    pub async fn refresh_access_token(&self) -> Result<AccessToken, ClientError> {
        let mut request = self.http.post(self.base_url.join("auth/refresh")?);
        if let Some(token) = &self.refresh_token {
            request = request.header(header::COOKIE, format!("patou_refresh={}", token));
        }

        let response = check(request.send().await?).await?;
        Ok(response.json::<AccessToken>().await?)
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            }
        });

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
