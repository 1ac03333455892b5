// Spotify accounts service: authorize URL, code exchange, token refresh

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::{SpotifyConfig, SPOTIFY_SCOPES};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid Spotify URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Spotify token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("Spotify token endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Token endpoint response. `refresh_token` is only present on the code
/// exchange, or on refresh when Spotify rotates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// What the browser gets back from `/auth/refresh`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
}

pub struct SpotifyAccounts<'a> {
    http: &'a reqwest::Client,
    config: &'a SpotifyConfig,
}

impl<'a> SpotifyAccounts<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a SpotifyConfig) -> Self {
        Self { http, config }
    }

    /// Random anti-forgery token for the `state` parameter
    pub fn new_state() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn authorize_url(&self, state: &str) -> Result<Url, AuthError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(AuthError::ConfigMissing("SPOTIFY_CLIENT_ID"))?;
        let redirect_uri = self
            .config
            .redirect_uri
            .as_deref()
            .ok_or(AuthError::ConfigMissing("SPOTIFY_REDIRECT_URI"))?;

        let scope = SPOTIFY_SCOPES.join(" ");
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", client_id),
                ("scope", scope.as_str()),
                ("redirect_uri", redirect_uri),
                ("state", state),
            ],
        )?;
        Ok(url)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let redirect_uri = self
            .config
            .redirect_uri
            .as_deref()
            .ok_or(AuthError::ConfigMissing("SPOTIFY_REDIRECT_URI"))?;

        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        self.token_request(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(AuthError::ConfigMissing("SPOTIFY_CLIENT_ID"))?;
        let client_secret = self
            .config
            .client_secret
            .as_deref()
            .ok_or(AuthError::ConfigMissing("SPOTIFY_CLIENT_SECRET"))?;

        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Spotify token endpoint returned {}: {}", status, body);
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }
}
