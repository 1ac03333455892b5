use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::spotify::SpotifyAccounts;
use crate::error::ApiError;

use super::utils::{clear_cookie, read_cookie, set_cookie, REFRESH_COOKIE, REFRESH_COOKIE_MAX_AGE, STATE_COOKIE};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Spotify when the user declines, e.g. `access_denied`
    pub error: Option<String>,
}

/// GET /auth/callback - Spotify redirects here after consent
///
/// 1. reject provider errors (400)
/// 2. `state` must equal the cookie set by `/auth/login` (403 otherwise)
/// 3. exchange `code` for tokens (502 when Spotify refuses)
/// 4. keep the refresh token in an HttpOnly cookie and send the browser home
pub async fn get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    if let Some(error) = query.error {
        tracing::warn!("Spotify authorization failed: {}", error);
        return Err(ApiError::bad_request(format!("Spotify authorization failed: {}", error)));
    }

    let expected = read_cookie(&headers, STATE_COOKIE);
    match (expected.as_deref(), query.state.as_deref()) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => {
            tracing::warn!("OAuth callback state mismatch");
            return Err(ApiError::forbidden("OAuth state mismatch"));
        }
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing authorization code"))?;

    let accounts = SpotifyAccounts::new(&state.http, &state.config.spotify);
    let tokens = accounts.exchange_code(&code).await?;
    let refresh_token = tokens
        .refresh_token
        .ok_or_else(|| ApiError::bad_gateway("Spotify did not return a refresh token"))?;

    let secure = state.config.security.secure_cookies;
    let location = HeaderValue::from_str(&state.config.spotify.app_url)
        .map_err(|_| ApiError::Configuration("PATOU_APP_URL is not header-safe".to_string()))?;

    let mut response = StatusCode::FOUND.into_response();
    let out = response.headers_mut();
    out.insert(header::LOCATION, location);
    out.append(header::SET_COOKIE, set_cookie(REFRESH_COOKIE, &refresh_token, REFRESH_COOKIE_MAX_AGE, secure)?);
    out.append(header::SET_COOKIE, clear_cookie(STATE_COOKIE, secure)?);

    tracing::info!("Spotify login completed");
    Ok(response)
}
