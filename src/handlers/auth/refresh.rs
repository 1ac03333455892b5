use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};

use crate::app::AppState;
use crate::auth::spotify::{AccessToken, SpotifyAccounts};
use crate::error::ApiError;

use super::utils::{read_cookie, set_cookie, REFRESH_COOKIE, REFRESH_COOKIE_MAX_AGE};

/// POST /auth/refresh - Fresh Spotify access token for the web player
///
/// Reads the refresh token from the `patou_refresh` cookie (401 when absent).
/// If Spotify rotates the refresh token the cookie is rewritten.
pub async fn post(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let refresh_token =
        read_cookie(&headers, REFRESH_COOKIE).ok_or_else(|| ApiError::unauthorized("No Spotify session"))?;

    let accounts = SpotifyAccounts::new(&state.http, &state.config.spotify);
    let tokens = accounts.refresh(&refresh_token).await?;

    let body = AccessToken {
        access_token: tokens.access_token,
        expires_in: tokens.expires_in,
    };
    let mut response = Json(body).into_response();

    if let Some(rotated) = tokens.refresh_token.filter(|t| *t != refresh_token) {
        let cookie = set_cookie(
            REFRESH_COOKIE,
            &rotated,
            REFRESH_COOKIE_MAX_AGE,
            state.config.security.secure_cookies,
        )?;
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    Ok(response)
}
