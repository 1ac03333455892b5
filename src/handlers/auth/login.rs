use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::spotify::SpotifyAccounts;
use crate::error::ApiError;

use super::utils::{set_cookie, STATE_COOKIE};

/// GET /auth/login - Start the Spotify authorization code flow
///
/// Needs `SPOTIFY_CLIENT_ID` and `SPOTIFY_REDIRECT_URI`; answers 500 when either
/// is missing. On success answers 302 to the Spotify consent page. The `state`
/// sent to Spotify is also stored in a short-lived cookie and checked by
/// `/auth/callback`.
pub async fn get(State(state): State<AppState>) -> Result<Response, ApiError> {
    let accounts = SpotifyAccounts::new(&state.http, &state.config.spotify);
    let oauth_state = SpotifyAccounts::new_state();
    let url = accounts.authorize_url(&oauth_state)?;

    let location = HeaderValue::from_str(url.as_str())
        .map_err(|_| ApiError::Configuration("Spotify authorize URL is not header-safe".to_string()))?;
    let cookie = set_cookie(
        STATE_COOKIE,
        &oauth_state,
        state.config.spotify.state_ttl_secs,
        state.config.security.secure_cookies,
    )?;

    let mut response = StatusCode::FOUND.into_response();
    let headers = response.headers_mut();
    headers.insert(header::LOCATION, location);
    headers.append(header::SET_COOKIE, cookie);

    tracing::debug!("Redirecting to Spotify authorization");
    Ok(response)
}
