use axum::http::{header, HeaderMap, HeaderValue};

use crate::error::ApiError;

pub const STATE_COOKIE: &str = "patou_oauth_state";
pub const REFRESH_COOKIE: &str = "patou_refresh";

/// Both cookies are only ever read by `/auth/*` handlers
pub const COOKIE_PATH: &str = "/auth";

/// Refresh tokens do not expire on Spotify's side; the browser keeps ours for 90 days.
pub const REFRESH_COOKIE_MAX_AGE: u64 = 90 * 24 * 60 * 60;

/// `HttpOnly; SameSite=Lax` cookie scoped to `/auth`
pub fn set_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
        name, value, COOKIE_PATH, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|_| ApiError::bad_gateway(format!("cookie value for {} is not header-safe", name)))
}

pub fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, ApiError> {
    set_cookie(name, "", 0, secure)
}

/// Value of the first cookie called `name` across all `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}
