use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::ApiError;

/// Admin gate: every request under the admin prefix must satisfy the
/// configured `Authorizer`. Everything else passes through untouched.
pub async fn admin_gate_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !is_admin_path(request.uri().path(), &state.config.security.admin_prefix) {
        return Ok(next.run(request).await);
    }

    if !state.authorizer.is_authorized(request.headers()) {
        tracing::warn!(
            "Admin request rejected: {} {}",
            request.method(),
            request.uri().path()
        );
        return Err(ApiError::forbidden("Forbidden"));
    }

    Ok(next.run(request).await)
}

/// `/admin` and anything below `/admin/`, but not `/administrator`
pub fn is_admin_path(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
