use axum::{
    extract::{Query, State},
    Json,
};

use crate::app::AppState;
use crate::database::models::PageResult;
use crate::error::ApiError;
use crate::services::ListParams;

/// GET /admin/songs - One page of tracks with a given latest decision
///
/// Query parameters:
/// - `status`: `allowed` (default) or `blocked`
/// - `q`: case-insensitive substring of the track name or artist
/// - `page`: 1-based page number (default 1)
/// - `pageSize`: rows per page (default 50, capped by configuration)
///
/// Output:
/// ```json
/// { "items": [ { "id": "...", "name": "...", "artist": "...", "decision": "allowed", "decided_at": "..." } ],
///   "total": 5, "page": 1, "pageSize": 2 }
/// ```
pub async fn get(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResult>, ApiError> {
    let page = state.moderation.list(&params).await?;
    Ok(Json(page))
}
