use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::tickets::common::CommentResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use services::comment_service::CommentService;

/// GET /api/tickets/{ticket_id}/comments
///
/// Oldest first. Internal notes are omitted for end users.
pub async fn list_comments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Vec<CommentResponse>>>> {
    let comments = CommentService::list(state.db(), &user.0, ticket_id)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();
    Ok(Json(ApiResponse::success(
        comments,
        "Comments retrieved successfully",
    )))
}
