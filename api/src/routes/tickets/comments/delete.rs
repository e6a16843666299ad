use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use services::comment_service::CommentService;

/// DELETE /api/tickets/{ticket_id}/comments/{comment_id}
///
/// Allowed for the comment's author or an admin.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((ticket_id, comment_id)): Path<(i64, i64)>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    CommentService::delete(state.db(), &user.0, ticket_id, comment_id).await?;
    Ok(Json(ApiResponse::success(
        Empty::default(),
        "Comment deleted successfully",
    )))
}
