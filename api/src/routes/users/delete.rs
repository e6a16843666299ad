use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use services::user_service::UserService;

/// DELETE /api/users/{user_id}
///
/// Removes the account together with its tickets, comments, attachments and
/// sessions. Admins cannot delete themselves.
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    UserService::delete(state.db(), state.uploads_root(), &user.0, user_id).await?;
    Ok(Json(ApiResponse::success(
        Empty::default(),
        "User deleted successfully",
    )))
}
