use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::UserResponse;
use crate::state::AppState;
use axum::{Json, extract::State};
use services::user_service::UserService;

/// GET /api/auth/user
///
/// Returns the profile of the signed-in user. The session guard has already
/// confirmed the account still exists and is active.
///
/// ### Responses
/// - `200 OK` with the user profile
/// - `401 Unauthorized` (no session, expired session, or `ACCOUNT_DEACTIVATED`)
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let current = UserService::get(state.db(), user.id()).await?;
    Ok(Json(ApiResponse::success(
        UserResponse::from(current),
        "User data retrieved successfully",
    )))
}
