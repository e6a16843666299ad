use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::{JsonBody, UserResponse, parse_optional_enum, validate};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use services::user_service::{UpdateUser, UserService};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,
    pub role: Option<String>,
}

/// PUT /api/users/{user_id}
///
/// Admins may change names, email and role. An admin cannot change their own
/// role.
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i64>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    validate(&req)?;
    let updated = UserService::update(
        state.db(),
        &user.0,
        user_id,
        UpdateUser {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            role: parse_optional_enum("role", req.role.as_deref())?,
        },
    )
    .await?;
    Ok(Json(ApiResponse::success(
        UserResponse::from(updated),
        "User updated successfully",
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusRequest {
    pub is_active: bool,
}

/// PUT /api/users/{user_id}/status
///
/// Activates or deactivates an account. A deactivated user's sessions are
/// rejected (and destroyed) on their next request.
///
/// ### Request Body
/// ```json
/// { "isActive": false }
/// ```
pub async fn set_user_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i64>,
    JsonBody(req): JsonBody<UserStatusRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let updated = UserService::set_active(state.db(), &user.0, user_id, req.is_active).await?;
    let message = if updated.is_active {
        "User activated"
    } else {
        "User deactivated"
    };
    Ok(Json(ApiResponse::success(
        UserResponse::from(updated),
        message,
    )))
}
