use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::{JsonBody, UserResponse, validate};
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Deserialize;
use services::user_service::{UpdateProfile, UserService};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,
    pub email_notifications: Option<bool>,
    pub in_app_notifications: Option<bool>,
    pub theme: Option<String>,
}

/// PATCH /api/auth/user
///
/// Updates the caller's names and preferences. Role and active flag are not
/// accepted here; only an admin can change those.
///
/// ### Request Body
/// ```json
/// { "firstName": "Ada", "emailNotifications": false, "theme": "dark" }
/// ```
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    validate(&req)?;
    let updated = UserService::update_profile(
        state.db(),
        &user.0,
        UpdateProfile {
            first_name: req.first_name,
            last_name: req.last_name,
            email_notifications: req.email_notifications,
            in_app_notifications: req.in_app_notifications,
            theme: req.theme,
        },
    )
    .await?;
    Ok(Json(ApiResponse::success(
        UserResponse::from(updated),
        "Profile updated successfully",
    )))
}
