use crate::auth::{
    AuthUser,
    cookies::{cleared_session_cookie, session_cookie, session_token},
};
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::routes::common::{JsonBody, UserResponse, validate};
use crate::state::AppState;
use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use services::session_service::SessionService;
use services::user_service::UserService;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// POST /api/login (alias: POST /api/auth/login)
///
/// Verifies the credentials, starts a server-side session and sets the
/// HttpOnly session cookie.
///
/// ### Request Body
/// ```json
/// { "email": "alice@example.com", "password": "password123" }
/// ```
///
/// ### Responses
/// - `200 OK` with the user profile
/// - `400 Bad Request` (malformed email or empty password)
/// - `401 Unauthorized` with `INVALID_CREDENTIALS` for an unknown email or a
///   wrong password (indistinguishable), or `ACCOUNT_DEACTIVATED`
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<(CookieJar, Json<ApiResponse<UserResponse>>)> {
    validate(&req)?;
    let user = UserService::authenticate(state.db(), &req.email, &req.password).await?;
    let session = SessionService::start(state.db(), &user).await?;
    tracing::info!(user_id = user.id, "user logged in");

    Ok((
        jar.add(session_cookie(session.token)),
        Json(ApiResponse::success(
            UserResponse::from(user),
            "Login successful",
        )),
    ))
}

/// POST /api/auth/logout (alias: GET /api/logout)
///
/// Destroys the session behind the cookie, if any, and clears the cookie.
/// Always succeeds.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<ApiResponse<Empty>>)> {
    if let Some(token) = session_token(&jar) {
        SessionService::end(state.db(), &token).await?;
    }
    Ok((
        jar.remove(cleared_session_cookie()),
        Json(ApiResponse::success(Empty::default(), "Logged out")),
    ))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(custom(function = "common::validate_password"))]
    pub new_password: String,
}

/// POST /api/auth/change-password
///
/// ### Request Body
/// ```json
/// { "currentPassword": "old-secret", "newPassword": "new-secret-123" }
/// ```
///
/// ### Responses
/// - `200 OK`
/// - `400 Bad Request` (current password wrong or new password too short)
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    validate(&req)?;
    UserService::change_password(state.db(), &user.0, &req.current_password, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::success(
        Empty::default(),
        "Password changed successfully",
    )))
}
