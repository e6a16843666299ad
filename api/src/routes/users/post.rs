use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::{JsonBody, UserResponse, parse_enum, validate};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use services::user_service::{CreateUser, IssuedCredentials, UserService};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    pub role: String,
}

/// Result of creating an account or resetting its password.
///
/// `temporaryPassword` is present only when the email could not be sent, so
/// the admin can hand it over another way.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsResponse {
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
    pub email_sent: bool,
}

impl From<IssuedCredentials> for CredentialsResponse {
    fn from(c: IssuedCredentials) -> Self {
        Self {
            user: UserResponse::from(c.user),
            temporary_password: c.temporary_password,
            email_sent: c.email_sent,
        }
    }
}

/// POST /api/users
///
/// Creates an account with a generated temporary password and emails it to
/// the new user.
///
/// ### Request Body
/// ```json
/// { "email": "bob@example.com", "firstName": "Bob", "lastName": "Smith", "role": "it_staff" }
/// ```
///
/// ### Responses
/// - `201 Created`
/// - `400 Bad Request` (`VALIDATION_ERROR`)
/// - `409 Conflict` (email already registered)
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CredentialsResponse>>)> {
    validate(&req)?;
    let issued = UserService::create(
        state.db(),
        state.outbox(),
        &user.0,
        CreateUser {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            role: parse_enum("role", &req.role)?,
        },
    )
    .await?;
    let message = if issued.email_sent {
        "User created; login details were emailed"
    } else {
        "User created; email could not be sent, share the temporary password manually"
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            CredentialsResponse::from(issued),
            message,
        )),
    ))
}

/// POST /api/users/{user_id}/reset-password
///
/// Replaces the user's password with a generated one and emails it.
pub async fn reset_password(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<CredentialsResponse>>> {
    let issued = UserService::reset_password(state.db(), state.outbox(), &user.0, user_id).await?;
    let message = if issued.email_sent {
        "Password reset; the new password was emailed"
    } else {
        "Password reset; email could not be sent, share the temporary password manually"
    };
    Ok(Json(ApiResponse::success(
        CredentialsResponse::from(issued),
        message,
    )))
}
