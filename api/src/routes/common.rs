//! Response DTOs and small request helpers shared by route modules.

use crate::response::ApiError;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use db::models::user::{self, Role};
use serde::Serialize;
use std::str::FromStr;
use validator::Validate;

/// `axum::Json` whose rejections (bad syntax, missing fields, wrong content
/// type) come back as a `VALIDATION_ERROR` envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(status = %rejection.status(), "rejected JSON body");
                Err(ApiError::validation(rejection.body_text()))
            }
        }
    }
}

/// Public view of a user account. Never includes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub email_notifications: bool,
    pub in_app_notifications: bool,
    pub theme: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
            is_active: u.is_active,
            email_notifications: u.email_notifications,
            in_app_notifications: u.in_app_notifications,
            theme: u.theme,
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.to_rfc3339(),
        }
    }
}

/// Runs `validator` rules and folds failures into a `VALIDATION_ERROR`.
pub fn validate<T: Validate>(req: &T) -> Result<(), ApiError> {
    req.validate()
        .map_err(|e| ApiError::validation(common::format_validation_errors(&e)))
}

/// Parses an enum sent as a string (`"in_progress"`, `"critical"`, ...).
pub fn parse_enum<T: FromStr>(field: &str, raw: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid {field}: {raw}")))
}

pub fn parse_optional_enum<T: FromStr>(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<T>, ApiError> {
    raw.map(|r| parse_enum(field, r)).transpose()
}
