use crate::response::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use services::{Actor, ServiceError};

/// The caller behind a resolved session.
///
/// Inserted into request extensions by the guards in [`crate::auth::guards`];
/// handlers mounted behind a guard extract it directly.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Actor);

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(ApiError(ServiceError::Unauthenticated))
    }
}
