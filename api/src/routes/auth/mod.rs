//! # auth Routes Module
//!
//! - `post.rs`: login, logout, password change
//! - `get.rs`: current user
//! - `patch.rs`: self-service profile update

pub mod get;
pub mod patch;
pub mod post;

use crate::auth::guards::allow_authenticated;
use crate::state::AppState;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

/// Builds the `/auth` route group.
///
/// - `GET /auth/user` → `get_user` (session required)
/// - `PATCH /auth/user` → `update_profile` (session required)
/// - `POST /auth/change-password` → `change_password` (session required)
/// - `POST /auth/login` → `login`
/// - `POST /auth/logout` → `logout`
pub fn auth_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/user", get(get::get_user).patch(patch::update_profile))
        .route("/change-password", post(post::change_password))
        .route_layer(from_fn_with_state(app_state, allow_authenticated))
        .route("/login", post(post::login))
        .route("/logout", post(post::logout))
}
