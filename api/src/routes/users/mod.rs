//! # users Routes Module
//!
//! Directory reads are open to managers (and the staff-only assignee list to
//! all staff); every mutation is admin-only. The service layer checks the
//! same capabilities again.

pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use crate::auth::guards::{allow_admin, allow_manager, allow_staff};
use crate::state::AppState;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};

/// Builds the `/users` route group.
///
/// - `GET /users` → `list_users` (manager/admin)
/// - `GET /users/{user_id}` → `get_user` (manager/admin)
/// - `GET /users/staff` → `list_staff` (staff)
/// - `POST /users` → `create_user` (admin)
/// - `PUT /users/{user_id}` → `update_user` (admin)
/// - `PUT /users/{user_id}/status` → `set_user_status` (admin)
/// - `POST /users/{user_id}/reset-password` → `reset_password` (admin)
/// - `DELETE /users/{user_id}` → `delete_user` (admin)
pub fn users_routes(app_state: AppState) -> Router<AppState> {
    let staff = Router::new()
        .route("/staff", get(get::list_staff))
        .route_layer(from_fn_with_state(app_state.clone(), allow_staff));

    let managers = Router::new()
        .route("/", get(get::list_users))
        .route("/{user_id}", get(get::get_user))
        .route_layer(from_fn_with_state(app_state.clone(), allow_manager));

    let admins = Router::new()
        .route("/", post(post::create_user))
        .route("/{user_id}", put(put::update_user))
        .route("/{user_id}", delete(delete::delete_user))
        .route("/{user_id}/status", put(put::set_user_status))
        .route("/{user_id}/reset-password", post(post::reset_password))
        .route_layer(from_fn_with_state(app_state, allow_admin));

    staff.merge(managers).merge(admins)
}
