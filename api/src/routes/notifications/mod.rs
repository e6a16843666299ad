//! # notifications Routes Module
//!
//! The caller's own in-app notifications. Clients poll these as the fallback
//! to the live event stream.

pub mod get;
pub mod post;

use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Builds the `/notifications` route group.
///
/// - `GET /notifications` → `list_notifications`
/// - `GET /notifications/unread-count` → `unread_count`
/// - `PATCH /notifications/{notification_id}/read` → `mark_read`
/// - `POST /notifications/read-all` → `mark_all_read`
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_notifications))
        .route("/unread-count", get(get::unread_count))
        .route("/{notification_id}/read", patch(post::mark_read))
        .route("/read-all", post(post::mark_all_read))
}
