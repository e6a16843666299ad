pub mod delete;
pub mod get;
pub mod post;

use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get},
};

/// Builds `/tickets/{ticket_id}/comments`.
///
/// - `GET /` → `list_comments`
/// - `POST /` → `create_comment`
/// - `DELETE /{comment_id}` → `delete_comment`
pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_comments).post(post::create_comment))
        .route("/{comment_id}", delete(delete::delete_comment))
}
