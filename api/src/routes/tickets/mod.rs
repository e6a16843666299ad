//! # tickets Routes Module
//!
//! Ticket lifecycle plus nested comment and attachment groups. Visibility and
//! mutation rules live in the service layer; handlers only translate HTTP.
//!
//! - `get.rs`: list and detail
//! - `post.rs`: create and assign
//! - `patch.rs`: staff updates (status, priority, fields)
//! - `delete.rs`: delete with comment/attachment cleanup
//! - `comments/`: `/tickets/{ticket_id}/comments`
//! - `attachments/`: `/tickets/{ticket_id}/attachments`

pub mod attachments;
pub mod comments;
pub mod common;
pub mod delete;
pub mod get;
pub mod patch;
pub mod post;

use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Builds the `/tickets` route group.
///
/// - `GET /tickets` → `list_tickets`
/// - `POST /tickets` → `create_ticket`
/// - `GET /tickets/{ticket_id}` → `get_ticket`
/// - `PATCH /tickets/{ticket_id}` → `update_ticket`
/// - `DELETE /tickets/{ticket_id}` → `delete_ticket`
/// - `POST /tickets/{ticket_id}/assign` → `assign_ticket`
pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_tickets).post(post::create_ticket))
        .route(
            "/{ticket_id}",
            get(get::get_ticket)
                .patch(patch::update_ticket)
                .delete(delete::delete_ticket),
        )
        .route("/{ticket_id}/assign", post(post::assign_ticket))
        .nest("/{ticket_id}/comments", comments::comment_routes())
        .nest("/{ticket_id}/attachments", attachments::attachment_routes())
}
