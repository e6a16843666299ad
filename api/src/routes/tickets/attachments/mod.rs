pub mod delete;
pub mod get;
pub mod post;

use crate::state::AppState;
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use util::config;

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Builds `/tickets/{ticket_id}/attachments`.
///
/// - `GET /` → `list_attachments`
/// - `POST /` → `upload_attachments` (multipart)
/// - `GET /{attachment_id}` → `get_attachment`
/// - `DELETE /{attachment_id}` → `delete_attachment`
/// - `GET /{attachment_id}/download` → `download_attachment`
pub fn attachment_routes() -> Router<AppState> {
    let body_limit = config::max_upload_bytes().saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route(
            "/",
            get(get::list_attachments)
                .post(post::upload_attachments)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/{attachment_id}",
            get(get::get_attachment).delete(delete::delete_attachment),
        )
        .route("/{attachment_id}/download", get(get::download_attachment))
}
