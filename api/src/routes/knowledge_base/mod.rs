//! # knowledge-base Routes Module
//!
//! Every signed-in user can read articles; managers and admins edit them.

pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use crate::state::AppState;
use axum::{Router, routing::get};

/// Builds the `/knowledge-base` route group.
///
/// - `GET /knowledge-base` → `list_articles`
/// - `POST /knowledge-base` → `create_article`
/// - `GET /knowledge-base/{article_id}` → `get_article` (counts a view)
/// - `PUT /knowledge-base/{article_id}` → `update_article`
/// - `DELETE /knowledge-base/{article_id}` → `delete_article`
pub fn knowledge_base_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_articles).post(post::create_article))
        .route(
            "/{article_id}",
            get(get::get_article)
                .put(put::update_article)
                .delete(delete::delete_article),
        )
}
