use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::{JsonBody, validate};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use services::knowledge_service::{Article, CreateArticle, KnowledgeService};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// POST /api/knowledge-base
///
/// ### Request Body
/// ```json
/// { "title": "Connecting to the VPN", "content": "...", "category": "network", "tags": ["vpn"] }
/// ```
pub async fn create_article(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<CreateArticleRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Article>>)> {
    validate(&req)?;
    let article = KnowledgeService::create(
        state.db(),
        &user.0,
        CreateArticle {
            title: req.title,
            content: req.content,
            category: req.category,
            tags: req.tags,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(article, "Article created successfully")),
    ))
}
