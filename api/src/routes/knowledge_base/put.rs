use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::{JsonBody, validate};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use services::knowledge_service::{Article, KnowledgeService, UpdateArticle};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// PUT /api/knowledge-base/{article_id}
pub async fn update_article(
    State(state): State<AppState>,
    user: AuthUser,
    Path(article_id): Path<i64>,
    JsonBody(req): JsonBody<UpdateArticleRequest>,
) -> ApiResult<Json<ApiResponse<Article>>> {
    validate(&req)?;
    let article = KnowledgeService::update(
        state.db(),
        &user.0,
        article_id,
        UpdateArticle {
            title: req.title,
            content: req.content,
            category: req.category,
            tags: req.tags,
        },
    )
    .await?;
    Ok(Json(ApiResponse::success(
        article,
        "Article updated successfully",
    )))
}
