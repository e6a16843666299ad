use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use services::knowledge_service::{Article, ArticleQuery, KnowledgeService};

#[derive(Debug, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// GET /api/knowledge-base
///
/// Most viewed first. `search` matches title, content and tags.
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Article>>>> {
    let articles = KnowledgeService::list(
        state.db(),
        &ArticleQuery {
            search: query.search,
            category: query.category,
        },
    )
    .await?;
    Ok(Json(ApiResponse::success(
        articles,
        "Articles retrieved successfully",
    )))
}

/// GET /api/knowledge-base/{article_id}
pub async fn get_article(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Article>>> {
    let article = KnowledgeService::view(state.db(), article_id).await?;
    Ok(Json(ApiResponse::success(
        article,
        "Article retrieved successfully",
    )))
}
