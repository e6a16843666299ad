use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use services::knowledge_service::KnowledgeService;

/// DELETE /api/knowledge-base/{article_id}
pub async fn delete_article(
    State(state): State<AppState>,
    user: AuthUser,
    Path(article_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    KnowledgeService::delete(state.db(), &user.0, article_id).await?;
    Ok(Json(ApiResponse::success(
        Empty::default(),
        "Article deleted successfully",
    )))
}
