use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::{JsonBody, validate};
use crate::routes::tickets::common::CommentResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use services::comment_service::CommentService;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 10000, message = "Comment must be 1-10000 characters"))]
    pub content: String,
    #[serde(default)]
    pub is_internal: bool,
}

/// POST /api/tickets/{ticket_id}/comments
///
/// ### Request Body
/// ```json
/// { "content": "Replaced the power supply", "isInternal": false }
/// ```
///
/// ### Responses
/// - `201 Created` with the comment
/// - `400 Bad Request` (empty content)
/// - `403 Forbidden` (end user posting an internal note, or not their ticket)
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<i64>,
    JsonBody(req): JsonBody<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CommentResponse>>)> {
    validate(&req)?;
    let created = CommentService::create(
        state.db(),
        state.outbox(),
        &user.0,
        ticket_id,
        &req.content,
        req.is_internal,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            CommentResponse::from(created),
            "Comment added successfully",
        )),
    ))
}
