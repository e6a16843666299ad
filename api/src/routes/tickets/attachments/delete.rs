use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use services::attachment_service::AttachmentService;

/// DELETE /api/tickets/{ticket_id}/attachments/{attachment_id}
///
/// Uploader or staff. Removes the stored file, then the row.
pub async fn delete_attachment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((ticket_id, attachment_id)): Path<(i64, i64)>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    AttachmentService::delete(
        state.db(),
        state.uploads_root(),
        &user.0,
        ticket_id,
        attachment_id,
    )
    .await?;
    Ok(Json(ApiResponse::success(
        Empty::default(),
        "Attachment deleted successfully",
    )))
}
