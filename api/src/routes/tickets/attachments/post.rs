use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResponse, ApiResult};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use db::models::ticket_attachment;
use services::attachment_service::{AttachmentService, UploadedFile};
use util::config;

/// POST /api/tickets/{ticket_id}/attachments
///
/// `multipart/form-data` with one or more file parts (conventionally named
/// `file` or `files`). Each file is limited to `MAX_UPLOAD_BYTES` (10 MB by
/// default) and to the whitelisted document and image types.
///
/// ### Responses
/// - `201 Created` with the stored attachments
/// - `400 Bad Request` (no file, empty file, too large, or disallowed type).
///   One bad part rejects the whole request and nothing is stored.
/// - `403 Forbidden` / `404 Not Found` for tickets the caller cannot see
pub async fn upload_attachments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<ticket_attachment::Model>>>)> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;
        files.push(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let stored = AttachmentService::upload_many(
        state.db(),
        state.uploads_root(),
        &user.0,
        ticket_id,
        files,
        config::max_upload_bytes(),
    )
    .await?;

    let message = if stored.len() == 1 {
        "File uploaded successfully".to_string()
    } else {
        format!("{} files uploaded successfully", stored.len())
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::success(stored, message))))
}
