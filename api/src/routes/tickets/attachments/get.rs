use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResponse, ApiResult};
use crate::state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use db::models::ticket_attachment;
use services::attachment_service::AttachmentService;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// GET /api/tickets/{ticket_id}/attachments
pub async fn list_attachments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Vec<ticket_attachment::Model>>>> {
    let attachments = AttachmentService::list(state.db(), &user.0, ticket_id).await?;
    Ok(Json(ApiResponse::success(
        attachments,
        "Attachments retrieved successfully",
    )))
}

/// GET /api/tickets/{ticket_id}/attachments/{attachment_id}
///
/// Metadata only; see `download_attachment` for the bytes.
pub async fn get_attachment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((ticket_id, attachment_id)): Path<(i64, i64)>,
) -> ApiResult<Json<ApiResponse<ticket_attachment::Model>>> {
    let attachment = AttachmentService::get(state.db(), &user.0, ticket_id, attachment_id).await?;
    Ok(Json(ApiResponse::success(
        attachment,
        "Attachment retrieved successfully",
    )))
}

/// Quotes and backslashes would break the header's quoted-string.
fn disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

/// GET /api/tickets/{ticket_id}/attachments/{attachment_id}/download
///
/// Streams the stored file with its original name.
///
/// ### Responses
/// - `200 OK` with the file body
/// - `404 Not Found` when the row or the file on disk is missing
pub async fn download_attachment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((ticket_id, attachment_id)): Path<(i64, i64)>,
) -> ApiResult<Response> {
    let (attachment, path) = AttachmentService::open(
        state.db(),
        state.uploads_root(),
        &user.0,
        ticket_id,
        attachment_id,
    )
    .await?;

    let file = File::open(&path)
        .await
        .map_err(|e| ApiError(services::ServiceError::Io(e)))?;
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, attachment.mime_type.clone()),
            (CONTENT_DISPOSITION, disposition(&attachment.original_name)),
            (CONTENT_LENGTH, attachment.size_bytes.to_string()),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::disposition;

    #[test]
    fn disposition_escapes_quotes() {
        assert_eq!(
            disposition("re\"port.pdf"),
            "attachment; filename=\"re_port.pdf\""
        );
    }
}
