use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use services::notification_service::{Notification, NotificationService};

/// PATCH /api/notifications/{notification_id}/read
///
/// ### Responses
/// - `200 OK` with the notification
/// - `404 Not Found` (unknown id or someone else's notification)
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Notification>>> {
    let item = NotificationService::mark_read(state.db(), &user.0, notification_id).await?;
    Ok(Json(ApiResponse::success(
        item,
        "Notification marked as read",
    )))
}

#[derive(Debug, Serialize)]
pub struct MarkedCount {
    pub updated: u64,
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ApiResponse<MarkedCount>>> {
    let updated = NotificationService::mark_all_read(state.db(), &user.0).await?;
    Ok(Json(ApiResponse::success(
        MarkedCount { updated },
        "All notifications marked as read",
    )))
}
