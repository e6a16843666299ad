use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use services::notification_service::{Notification, NotificationService};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// GET /api/notifications?unreadOnly=true
///
/// Newest first, at most 100.
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Notification>>>> {
    let items = NotificationService::list(state.db(), &user.0, query.unread_only).await?;
    Ok(Json(ApiResponse::success(
        items,
        "Notifications retrieved successfully",
    )))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: u64,
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ApiResponse<UnreadCount>>> {
    let count = NotificationService::unread_count(state.db(), &user.0).await?;
    Ok(Json(ApiResponse::success(
        UnreadCount { count },
        "Unread count retrieved successfully",
    )))
}
