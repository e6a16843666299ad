use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use services::ticket_service::TicketService;

/// DELETE /api/tickets/{ticket_id}
///
/// Owners may delete their own ticket while it is still `new`; staff may
/// delete any ticket. Comments, attachment rows and stored files go with it.
///
/// ### Responses
/// - `200 OK`
/// - `403 Forbidden`
/// - `404 Not Found`
pub async fn delete_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Empty>>> {
    TicketService::delete(state.db(), state.uploads_root(), &user.0, ticket_id).await?;
    Ok(Json(ApiResponse::success(
        Empty::default(),
        "Ticket deleted successfully",
    )))
}
