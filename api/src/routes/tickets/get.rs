use super::common::{CommentResponse, TicketDetailResponse, TicketListResponse};
use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use services::comment_service::CommentService;
use services::ticket_query::TicketListParams;
use services::ticket_service::TicketService;

/// GET /api/tickets
///
/// Lists tickets visible to the caller. End users only ever see their own
/// tickets; any `assignedToId` they send is ignored.
///
/// ### Query Parameters
/// - `status`, `priority`, `category`: exact match
/// - `assignedToId`: staff only
/// - `search`: case-insensitive substring of title or description
/// - `sortBy`: `createdAt` (default), `updatedAt`, `priority`, `status`
/// - `sortOrder`: `asc` or `desc` (default)
/// - `limit` (default 50, max 100), `offset` (default 0)
///
/// ### Responses
/// - `200 OK` with `{ tickets, total, limit, offset }`
/// - `400 Bad Request` for unknown enum or sort values
pub async fn list_tickets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<TicketListParams>,
) -> ApiResult<Json<ApiResponse<TicketListResponse>>> {
    let page = TicketService::list(state.db(), &user.0, &params).await?;
    Ok(Json(ApiResponse::success(
        TicketListResponse {
            tickets: page.tickets,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        },
        "Tickets retrieved successfully",
    )))
}

/// GET /api/tickets/{ticket_id}
///
/// Ticket with its comments (internal notes hidden from end users) and
/// attachment metadata.
///
/// ### Responses
/// - `200 OK`
/// - `403 Forbidden` (someone else's ticket)
/// - `404 Not Found`
pub async fn get_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<TicketDetailResponse>>> {
    let detail = TicketService::detail(state.db(), &user.0, ticket_id).await?;
    let comments = CommentService::with_authors(state.db(), detail.comments)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();
    Ok(Json(ApiResponse::success(
        TicketDetailResponse {
            ticket: detail.ticket,
            comments,
            attachments: detail.attachments,
        },
        "Ticket retrieved successfully",
    )))
}
