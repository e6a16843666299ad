use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::{JsonBody, parse_optional_enum, validate};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use db::models::ticket;
use serde::Deserialize;
use services::ticket_service::{TicketService, UpdateTicket};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_preference: Option<String>,
    pub best_time_to_contact: Option<String>,
    pub location: Option<String>,
}

/// PATCH /api/tickets/{ticket_id}
///
/// Staff only. Status changes follow the lifecycle table; moving to
/// `resolved` stamps `resolvedAt`.
///
/// ### Request Body
/// ```json
/// { "status": "resolved", "priority": "low" }
/// ```
///
/// ### Responses
/// - `200 OK` with the updated ticket
/// - `400 Bad Request` with `INVALID_TRANSITION` or `VALIDATION_ERROR`
/// - `403 Forbidden` for end users
/// - `404 Not Found`
pub async fn update_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<i64>,
    JsonBody(req): JsonBody<UpdateTicketRequest>,
) -> ApiResult<Json<ApiResponse<ticket::Model>>> {
    validate(&req)?;
    let changes = UpdateTicket {
        category: parse_optional_enum("category", req.category.as_deref())?,
        priority: parse_optional_enum("priority", req.priority.as_deref())?,
        status: parse_optional_enum("status", req.status.as_deref())?,
        title: req.title,
        description: req.description,
        contact_phone: req.contact_phone,
        contact_preference: req.contact_preference,
        best_time_to_contact: req.best_time_to_contact,
        location: req.location,
    };
    let updated =
        TicketService::update(state.db(), state.outbox(), &user.0, ticket_id, changes).await?;
    Ok(Json(ApiResponse::success(
        updated,
        "Ticket updated successfully",
    )))
}
