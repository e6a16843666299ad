use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::{JsonBody, parse_enum, parse_optional_enum, validate};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use db::models::ticket::{self, TicketPriority};
use serde::Deserialize;
use services::ticket_service::{CreateTicket, TicketService};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub category: String,
    pub priority: Option<String>,
    #[validate(length(max = 50, message = "Contact phone is too long"))]
    pub contact_phone: Option<String>,
    pub contact_preference: Option<String>,
    pub best_time_to_contact: Option<String>,
    #[validate(length(max = 200, message = "Location is too long"))]
    pub location: Option<String>,
}

/// POST /api/tickets
///
/// Any signed-in user may open a ticket; it starts in status `new` and is
/// owned by the caller.
///
/// ### Request Body
/// ```json
/// {
///   "title": "Laptop will not boot",
///   "description": "Black screen after the logo",
///   "category": "hardware",
///   "priority": "high",
///   "contactPreference": "phone",
///   "contactPhone": "555-0100"
/// }
/// ```
///
/// ### Responses
/// - `201 Created` with the ticket
/// - `400 Bad Request` (`VALIDATION_ERROR`)
pub async fn create_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<CreateTicketRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ticket::Model>>)> {
    validate(&req)?;
    let created = TicketService::create(
        state.db(),
        state.outbox(),
        &user.0,
        CreateTicket {
            title: req.title,
            description: req.description,
            category: parse_enum("category", &req.category)?,
            priority: parse_optional_enum("priority", req.priority.as_deref())?
                .unwrap_or(TicketPriority::Medium),
            contact_phone: req.contact_phone,
            contact_preference: req.contact_preference,
            best_time_to_contact: req.best_time_to_contact,
            location: req.location,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created, "Ticket created successfully")),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    /// `null` (or omitted) clears the assignee.
    #[serde(default)]
    pub assigned_to_id: Option<i64>,
}

/// POST /api/tickets/{ticket_id}/assign
///
/// Staff only. Assigning a `new` ticket moves it to `in_progress`.
///
/// ### Request Body
/// ```json
/// { "assignedToId": 7 }
/// ```
///
/// ### Responses
/// - `200 OK` with the updated ticket
/// - `400 Bad Request` with `INVALID_ASSIGNEE` when the target is not active
///   staff (the ticket is left unchanged)
/// - `403 Forbidden` for end users
pub async fn assign_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<i64>,
    JsonBody(req): JsonBody<AssignRequest>,
) -> ApiResult<Json<ApiResponse<ticket::Model>>> {
    let updated = TicketService::assign(
        state.db(),
        state.outbox(),
        &user.0,
        ticket_id,
        req.assigned_to_id,
    )
    .await?;
    let message = if updated.assigned_to.is_some() {
        "Ticket assigned successfully"
    } else {
        "Ticket unassigned successfully"
    };
    Ok(Json(ApiResponse::success(updated, message)))
}
