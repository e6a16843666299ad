use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::{Json, extract::State};
use services::analytics_service::{
    AnalyticsService, SlaPerformance, TeamMemberStatus, TicketMetrics, WorkloadSummary,
};

/// GET /api/analytics/metrics
///
/// Open and critical-open counts, per-status counts, and the average
/// resolution time over the last 30 days.
pub async fn get_metrics(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<TicketMetrics>>> {
    let metrics = AnalyticsService::ticket_metrics(state.db()).await?;
    Ok(Json(ApiResponse::success(
        metrics,
        "Metrics retrieved successfully",
    )))
}

/// GET /api/analytics/team-status
///
/// Each IT staff member and manager with their active ticket count; more
/// than three marks them `busy`.
pub async fn get_team_status(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<TeamMemberStatus>>>> {
    let team = AnalyticsService::team_status(state.db()).await?;
    Ok(Json(ApiResponse::success(
        team,
        "Team status retrieved successfully",
    )))
}

/// GET /api/analytics/workload
pub async fn get_workload(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<WorkloadSummary>>> {
    let workload = AnalyticsService::workload(state.db()).await?;
    Ok(Json(ApiResponse::success(
        workload,
        "Workload retrieved successfully",
    )))
}

/// GET /api/analytics/sla-performance
pub async fn get_sla_performance(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<SlaPerformance>>> {
    let sla = AnalyticsService::sla_performance(state.db()).await?;
    Ok(Json(ApiResponse::success(
        sla,
        "SLA performance retrieved successfully",
    )))
}
