//! # analytics Routes Module
//!
//! Dashboard aggregates for staff. Computed on every request.

pub mod get;

use crate::state::AppState;
use axum::{Router, routing::get};

/// Builds the `/analytics` route group.
///
/// - `GET /analytics/metrics` → `get_metrics`
/// - `GET /analytics/team-status` → `get_team_status`
/// - `GET /analytics/workload` → `get_workload`
/// - `GET /analytics/sla-performance` → `get_sla_performance`
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(get::get_metrics))
        .route("/team-status", get(get::get_team_status))
        .route("/workload", get(get::get_workload))
        .route("/sla-performance", get(get::get_sla_performance))
}
