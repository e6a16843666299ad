//! Dashboard aggregates, computed per request from the ticket table.

use crate::error::ServiceResult;
use chrono::{DateTime, Duration, Utc};
use db::models::ticket::{self, TicketPriority, TicketStatus};
use db::models::user::{self, Role};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Iterable, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use sea_orm::sea_query::Expr;
use serde::Serialize;
use std::collections::HashMap;

/// Trailing window for resolution-time and SLA figures.
pub const WINDOW_DAYS: i64 = 30;
/// More active tickets than this marks a team member busy.
pub const BUSY_THRESHOLD: u64 = 3;
pub const OVERLOADED_ABOVE: f64 = 80.0;
pub const UNDERUTILIZED_BELOW: f64 = 20.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketMetrics {
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub critical_open: u64,
    pub unassigned_open: u64,
    pub resolved_last_30_days: u64,
    pub avg_resolution_hours: f64,
    pub by_status: HashMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberStatus {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub active_tickets: u64,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadEntry {
    pub user_id: i64,
    pub name: String,
    pub assigned: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSummary {
    pub total_active: u64,
    pub staff: Vec<WorkloadEntry>,
    pub overloaded: usize,
    pub underutilized: usize,
    pub balanced: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlaPriorityStats {
    pub priority: TicketPriority,
    pub target_hours: i64,
    pub met: u64,
    pub breached: u64,
    pub compliance: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlaPerformance {
    pub window_days: i64,
    pub total_resolved: u64,
    pub met: u64,
    pub breached: u64,
    pub compliance_percentage: f64,
    pub by_priority: Vec<SlaPriorityStats>,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn resolution_hours(t: &ticket::Model) -> Option<f64> {
    t.resolved_at
        .map(|r| (r - t.created_at).num_seconds().max(0) as f64 / 3600.0)
}

/// Mean hours from creation to resolution; 0 when nothing was resolved.
pub fn average_resolution_hours(resolved: &[ticket::Model]) -> f64 {
    let hours: Vec<f64> = resolved.iter().filter_map(resolution_hours).collect();
    if hours.is_empty() {
        return 0.0;
    }
    round1(hours.iter().sum::<f64>() / hours.len() as f64)
}

/// A member's share of all active tickets, clamped to [0, 100].
pub fn workload_percentage(assigned: u64, total_active: u64) -> f64 {
    let pct = assigned as f64 / total_active.max(1) as f64 * 100.0;
    round1(pct.clamp(0.0, 100.0))
}

pub fn compute_workload(staff: &[(user::Model, u64)], total_active: u64) -> WorkloadSummary {
    let entries: Vec<WorkloadEntry> = staff
        .iter()
        .map(|(u, assigned)| WorkloadEntry {
            user_id: u.id,
            name: u.full_name(),
            assigned: *assigned,
            percentage: workload_percentage(*assigned, total_active),
        })
        .collect();

    let overloaded = entries
        .iter()
        .filter(|e| e.percentage > OVERLOADED_ABOVE)
        .count();
    let underutilized = entries
        .iter()
        .filter(|e| e.percentage < UNDERUTILIZED_BELOW)
        .count();
    let balanced = entries.len() - overloaded - underutilized;

    WorkloadSummary {
        total_active,
        staff: entries,
        overloaded,
        underutilized,
        balanced,
    }
}

fn compliance(met: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        round1(met as f64 / total as f64 * 100.0)
    }
}

/// SLA outcome of tickets resolved inside the window.
pub fn compute_sla(resolved: &[ticket::Model]) -> SlaPerformance {
    let mut by_priority: Vec<SlaPriorityStats> = [
        TicketPriority::Critical,
        TicketPriority::High,
        TicketPriority::Medium,
        TicketPriority::Low,
    ]
    .into_iter()
    .map(|p| SlaPriorityStats {
        priority: p,
        target_hours: p.sla_target_hours(),
        met: 0,
        breached: 0,
        compliance: 100.0,
    })
    .collect();

    for t in resolved {
        let Some(hours) = resolution_hours(t) else {
            continue;
        };
        if let Some(stats) = by_priority.iter_mut().find(|s| s.priority == t.priority) {
            if hours <= stats.target_hours as f64 {
                stats.met += 1;
            } else {
                stats.breached += 1;
            }
        }
    }
    for stats in &mut by_priority {
        stats.compliance = compliance(stats.met, stats.met + stats.breached);
    }

    let met: u64 = by_priority.iter().map(|s| s.met).sum();
    let breached: u64 = by_priority.iter().map(|s| s.breached).sum();
    SlaPerformance {
        window_days: WINDOW_DAYS,
        total_resolved: met + breached,
        met,
        breached,
        compliance_percentage: compliance(met, met + breached),
        by_priority,
    }
}

pub struct AnalyticsService;

impl AnalyticsService {
    async fn resolved_since(
        db: &DatabaseConnection,
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<ticket::Model>> {
        Ok(ticket::Entity::find()
            .filter(ticket::Column::ResolvedAt.is_not_null())
            .filter(ticket::Column::ResolvedAt.gte(since))
            .all(db)
            .await?)
    }

    /// Every it_staff and manager account. Deactivated ones stay listed so
    /// the tickets they still hold are accounted for.
    async fn team_members(db: &DatabaseConnection) -> ServiceResult<Vec<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Role.is_in([Role::ItStaff, Role::Manager]))
            .order_by_asc(user::Column::FirstName)
            .order_by_asc(user::Column::LastName)
            .all(db)
            .await?)
    }

    /// Active tickets per assignee.
    async fn active_counts(db: &DatabaseConnection) -> ServiceResult<HashMap<i64, u64>> {
        let rows: Vec<(i64, i64)> = ticket::Entity::find()
            .select_only()
            .column(ticket::Column::AssignedTo)
            .column_as(Expr::col(ticket::Column::Id).count(), "count")
            .filter(ticket::Column::AssignedTo.is_not_null())
            .filter(ticket::Column::Status.is_in(TicketStatus::active_statuses()))
            .group_by(ticket::Column::AssignedTo)
            .into_tuple()
            .all(db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, n)| (id, n.max(0) as u64))
            .collect())
    }

    async fn active_total(db: &DatabaseConnection) -> ServiceResult<u64> {
        Ok(ticket::Entity::find()
            .filter(ticket::Column::Status.is_in(TicketStatus::active_statuses()))
            .count(db)
            .await?)
    }

    pub async fn ticket_metrics(db: &DatabaseConnection) -> ServiceResult<TicketMetrics> {
        let mut by_status = HashMap::new();
        let mut total = 0;
        for status in TicketStatus::iter() {
            let n = ticket::Entity::find()
                .filter(ticket::Column::Status.eq(status))
                .count(db)
                .await?;
            total += n;
            by_status.insert(status.to_string(), n);
        }

        let active = ticket::Column::Status.is_in(TicketStatus::active_statuses());
        let critical_open = ticket::Entity::find()
            .filter(active.clone())
            .filter(ticket::Column::Priority.eq(TicketPriority::Critical))
            .count(db)
            .await?;
        let unassigned_open = ticket::Entity::find()
            .filter(active)
            .filter(ticket::Column::AssignedTo.is_null())
            .count(db)
            .await?;

        let resolved = Self::resolved_since(db, Utc::now() - Duration::days(WINDOW_DAYS)).await?;

        Ok(TicketMetrics {
            total_tickets: total,
            open_tickets: TicketStatus::active_statuses()
                .iter()
                .map(|s| by_status.get(&s.to_string()).copied().unwrap_or(0))
                .sum(),
            critical_open,
            unassigned_open,
            resolved_last_30_days: resolved.len() as u64,
            avg_resolution_hours: average_resolution_hours(&resolved),
            by_status,
        })
    }

    pub async fn team_status(db: &DatabaseConnection) -> ServiceResult<Vec<TeamMemberStatus>> {
        let counts = Self::active_counts(db).await?;
        Ok(Self::team_members(db)
            .await?
            .into_iter()
            .map(|u| {
                let active = counts.get(&u.id).copied().unwrap_or(0);
                TeamMemberStatus {
                    user_id: u.id,
                    name: u.full_name(),
                    email: u.email,
                    role: u.role,
                    is_active: u.is_active,
                    active_tickets: active,
                    status: if active > BUSY_THRESHOLD {
                        "busy"
                    } else {
                        "available"
                    },
                }
            })
            .collect())
    }

    pub async fn workload(db: &DatabaseConnection) -> ServiceResult<WorkloadSummary> {
        let counts = Self::active_counts(db).await?;
        let total = Self::active_total(db).await?;
        let staff: Vec<(user::Model, u64)> = Self::team_members(db)
            .await?
            .into_iter()
            .map(|u| {
                let n = counts.get(&u.id).copied().unwrap_or(0);
                (u, n)
            })
            .collect();
        Ok(compute_workload(&staff, total))
    }

    pub async fn sla_performance(db: &DatabaseConnection) -> ServiceResult<SlaPerformance> {
        let resolved = Self::resolved_since(db, Utc::now() - Duration::days(WINDOW_DAYS)).await?;
        Ok(compute_sla(&resolved))
    }
}
