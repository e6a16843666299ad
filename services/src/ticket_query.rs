//! Turns raw list parameters into a scoped `TicketFilter`.

use crate::error::ServiceError;
use crate::policy::{Actor, Capability};
use db::filters::{DEFAULT_LIMIT, MAX_LIMIT, SortOrder, TicketFilter, TicketSortField};
use db::models::ticket::{TicketCategory, TicketPriority, TicketStatus};
use serde::Deserialize;
use std::str::FromStr;

/// Query-string parameters accepted by the ticket list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub assigned_to_id: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

fn parse_enum<T: FromStr>(field: &str, raw: Option<&str>) -> Result<Option<T>, ServiceError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => T::from_str(value)
            .map(Some)
            .map_err(|_| ServiceError::validation(format!("Invalid {field} '{value}'"))),
    }
}

fn parse_sort_field(raw: Option<&str>) -> Result<TicketSortField, ServiceError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(TicketSortField::default()),
        Some("createdAt" | "created_at") => Ok(TicketSortField::CreatedAt),
        Some("updatedAt" | "updated_at") => Ok(TicketSortField::UpdatedAt),
        Some("priority") => Ok(TicketSortField::Priority),
        Some("status") => Ok(TicketSortField::Status),
        Some(other) => Err(ServiceError::validation(format!(
            "Invalid sortBy '{other}'"
        ))),
    }
}

fn parse_sort_order(raw: Option<&str>) -> Result<SortOrder, ServiceError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(SortOrder::default()),
        Some("asc") => Ok(SortOrder::Asc),
        Some("desc") => Ok(SortOrder::Desc),
        Some(other) => Err(ServiceError::validation(format!(
            "Invalid sortOrder '{other}'"
        ))),
    }
}

/// Normalises list parameters for `actor`.
///
/// Callers without `ViewAllTickets` are pinned to their own tickets and any
/// assignee filter they sent is discarded.
pub fn build_ticket_filter(
    actor: &Actor,
    params: &TicketListParams,
) -> Result<TicketFilter, ServiceError> {
    let sees_all = actor.can(Capability::ViewAllTickets);

    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    Ok(TicketFilter {
        created_by_id: if sees_all { None } else { Some(actor.id) },
        assigned_to_id: if sees_all { params.assigned_to_id } else { None },
        status: parse_enum::<TicketStatus>("status", params.status.as_deref())?,
        priority: parse_enum::<TicketPriority>("priority", params.priority.as_deref())?,
        category: parse_enum::<TicketCategory>("category", params.category.as_deref())?,
        search,
        sort_by: parse_sort_field(params.sort_by.as_deref())?,
        sort_order: parse_sort_order(params.sort_order.as_deref())?,
        limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        offset: params.offset.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::models::user::Role;

    fn actor(role: Role) -> Actor {
        Actor::new(7, role, "a@example.com")
    }

    #[test]
    fn end_user_is_pinned_to_own_tickets() {
        let params = TicketListParams {
            assigned_to_id: Some(99),
            ..Default::default()
        };
        let f = build_ticket_filter(&actor(Role::EndUser), &params).unwrap();
        assert_eq!(f.created_by_id, Some(7));
        assert_eq!(f.assigned_to_id, None);
    }

    #[test]
    fn staff_keep_assignee_filter_and_see_everyone() {
        let params = TicketListParams {
            assigned_to_id: Some(99),
            ..Default::default()
        };
        for role in Role::staff_roles() {
            let f = build_ticket_filter(&actor(role), &params).unwrap();
            assert_eq!(f.created_by_id, None);
            assert_eq!(f.assigned_to_id, Some(99));
        }
    }

    #[test]
    fn defaults_are_newest_first_fifty_per_page() {
        let f = build_ticket_filter(&actor(Role::ItStaff), &TicketListParams::default()).unwrap();
        assert_eq!(f.sort_by, TicketSortField::CreatedAt);
        assert_eq!(f.sort_order, SortOrder::Desc);
        assert_eq!(f.limit, 50);
        assert_eq!(f.offset, 0);
        assert_eq!(f.search, None);
    }

    #[test]
    fn limit_is_capped_and_search_normalised() {
        let params = TicketListParams {
            limit: Some(500),
            search: Some("  VPN Issue ".into()),
            sort_by: Some("priority".into()),
            sort_order: Some("ASC".into()),
            ..Default::default()
        };
        let f = build_ticket_filter(&actor(Role::Manager), &params).unwrap();
        assert_eq!(f.limit, 100);
        assert_eq!(f.search.as_deref(), Some("vpn issue"));
        assert_eq!(f.sort_by, TicketSortField::Priority);
        assert_eq!(f.sort_order, SortOrder::Asc);
    }

    #[test]
    fn blank_search_is_ignored() {
        let params = TicketListParams {
            search: Some("   ".into()),
            ..Default::default()
        };
        let f = build_ticket_filter(&actor(Role::EndUser), &params).unwrap();
        assert_eq!(f.search, None);
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        let params = TicketListParams {
            status: Some("archived".into()),
            ..Default::default()
        };
        let err = build_ticket_filter(&actor(Role::Admin), &params).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let params = TicketListParams {
            sort_by: Some("title".into()),
            ..Default::default()
        };
        assert!(build_ticket_filter(&actor(Role::Admin), &params).is_err());
    }

    #[test]
    fn enum_filters_parse() {
        let params = TicketListParams {
            status: Some("in_progress".into()),
            priority: Some("critical".into()),
            category: Some("network".into()),
            ..Default::default()
        };
        let f = build_ticket_filter(&actor(Role::ItStaff), &params).unwrap();
        assert_eq!(f.status, Some(TicketStatus::InProgress));
        assert_eq!(f.priority, Some(TicketPriority::Critical));
        assert_eq!(f.category, Some(TicketCategory::Network));
    }
}
