//! Normalised query filters applied to entity selects.

use crate::models::ticket::{self, TicketCategory, TicketPriority, TicketStatus};
use crate::models::user::{self, Role};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, Condition, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Select};

pub const DEFAULT_LIMIT: u64 = 50;
pub const MAX_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TicketSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Priority,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl From<SortOrder> for Order {
    fn from(o: SortOrder) -> Self {
        match o {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// Fully resolved ticket list query. Visibility scoping happens before this is
/// built; this type only describes what to select.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketFilter {
    pub created_by_id: Option<i64>,
    pub assigned_to_id: Option<i64>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<TicketCategory>,
    /// Lowercased, trimmed, non-empty.
    pub search: Option<String>,
    pub sort_by: TicketSortField,
    pub sort_order: SortOrder,
    pub limit: u64,
    pub offset: u64,
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self {
            created_by_id: None,
            assigned_to_id: None,
            status: None,
            priority: None,
            category: None,
            search: None,
            sort_by: TicketSortField::default(),
            sort_order: SortOrder::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Lowercases a search term and escapes LIKE wildcards.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn lower_like(col: impl sea_orm::sea_query::IntoColumnRef, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(
        sea_orm::sea_query::LikeExpr::new(pattern).escape('\\'),
    )
}

impl TicketFilter {
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(id) = self.created_by_id {
            cond = cond.add(ticket::Column::CreatedBy.eq(id));
        }
        if let Some(id) = self.assigned_to_id {
            cond = cond.add(ticket::Column::AssignedTo.eq(id));
        }
        if let Some(status) = self.status {
            cond = cond.add(ticket::Column::Status.eq(status));
        }
        if let Some(priority) = self.priority {
            cond = cond.add(ticket::Column::Priority.eq(priority));
        }
        if let Some(category) = self.category {
            cond = cond.add(ticket::Column::Category.eq(category));
        }
        if let Some(term) = &self.search {
            let pattern = like_pattern(term);
            cond = cond.add(
                Condition::any()
                    .add(lower_like(ticket::Column::Title, &pattern))
                    .add(lower_like(ticket::Column::Description, &pattern)),
            );
        }
        cond
    }

    /// Filtered select without ordering or paging, for counting.
    pub fn select(&self) -> Select<ticket::Entity> {
        ticket::Entity::find().filter(self.condition())
    }

    /// Filtered, ordered and paged select.
    pub fn paged_select(&self) -> Select<ticket::Entity> {
        let order: Order = self.sort_order.into();
        let query = self.select();
        let query = match self.sort_by {
            TicketSortField::CreatedAt => query.order_by(ticket::Column::CreatedAt, order.clone()),
            TicketSortField::UpdatedAt => query.order_by(ticket::Column::UpdatedAt, order.clone()),
            TicketSortField::Priority => query.order_by(
                Expr::cust(
                    "CASE priority WHEN 'critical' THEN 4 WHEN 'high' THEN 3 \
                     WHEN 'medium' THEN 2 ELSE 1 END",
                ),
                order.clone(),
            ),
            TicketSortField::Status => query.order_by(
                Expr::cust(
                    "CASE status WHEN 'new' THEN 1 WHEN 'in_progress' THEN 2 \
                     WHEN 'pending' THEN 3 WHEN 'resolved' THEN 4 ELSE 5 END",
                ),
                order.clone(),
            ),
        };
        query
            .order_by(ticket::Column::Id, order)
            .limit(self.limit)
            .offset(self.offset)
    }
}

/// Filters for the user directory.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

impl UserFilter {
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(role) = self.role {
            cond = cond.add(user::Column::Role.eq(role));
        }
        if let Some(active) = self.is_active {
            cond = cond.add(user::Column::IsActive.eq(active));
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            cond = cond.add(
                Condition::any()
                    .add(lower_like(user::Column::Email, &pattern))
                    .add(lower_like(user::Column::FirstName, &pattern))
                    .add(lower_like(user::Column::LastName, &pattern)),
            );
        }
        cond
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::{Model as TicketModel, NewTicket};
    use crate::models::user::Model as UserModel;
    use crate::test_utils::setup_test_db;
    use sea_orm::{DatabaseConnection, PaginatorTrait};

    async fn ticket(db: &DatabaseConnection, owner: i64, title: &str, priority: TicketPriority) -> TicketModel {
        TicketModel::create(
            db,
            NewTicket {
                title: title.into(),
                description: format!("{title} details"),
                category: TicketCategory::Software,
                priority,
                created_by: owner,
                contact_phone: None,
                contact_preference: None,
                best_time_to_contact: None,
                location: None,
            },
        )
        .await
        .unwrap()
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_Off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_description() {
        let db = setup_test_db().await;
        let u = UserModel::create(&db, "s@example.com", "S", "T", Role::EndUser, "password1")
            .await
            .unwrap();
        ticket(&db, u.id, "VPN drops", TicketPriority::Low).await;
        ticket(&db, u.id, "Printer jam", TicketPriority::Low).await;

        let filter = TicketFilter {
            search: Some("vpn".into()),
            ..Default::default()
        };
        let found = filter.paged_select().all(&db).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "VPN drops");

        let by_desc = TicketFilter {
            search: Some("JAM DETAILS".into()),
            ..Default::default()
        };
        assert_eq!(by_desc.select().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn priority_sort_uses_severity_not_alphabet() {
        let db = setup_test_db().await;
        let u = UserModel::create(&db, "p@example.com", "P", "Q", Role::EndUser, "password1")
            .await
            .unwrap();
        ticket(&db, u.id, "a", TicketPriority::Medium).await;
        ticket(&db, u.id, "b", TicketPriority::Critical).await;
        ticket(&db, u.id, "c", TicketPriority::Low).await;
        ticket(&db, u.id, "d", TicketPriority::High).await;

        let filter = TicketFilter {
            sort_by: TicketSortField::Priority,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        let order: Vec<_> = filter
            .paged_select()
            .all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.priority)
            .collect();
        assert_eq!(
            order,
            vec![
                TicketPriority::Critical,
                TicketPriority::High,
                TicketPriority::Medium,
                TicketPriority::Low
            ]
        );
    }

    #[tokio::test]
    async fn limit_and_offset_page_results() {
        let db = setup_test_db().await;
        let u = UserModel::create(&db, "l@example.com", "L", "M", Role::EndUser, "password1")
            .await
            .unwrap();
        for i in 0..5 {
            ticket(&db, u.id, &format!("t{i}"), TicketPriority::Low).await;
        }
        let filter = TicketFilter {
            sort_order: SortOrder::Asc,
            limit: 2,
            offset: 2,
            ..Default::default()
        };
        let page = filter.paged_select().all(&db).await.unwrap();
        let titles: Vec<_> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["t2", "t3"]);
        assert_eq!(filter.select().count(&db).await.unwrap(), 5);
    }
}
