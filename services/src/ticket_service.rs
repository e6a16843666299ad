use crate::error::{ServiceError, ServiceResult};
use crate::outbox::{DomainEvent, Outbox};
use crate::policy::{self, Actor};
use crate::ticket_query::{TicketListParams, build_ticket_filter};
use chrono::Utc;
use db::models::{
    ticket::{self, NewTicket, TicketCategory, TicketPriority, TicketStatus},
    ticket_attachment, ticket_comment, user,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use std::path::Path;
use util::paths;

pub use db::models::ticket::Model as Ticket;

#[derive(Debug, Clone)]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub contact_phone: Option<String>,
    pub contact_preference: Option<String>,
    pub best_time_to_contact: Option<String>,
    pub location: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<TicketCategory>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    pub contact_phone: Option<String>,
    pub contact_preference: Option<String>,
    pub best_time_to_contact: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub comments: Vec<ticket_comment::Model>,
    pub attachments: Vec<ticket_attachment::Model>,
}

fn non_blank(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub struct TicketService;

impl TicketService {
    pub async fn create(
        db: &DatabaseConnection,
        outbox: &dyn Outbox,
        actor: &Actor,
        req: CreateTicket,
    ) -> ServiceResult<Ticket> {
        let ticket = ticket::Model::create(
            db,
            NewTicket {
                title: non_blank("Title", &req.title)?,
                description: non_blank("Description", &req.description)?,
                category: req.category,
                priority: req.priority,
                created_by: actor.id,
                contact_phone: optional(req.contact_phone),
                contact_preference: optional(req.contact_preference),
                best_time_to_contact: optional(req.best_time_to_contact),
                location: optional(req.location),
            },
        )
        .await?;

        tracing::info!(ticket_id = ticket.id, user_id = actor.id, "ticket created");
        outbox
            .publish(DomainEvent::TicketCreated {
                ticket: ticket.clone(),
            })
            .await;
        Ok(ticket)
    }

    pub async fn list(
        db: &DatabaseConnection,
        actor: &Actor,
        params: &TicketListParams,
    ) -> ServiceResult<TicketPage> {
        let filter = build_ticket_filter(actor, params)?;
        let total = filter.select().count(db).await?;
        let tickets = filter.paged_select().all(db).await?;
        Ok(TicketPage {
            tickets,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    /// Loads a ticket the actor may see: 404 when missing, 403 when not theirs.
    pub async fn get_visible(
        db: &DatabaseConnection,
        actor: &Actor,
        ticket_id: i64,
    ) -> ServiceResult<Ticket> {
        let ticket = ticket::Entity::find_by_id(ticket_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Ticket {ticket_id} not found")))?;
        if !policy::can_list_ticket(actor, &ticket) {
            return Err(ServiceError::forbidden("You do not have access to this ticket"));
        }
        Ok(ticket)
    }

    pub async fn detail(
        db: &DatabaseConnection,
        actor: &Actor,
        ticket_id: i64,
    ) -> ServiceResult<TicketDetail> {
        let ticket = Self::get_visible(db, actor, ticket_id).await?;
        let comments = ticket_comment::Model::for_ticket(
            db,
            ticket.id,
            policy::can_view_internal_comments(actor),
        )
        .await?;
        let attachments = ticket_attachment::Model::for_ticket(db, ticket.id).await?;
        Ok(TicketDetail {
            ticket,
            comments,
            attachments,
        })
    }

    /// Staff-only edit. Status changes follow the lifecycle table; entering
    /// `resolved` stamps `resolved_at`.
    pub async fn update(
        db: &DatabaseConnection,
        outbox: &dyn Outbox,
        actor: &Actor,
        ticket_id: i64,
        req: UpdateTicket,
    ) -> ServiceResult<Ticket> {
        if !policy::can_mutate_ticket_status(actor) {
            return Err(ServiceError::forbidden("Only IT staff can update tickets"));
        }
        let current = Self::get_visible(db, actor, ticket_id).await?;
        let previous_status = current.status;
        let created_at = current.created_at;
        let mut active = current.into_active_model();

        if let Some(title) = req.title {
            active.title = Set(non_blank("Title", &title)?);
        }
        if let Some(description) = req.description {
            active.description = Set(non_blank("Description", &description)?);
        }
        if let Some(category) = req.category {
            active.category = Set(category);
        }
        if let Some(priority) = req.priority {
            active.priority = Set(priority);
        }
        if req.contact_phone.is_some() {
            active.contact_phone = Set(optional(req.contact_phone));
        }
        if req.contact_preference.is_some() {
            active.contact_preference = Set(optional(req.contact_preference));
        }
        if req.best_time_to_contact.is_some() {
            active.best_time_to_contact = Set(optional(req.best_time_to_contact));
        }
        if req.location.is_some() {
            active.location = Set(optional(req.location));
        }

        let now = Utc::now();
        if let Some(next) = req.status {
            if !previous_status.can_transition_to(next) {
                return Err(ServiceError::InvalidTransition(format!(
                    "Cannot move a ticket from {previous_status} to {next}"
                )));
            }
            if next != previous_status {
                active.status = Set(next);
                if next == TicketStatus::Resolved {
                    active.resolved_at = Set(Some(now.max(created_at)));
                }
            }
        }
        active.updated_at = Set(now);

        let ticket = active.update(db).await?;
        tracing::info!(
            ticket_id = ticket.id,
            user_id = actor.id,
            from = %previous_status,
            to = %ticket.status,
            "ticket updated"
        );
        outbox
            .publish(DomainEvent::TicketUpdated {
                ticket: ticket.clone(),
                previous_status,
                changed_by: actor.id,
            })
            .await;
        Ok(ticket)
    }

    /// Sets or clears the assignee. Assigning a `new` ticket starts work on it.
    pub async fn assign(
        db: &DatabaseConnection,
        outbox: &dyn Outbox,
        actor: &Actor,
        ticket_id: i64,
        assignee_id: Option<i64>,
    ) -> ServiceResult<Ticket> {
        if !policy::can_assign(actor) {
            return Err(ServiceError::forbidden("Only IT staff can assign tickets"));
        }
        let current = Self::get_visible(db, actor, ticket_id).await?;

        if let Some(id) = assignee_id {
            let assignee = user::Entity::find_by_id(id).one(db).await?.ok_or_else(|| {
                ServiceError::InvalidAssignee(format!("User {id} does not exist"))
            })?;
            policy::validate_assignee(&assignee)?;
        }

        let previous_assignee = current.assigned_to;
        let was_new = current.status == TicketStatus::New;
        let mut active = current.into_active_model();
        active.assigned_to = Set(assignee_id);
        if was_new && assignee_id.is_some() {
            active.status = Set(TicketStatus::InProgress);
        }
        active.updated_at = Set(Utc::now());
        let ticket = active.update(db).await?;

        tracing::info!(
            ticket_id = ticket.id,
            assignee = ?assignee_id,
            user_id = actor.id,
            "ticket assignment changed"
        );
        outbox
            .publish(DomainEvent::TicketAssigned {
                ticket: ticket.clone(),
                previous_assignee,
                assigned_by: actor.id,
            })
            .await;
        Ok(ticket)
    }

    /// Removes the ticket with its comments, attachment rows and files.
    pub async fn delete(
        db: &DatabaseConnection,
        uploads_root: &Path,
        actor: &Actor,
        ticket_id: i64,
    ) -> ServiceResult<()> {
        let ticket = Self::get_visible(db, actor, ticket_id).await?;
        if !policy::can_delete_ticket(actor, &ticket) {
            return Err(ServiceError::forbidden(
                "Only new tickets can be deleted by their owner",
            ));
        }

        let attachments = ticket_attachment::Model::for_ticket(db, ticket.id).await?;

        let txn = db.begin().await?;
        ticket_comment::Entity::delete_many()
            .filter(ticket_comment::Column::TicketId.eq(ticket.id))
            .exec(&txn)
            .await?;
        ticket_attachment::Entity::delete_many()
            .filter(ticket_attachment::Column::TicketId.eq(ticket.id))
            .exec(&txn)
            .await?;
        ticket::Entity::delete_by_id(ticket.id).exec(&txn).await?;
        txn.commit().await?;

        remove_attachment_files(uploads_root, &attachments).await;
        let dir = paths::ticket_dir(uploads_root, ticket.id);
        if let Err(err) = tokio::fs::remove_dir_all(&dir).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(dir = %dir.display(), error = %err, "failed to remove ticket directory");
            }
        }

        tracing::info!(ticket_id = ticket.id, user_id = actor.id, "ticket deleted");
        Ok(())
    }
}

/// Best-effort removal of stored files for already-deleted attachment rows.
pub(crate) async fn remove_attachment_files(
    uploads_root: &Path,
    attachments: &[ticket_attachment::Model],
) {
    for attachment in attachments {
        let Some(path) = paths::resolve_stored(uploads_root, &attachment.stored_path) else {
            continue;
        };
        if let Err(err) = tokio::fs::remove_file(&path).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    attachment_id = attachment.id,
                    path = %path.display(),
                    error = %err,
                    "failed to remove attachment file"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbox::MemoryOutbox;
    use crate::test_support::{make_ticket, make_user};
    use db::models::user::Role;
    use db::test_utils::setup_test_db;

    fn create_req(title: &str) -> CreateTicket {
        CreateTicket {
            title: title.into(),
            description: "It is broken".into(),
            category: TicketCategory::Software,
            priority: TicketPriority::High,
            contact_phone: Some("  ".into()),
            contact_preference: Some("email".into()),
            best_time_to_contact: None,
            location: Some("Room 4".into()),
        }
    }

    #[tokio::test]
    async fn create_starts_new_unassigned_and_publishes() {
        let db = setup_test_db().await;
        let outbox = MemoryOutbox::new();
        let (_, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;

        let t = TicketService::create(&db, &outbox, &alice, create_req("  Laptop  "))
            .await
            .unwrap();

        assert_eq!(t.title, "Laptop");
        assert_eq!(t.status, TicketStatus::New);
        assert_eq!(t.created_by, alice.id);
        assert_eq!(t.assigned_to, None);
        assert_eq!(t.resolved_at, None);
        assert_eq!(t.contact_phone, None);
        assert_eq!(outbox.names(), vec!["ticket_created"]);
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let db = setup_test_db().await;
        let (_, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let err = TicketService::create(&db, &MemoryOutbox::new(), &alice, create_req("   "))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn end_user_lists_exactly_their_own_tickets() {
        let db = setup_test_db().await;
        let (a, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let (b, bob) = make_user(&db, "bob@example.com", Role::EndUser).await;
        let (_, staff) = make_user(&db, "staff@example.com", Role::ItStaff).await;
        for i in 0..3 {
            make_ticket(&db, a.id, &format!("a{i}")).await;
        }
        make_ticket(&db, b.id, "b0").await;

        let page = TicketService::list(&db, &alice, &TicketListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert!(page.tickets.iter().all(|t| t.created_by == a.id));

        let page = TicketService::list(&db, &bob, &TicketListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        let page = TicketService::list(&db, &staff, &TicketListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 4);
    }

    #[tokio::test]
    async fn other_users_ticket_is_forbidden_and_missing_is_not_found() {
        let db = setup_test_db().await;
        let (a, _) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let (_, bob) = make_user(&db, "bob@example.com", Role::EndUser).await;
        let t = make_ticket(&db, a.id, "private").await;

        let err = TicketService::get_visible(&db, &bob, t.id).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        let err = TicketService::get_visible(&db, &bob, 9999).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn resolving_stamps_resolved_at_and_closing_keeps_it() {
        let db = setup_test_db().await;
        let outbox = MemoryOutbox::new();
        let (a, _) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let (_, staff) = make_user(&db, "staff@example.com", Role::ItStaff).await;
        let t = make_ticket(&db, a.id, "slow").await;

        let resolved = TicketService::update(
            &db,
            &outbox,
            &staff,
            t.id,
            UpdateTicket {
                status: Some(TicketStatus::Resolved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let stamp = resolved.resolved_at.expect("resolved_at set");
        assert!(stamp >= resolved.created_at);

        let closed = TicketService::update(
            &db,
            &outbox,
            &staff,
            t.id,
            UpdateTicket {
                status: Some(TicketStatus::Closed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        assert_eq!(closed.resolved_at, Some(stamp));
        assert_eq!(outbox.names(), vec!["ticket_updated", "ticket_updated"]);
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected() {
        let db = setup_test_db().await;
        let (a, _) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let (_, staff) = make_user(&db, "staff@example.com", Role::Manager).await;
        let t = make_ticket(&db, a.id, "done").await;
        let outbox = MemoryOutbox::new();

        TicketService::update(
            &db,
            &outbox,
            &staff,
            t.id,
            UpdateTicket {
                status: Some(TicketStatus::Closed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = TicketService::update(
            &db,
            &outbox,
            &staff,
            t.id,
            UpdateTicket {
                status: Some(TicketStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn end_user_cannot_update() {
        let db = setup_test_db().await;
        let (a, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let t = make_ticket(&db, a.id, "mine").await;
        let err = TicketService::update(
            &db,
            &MemoryOutbox::new(),
            &alice,
            t.id,
            UpdateTicket {
                status: Some(TicketStatus::Resolved),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn assigning_new_ticket_moves_it_in_progress() {
        let db = setup_test_db().await;
        let outbox = MemoryOutbox::new();
        let (a, _) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let (s, staff) = make_user(&db, "staff@example.com", Role::ItStaff).await;
        let t = make_ticket(&db, a.id, "printer").await;

        let assigned = TicketService::assign(&db, &outbox, &staff, t.id, Some(s.id))
            .await
            .unwrap();
        assert_eq!(assigned.assigned_to, Some(s.id));
        assert_eq!(assigned.status, TicketStatus::InProgress);

        let cleared = TicketService::assign(&db, &outbox, &staff, t.id, None)
            .await
            .unwrap();
        assert_eq!(cleared.assigned_to, None);
        assert_eq!(cleared.status, TicketStatus::InProgress);
        assert_eq!(outbox.names(), vec!["ticket_assigned", "ticket_assigned"]);
    }

    #[tokio::test]
    async fn assigning_to_end_user_fails_and_leaves_ticket_untouched() {
        let db = setup_test_db().await;
        let outbox = MemoryOutbox::new();
        let (a, _) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let (b, _) = make_user(&db, "bob@example.com", Role::EndUser).await;
        let (_, staff) = make_user(&db, "staff@example.com", Role::ItStaff).await;
        let t = make_ticket(&db, a.id, "printer").await;

        let err = TicketService::assign(&db, &outbox, &staff, t.id, Some(b.id))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ASSIGNEE");

        let err = TicketService::assign(&db, &outbox, &staff, t.id, Some(424242))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ASSIGNEE");

        let after = ticket::Entity::find_by_id(t.id).one(&db).await.unwrap().unwrap();
        assert_eq!(after, t);
        assert!(outbox.events().is_empty());
    }

    #[tokio::test]
    async fn owner_deletes_new_ticket_with_comments_and_files() {
        let db = setup_test_db().await;
        let tmp = tempfile::tempdir().unwrap();
        let (a, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let t = make_ticket(&db, a.id, "bye").await;

        ticket_comment::Model::create(&db, t.id, a.id, "hello", false)
            .await
            .unwrap();
        let rel = paths::attachment_relative_path(t.id, "f.txt");
        let abs = tmp.path().join(&rel);
        paths::ensure_parent_dir(&abs).unwrap();
        std::fs::write(&abs, b"data").unwrap();
        ticket_attachment::Model::create(&db, t.id, a.id, "f.txt", rel.to_str().unwrap(), 4, "text/plain")
            .await
            .unwrap();

        TicketService::delete(&db, tmp.path(), &alice, t.id).await.unwrap();

        assert!(ticket::Entity::find_by_id(t.id).one(&db).await.unwrap().is_none());
        assert!(ticket_comment::Model::for_ticket(&db, t.id, true).await.unwrap().is_empty());
        assert!(ticket_attachment::Model::for_ticket(&db, t.id).await.unwrap().is_empty());
        assert!(!abs.exists());
    }

    #[tokio::test]
    async fn owner_cannot_delete_ticket_in_progress() {
        let db = setup_test_db().await;
        let tmp = tempfile::tempdir().unwrap();
        let (a, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let (s, staff) = make_user(&db, "staff@example.com", Role::ItStaff).await;
        let t = make_ticket(&db, a.id, "busy").await;
        TicketService::assign(&db, &MemoryOutbox::new(), &staff, t.id, Some(s.id))
            .await
            .unwrap();

        let err = TicketService::delete(&db, tmp.path(), &alice, t.id).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        TicketService::delete(&db, tmp.path(), &staff, t.id).await.unwrap();
    }

    #[tokio::test]
    async fn detail_hides_internal_comments_from_owner() {
        let db = setup_test_db().await;
        let (a, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let (s, staff) = make_user(&db, "staff@example.com", Role::ItStaff).await;
        let t = make_ticket(&db, a.id, "vpn").await;
        ticket_comment::Model::create(&db, t.id, a.id, "public", false).await.unwrap();
        ticket_comment::Model::create(&db, t.id, s.id, "secret", true).await.unwrap();

        let mine = TicketService::detail(&db, &alice, t.id).await.unwrap();
        assert_eq!(mine.comments.len(), 1);
        assert_eq!(mine.comments[0].content, "public");

        let theirs = TicketService::detail(&db, &staff, t.id).await.unwrap();
        assert_eq!(theirs.comments.len(), 2);
    }
}
