use crate::error::{ServiceError, ServiceResult};
use crate::outbox::{DomainEvent, Outbox};
use crate::policy::{self, Actor};
use crate::ticket_service::TicketService;
use chrono::Utc;
use db::models::{ticket, ticket_comment, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use std::collections::HashMap;

/// A comment with its author's display details.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: ticket_comment::Model,
    pub author_name: Option<String>,
    pub author_role: Option<user::Role>,
}

pub struct CommentService;

impl CommentService {
    /// Comments visible to the actor, oldest first.
    pub async fn list(
        db: &DatabaseConnection,
        actor: &Actor,
        ticket_id: i64,
    ) -> ServiceResult<Vec<CommentView>> {
        let ticket = TicketService::get_visible(db, actor, ticket_id).await?;
        let comments = ticket_comment::Model::for_ticket(
            db,
            ticket.id,
            policy::can_view_internal_comments(actor),
        )
        .await?;
        Self::with_authors(db, comments).await
    }

    pub async fn with_authors(
        db: &DatabaseConnection,
        comments: Vec<ticket_comment::Model>,
    ) -> ServiceResult<Vec<CommentView>> {
        let mut ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let authors: HashMap<i64, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = authors.get(&comment.author_id);
                CommentView {
                    author_name: author.map(user::Model::full_name),
                    author_role: author.map(|a| a.role),
                    comment,
                }
            })
            .collect())
    }

    pub async fn create(
        db: &DatabaseConnection,
        outbox: &dyn Outbox,
        actor: &Actor,
        ticket_id: i64,
        content: &str,
        is_internal: bool,
    ) -> ServiceResult<CommentView> {
        let ticket = TicketService::get_visible(db, actor, ticket_id).await?;
        if is_internal && !policy::can_post_internal_comment(actor) {
            return Err(ServiceError::forbidden(
                "Only IT staff can post internal notes",
            ));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::validation("Comment content is required"));
        }

        let comment =
            ticket_comment::Model::create(db, ticket.id, actor.id, content, is_internal).await?;

        let mut touched = ticket.into_active_model();
        touched.updated_at = Set(Utc::now());
        let ticket: ticket::Model = touched.update(db).await?;

        tracing::info!(
            ticket_id = ticket.id,
            comment_id = comment.id,
            internal = is_internal,
            "comment added"
        );
        outbox
            .publish(DomainEvent::TicketCommented {
                ticket,
                comment: comment.clone(),
            })
            .await;

        let mut views = Self::with_authors(db, vec![comment]).await?;
        views
            .pop()
            .ok_or_else(|| ServiceError::Internal("comment vanished after insert".into()))
    }

    /// Deletes a comment. Internal notes the actor cannot see are reported missing.
    pub async fn delete(
        db: &DatabaseConnection,
        actor: &Actor,
        ticket_id: i64,
        comment_id: i64,
    ) -> ServiceResult<()> {
        let ticket = TicketService::get_visible(db, actor, ticket_id).await?;
        let comment = ticket_comment::Entity::find_by_id(comment_id)
            .filter(ticket_comment::Column::TicketId.eq(ticket.id))
            .one(db)
            .await?
            .filter(|c| policy::can_view_comment(actor, c))
            .ok_or_else(|| ServiceError::not_found(format!("Comment {comment_id} not found")))?;

        if !policy::can_delete_comment(actor, &comment) {
            return Err(ServiceError::forbidden(
                "Only the author or an admin can delete this comment",
            ));
        }
        ticket_comment::Entity::delete_by_id(comment.id).exec(db).await?;
        tracing::info!(ticket_id, comment_id, user_id = actor.id, "comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbox::MemoryOutbox;
    use crate::test_support::{make_ticket, make_user};
    use db::models::user::Role;
    use db::test_utils::setup_test_db;

    #[tokio::test]
    async fn end_user_cannot_post_internal_note() {
        let db = setup_test_db().await;
        let (a, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let t = make_ticket(&db, a.id, "x").await;
        let err = CommentService::create(&db, &MemoryOutbox::new(), &alice, t.id, "psst", true)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn staff_note_is_hidden_from_owner_listing() {
        let db = setup_test_db().await;
        let outbox = MemoryOutbox::new();
        let (a, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let (_, staff) = make_user(&db, "staff@example.com", Role::ItStaff).await;
        let t = make_ticket(&db, a.id, "x").await;

        CommentService::create(&db, &outbox, &alice, t.id, "help", false).await.unwrap();
        let note = CommentService::create(&db, &outbox, &staff, t.id, "check logs", true)
            .await
            .unwrap();
        assert_eq!(note.author_name.as_deref(), Some("Test User"));
        assert_eq!(note.author_role, Some(Role::ItStaff));

        let owner_view = CommentService::list(&db, &alice, t.id).await.unwrap();
        assert_eq!(owner_view.len(), 1);
        let staff_view = CommentService::list(&db, &staff, t.id).await.unwrap();
        assert_eq!(staff_view.len(), 2);
        assert_eq!(outbox.names(), vec!["ticket_commented", "ticket_commented"]);

        let err = CommentService::delete(&db, &alice, t.id, note.comment.id).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn only_author_or_admin_deletes() {
        let db = setup_test_db().await;
        let outbox = MemoryOutbox::new();
        let (a, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let (_, manager) = make_user(&db, "manager@example.com", Role::Manager).await;
        let (_, admin) = make_user(&db, "admin@example.com", Role::Admin).await;
        let t = make_ticket(&db, a.id, "x").await;

        let c1 = CommentService::create(&db, &outbox, &alice, t.id, "one", false).await.unwrap();
        let c2 = CommentService::create(&db, &outbox, &alice, t.id, "two", false).await.unwrap();

        let err = CommentService::delete(&db, &manager, t.id, c1.comment.id).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        CommentService::delete(&db, &alice, t.id, c1.comment.id).await.unwrap();
        CommentService::delete(&db, &admin, t.id, c2.comment.id).await.unwrap();
        assert!(CommentService::list(&db, &alice, t.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let db = setup_test_db().await;
        let (a, alice) = make_user(&db, "alice@example.com", Role::EndUser).await;
        let t = make_ticket(&db, a.id, "x").await;
        let err = CommentService::create(&db, &MemoryOutbox::new(), &alice, t.id, "  \n ", false)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
