//! Role-based access rules for tickets, comments and attachments.
//!
//! Everything here is a pure function of the caller and the resource. Route
//! handlers and services ask these questions; nothing else inspects `Role`
//! directly to make an access decision.

use crate::error::ServiceError;
use db::models::{
    ticket, ticket_attachment, ticket_comment,
    user::{self, Role},
};

/// The authenticated caller, as resolved from their session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
    pub email: String,
}

impl Actor {
    pub fn new(id: i64, role: Role, email: impl Into<String>) -> Self {
        Self {
            id,
            role,
            email: email.into(),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn can(&self, capability: Capability) -> bool {
        has_capability(self.role, capability)
    }
}

impl From<&user::Model> for Actor {
    fn from(u: &user::Model) -> Self {
        Actor::new(u.id, u.role, u.email.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewAllTickets,
    ManageTicketStatus,
    AssignTickets,
    DeleteAnyTicket,
    PostInternalComments,
    ViewInternalComments,
    ReceiveAssignments,
    ViewAnalytics,
    ViewStaffDirectory,
    ViewUsers,
    ManageUsers,
    ManageKnowledgeBase,
}

pub fn has_capability(role: Role, capability: Capability) -> bool {
    use Capability::*;
    match role {
        Role::EndUser => false,
        Role::ItStaff => matches!(
            capability,
            ViewAllTickets
                | ManageTicketStatus
                | AssignTickets
                | DeleteAnyTicket
                | PostInternalComments
                | ViewInternalComments
                | ReceiveAssignments
                | ViewAnalytics
                | ViewStaffDirectory
        ),
        Role::Manager => !matches!(capability, ManageUsers),
        Role::Admin => true,
    }
}

/// Fails with `Forbidden` unless the actor holds `capability`.
pub fn require(actor: &Actor, capability: Capability) -> Result<(), ServiceError> {
    if actor.can(capability) {
        Ok(())
    } else {
        Err(ServiceError::forbidden(
            "You do not have permission to perform this action",
        ))
    }
}

pub fn can_list_ticket(actor: &Actor, ticket: &ticket::Model) -> bool {
    actor.can(Capability::ViewAllTickets) || ticket.created_by == actor.id
}

pub fn can_mutate_ticket_status(actor: &Actor) -> bool {
    actor.can(Capability::ManageTicketStatus)
}

/// Owners may withdraw a ticket nobody has started on; staff may delete any.
pub fn can_delete_ticket(actor: &Actor, ticket: &ticket::Model) -> bool {
    (ticket.created_by == actor.id && ticket.status == ticket::TicketStatus::New)
        || actor.can(Capability::DeleteAnyTicket)
}

pub fn can_assign(actor: &Actor) -> bool {
    actor.can(Capability::AssignTickets)
}

/// The target of an assignment must be an active staff account.
pub fn validate_assignee(assignee: &user::Model) -> Result<(), ServiceError> {
    if !has_capability(assignee.role, Capability::ReceiveAssignments) {
        return Err(ServiceError::InvalidAssignee(format!(
            "Tickets can only be assigned to IT staff, managers or admins (user {} is {})",
            assignee.id, assignee.role
        )));
    }
    if !assignee.is_active {
        return Err(ServiceError::InvalidAssignee(format!(
            "User {} is deactivated and cannot receive tickets",
            assignee.id
        )));
    }
    Ok(())
}

pub fn can_post_internal_comment(actor: &Actor) -> bool {
    actor.can(Capability::PostInternalComments)
}

pub fn can_view_internal_comments(actor: &Actor) -> bool {
    actor.can(Capability::ViewInternalComments)
}

pub fn can_view_comment(actor: &Actor, comment: &ticket_comment::Model) -> bool {
    !comment.is_internal || can_view_internal_comments(actor)
}

pub fn can_delete_comment(actor: &Actor, comment: &ticket_comment::Model) -> bool {
    comment.author_id == actor.id || actor.role == Role::Admin
}

pub fn can_delete_attachment(actor: &Actor, attachment: &ticket_attachment::Model) -> bool {
    attachment.uploaded_by == actor.id || actor.is_staff()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use db::models::ticket::{TicketCategory, TicketPriority, TicketStatus};
    use sea_orm::Iterable;

    fn actor(id: i64, role: Role) -> Actor {
        Actor::new(id, role, format!("u{id}@example.com"))
    }

    fn ticket(owner: i64, status: TicketStatus) -> ticket::Model {
        let now = Utc::now();
        ticket::Model {
            id: 1,
            title: "t".into(),
            description: "d".into(),
            category: TicketCategory::Other,
            priority: TicketPriority::Low,
            status,
            created_by: owner,
            assigned_to: None,
            contact_phone: None,
            contact_preference: None,
            best_time_to_contact: None,
            location: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(id: i64, role: Role, active: bool) -> user::Model {
        let now = Utc::now();
        user::Model {
            id,
            email: format!("u{id}@example.com"),
            first_name: "F".into(),
            last_name: "L".into(),
            role,
            is_active: active,
            password_hash: String::new(),
            email_notifications: true,
            in_app_notifications: true,
            theme: "system".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn end_users_only_see_their_own_tickets() {
        let me = actor(1, Role::EndUser);
        assert!(can_list_ticket(&me, &ticket(1, TicketStatus::New)));
        assert!(!can_list_ticket(&me, &ticket(2, TicketStatus::New)));
        for role in Role::staff_roles() {
            assert!(can_list_ticket(&actor(9, role), &ticket(2, TicketStatus::Closed)));
        }
    }

    #[test]
    fn only_staff_mutate_status_and_assign() {
        assert!(!can_mutate_ticket_status(&actor(1, Role::EndUser)));
        assert!(!can_assign(&actor(1, Role::EndUser)));
        for role in Role::staff_roles() {
            assert!(can_mutate_ticket_status(&actor(1, role)));
            assert!(can_assign(&actor(1, role)));
        }
    }

    #[test]
    fn owner_can_delete_only_new_tickets() {
        let owner = actor(1, Role::EndUser);
        assert!(can_delete_ticket(&owner, &ticket(1, TicketStatus::New)));
        assert!(!can_delete_ticket(&owner, &ticket(1, TicketStatus::InProgress)));
        assert!(!can_delete_ticket(&owner, &ticket(2, TicketStatus::New)));
        assert!(can_delete_ticket(&actor(5, Role::ItStaff), &ticket(1, TicketStatus::Closed)));
    }

    #[test]
    fn internal_comments_are_staff_only_for_every_role() {
        for role in Role::iter() {
            assert_eq!(can_post_internal_comment(&actor(1, role)), role != Role::EndUser);
            assert_eq!(can_view_internal_comments(&actor(1, role)), role != Role::EndUser);
        }
    }

    #[test]
    fn assignee_must_be_active_staff() {
        assert!(matches!(
            validate_assignee(&user(2, Role::EndUser, true)),
            Err(ServiceError::InvalidAssignee(_))
        ));
        assert!(matches!(
            validate_assignee(&user(2, Role::ItStaff, false)),
            Err(ServiceError::InvalidAssignee(_))
        ));
        for role in Role::staff_roles() {
            assert!(validate_assignee(&user(2, role, true)).is_ok());
        }
    }

    #[test]
    fn managers_cannot_manage_users() {
        assert!(has_capability(Role::Manager, Capability::ViewUsers));
        assert!(has_capability(Role::Manager, Capability::ManageKnowledgeBase));
        assert!(!has_capability(Role::Manager, Capability::ManageUsers));
        assert!(has_capability(Role::Admin, Capability::ManageUsers));
        assert!(!has_capability(Role::ItStaff, Capability::ViewUsers));
    }

    #[test]
    fn comment_deletion_is_author_or_admin() {
        let now = Utc::now();
        let comment = ticket_comment::Model {
            id: 1,
            ticket_id: 1,
            author_id: 3,
            content: "x".into(),
            is_internal: false,
            created_at: now,
            updated_at: now,
        };
        assert!(can_delete_comment(&actor(3, Role::EndUser), &comment));
        assert!(!can_delete_comment(&actor(4, Role::Manager), &comment));
        assert!(can_delete_comment(&actor(4, Role::Admin), &comment));
    }
}
