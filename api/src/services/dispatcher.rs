//! Production `Outbox`: fans each domain event out to the live event stream,
//! in-app notification rows and email. Every leg is best effort; failures are
//! logged and never reach the caller.

use crate::services::email::EmailService;
use async_trait::async_trait;
use db::models::{notification::NotificationKind, ticket, user};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::{Value, json};
use services::notification_service::NotificationService;
use services::outbox::{Delivery, DomainEvent, Outbox};
use util::events::{self, EventBroadcaster, STAFF_TOPIC, owner_topic};

pub struct Dispatcher {
    db: DatabaseConnection,
    events: EventBroadcaster,
    email: EmailService,
}

/// Topics an event is pushed to. Internal comments never reach the owner.
pub fn topics_for(event: &DomainEvent) -> Vec<String> {
    let Some(ticket) = event.ticket() else {
        return Vec::new();
    };
    let mut topics = vec![STAFF_TOPIC.to_string()];
    let internal = matches!(event, DomainEvent::TicketCommented { comment, .. } if comment.is_internal);
    if !internal {
        topics.push(owner_topic(ticket.created_by));
    }
    topics
}

/// Users who get a notification for a ticket event. Apart from the receipt
/// sent to a ticket's creator, whoever caused the event is left out.
pub fn recipients_for(event: &DomainEvent) -> Vec<i64> {
    let (actor, candidates): (i64, Vec<Option<i64>>) = match event {
        DomainEvent::TicketCreated { ticket } => (0, vec![Some(ticket.created_by)]),
        DomainEvent::TicketUpdated {
            ticket, changed_by, ..
        } => (
            *changed_by,
            vec![Some(ticket.created_by), ticket.assigned_to],
        ),
        DomainEvent::TicketAssigned {
            ticket,
            assigned_by,
            ..
        } => (
            *assigned_by,
            vec![ticket.assigned_to, Some(ticket.created_by)],
        ),
        DomainEvent::TicketCommented { ticket, comment } if comment.is_internal => {
            (comment.author_id, vec![ticket.assigned_to])
        }
        DomainEvent::TicketCommented { ticket, comment } => (
            comment.author_id,
            vec![Some(ticket.created_by), ticket.assigned_to],
        ),
        DomainEvent::UserCreated { .. } | DomainEvent::PasswordReset { .. } => return Vec::new(),
    };

    let mut out: Vec<i64> = Vec::new();
    for id in candidates.into_iter().flatten() {
        if id != actor && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

fn ticket_notice(
    event: &DomainEvent,
    ticket: &ticket::Model,
) -> Option<(NotificationKind, String, String)> {
    let label = format!("#{} \"{}\"", ticket.id, ticket.title);
    let notice = match event {
        DomainEvent::TicketCreated { .. } => (
            NotificationKind::TicketCreated,
            "Ticket received".to_string(),
            format!("Your ticket {label} has been submitted to the help desk"),
        ),
        DomainEvent::TicketUpdated { previous_status, .. } if *previous_status != ticket.status => (
            NotificationKind::TicketUpdated,
            "Ticket status changed".to_string(),
            format!(
                "Ticket {label} moved from {previous_status} to {}",
                ticket.status
            ),
        ),
        DomainEvent::TicketUpdated { .. } => (
            NotificationKind::TicketUpdated,
            "Ticket updated".to_string(),
            format!("Ticket {label} was updated"),
        ),
        DomainEvent::TicketAssigned { .. } => match ticket.assigned_to {
            Some(_) => (
                NotificationKind::TicketAssigned,
                "Ticket assigned".to_string(),
                format!("Ticket {label} has been assigned"),
            ),
            None => (
                NotificationKind::TicketAssigned,
                "Ticket unassigned".to_string(),
                format!("Ticket {label} no longer has an assignee"),
            ),
        },
        DomainEvent::TicketCommented { comment, .. } if comment.is_internal => (
            NotificationKind::TicketCommented,
            "New internal note".to_string(),
            format!("An internal note was added to ticket {label}"),
        ),
        DomainEvent::TicketCommented { .. } => (
            NotificationKind::TicketCommented,
            "New comment".to_string(),
            format!("A new comment was posted on ticket {label}"),
        ),
        DomainEvent::UserCreated { .. } | DomainEvent::PasswordReset { .. } => return None,
    };
    Some(notice)
}

/// Payload of the SSE frame for an event.
fn stream_payload(event: &DomainEvent) -> Value {
    match event {
        DomainEvent::TicketCreated { ticket } => json!({ "ticket": ticket }),
        DomainEvent::TicketUpdated {
            ticket,
            previous_status,
            changed_by,
        } => json!({
            "ticket": ticket,
            "previousStatus": previous_status,
            "changedBy": changed_by,
        }),
        DomainEvent::TicketAssigned {
            ticket,
            previous_assignee,
            assigned_by,
        } => json!({
            "ticket": ticket,
            "previousAssignee": previous_assignee,
            "assignedBy": assigned_by,
        }),
        DomainEvent::TicketCommented { ticket, comment } => json!({
            "ticket": ticket,
            "comment": comment,
        }),
        DomainEvent::UserCreated { user, .. } | DomainEvent::PasswordReset { user, .. } => {
            json!({ "userId": user.id })
        }
    }
}

impl Dispatcher {
    pub fn new(db: DatabaseConnection, events: EventBroadcaster, email: EmailService) -> Self {
        Self { db, events, email }
    }

    async fn load_user(&self, id: i64) -> Option<user::Model> {
        match user::Entity::find_by_id(id).one(&self.db).await {
            Ok(u) => u,
            Err(err) => {
                tracing::warn!(user_id = id, error = %err, "failed to load notification recipient");
                None
            }
        }
    }

    async fn notify(
        &self,
        recipient: &user::Model,
        kind: NotificationKind,
        title: &str,
        message: &str,
        data: Value,
    ) {
        if let Err(err) =
            NotificationService::notify(&self.db, recipient, kind, title, message, Some(data)).await
        {
            tracing::warn!(user_id = recipient.id, kind = %kind, error = %err, "failed to store notification");
        }
    }

    async fn push(&self, event: &DomainEvent) {
        let payload = stream_payload(event);
        for topic in topics_for(event) {
            let delivered = events::emit(&self.events, &topic, event.name(), &payload).await;
            tracing::debug!(event = event.name(), topic = %topic, delivered, "event pushed");
        }
    }

    async fn ticket_event(&self, event: &DomainEvent, ticket: &ticket::Model) {
        self.push(event).await;

        let Some((kind, title, message)) = ticket_notice(event, ticket) else {
            return;
        };
        let data = json!({ "ticketId": ticket.id });
        for id in recipients_for(event) {
            let Some(recipient) = self.load_user(id).await else {
                continue;
            };
            self.notify(&recipient, kind, &title, &message, data.clone())
                .await;

            if recipient.email_notifications && recipient.is_active {
                let email = self.email.clone();
                let (to, subject, body, ticket_id) =
                    (recipient.email, title.clone(), message.clone(), ticket.id);
                tokio::spawn(async move {
                    if let Err(err) = email.send_ticket_notice(&to, ticket_id, &subject, &body).await {
                        tracing::debug!(to = %to, error = %err, "ticket email not delivered");
                    }
                });
            }
        }
    }
}

#[async_trait]
impl Outbox for Dispatcher {
    async fn publish(&self, event: DomainEvent) -> Delivery {
        match &event {
            DomainEvent::UserCreated {
                user,
                temporary_password,
            } => {
                let sent = self
                    .email
                    .send_account_created(&user.email, &user.full_name(), temporary_password)
                    .await;
                if let Err(err) = &sent {
                    tracing::warn!(user_id = user.id, error = %err, "welcome email not delivered");
                }
                self.notify(
                    user,
                    NotificationKind::UserCreated,
                    "Welcome to the IT Help Desk",
                    "Your account is ready. Please change your temporary password.",
                    json!({ "userId": user.id }),
                )
                .await;
                Delivery {
                    email_delivered: sent.is_ok(),
                }
            }
            DomainEvent::PasswordReset {
                user,
                temporary_password,
            } => {
                let sent = self
                    .email
                    .send_password_reset(&user.email, &user.full_name(), temporary_password)
                    .await;
                if let Err(err) = &sent {
                    tracing::warn!(user_id = user.id, error = %err, "password reset email not delivered");
                }
                self.notify(
                    user,
                    NotificationKind::PasswordReset,
                    "Password reset",
                    "Your password was reset by an administrator.",
                    json!({ "userId": user.id }),
                )
                .await;
                Delivery {
                    email_delivered: sent.is_ok(),
                }
            }
            _ => {
                if let Some(ticket) = event.ticket() {
                    self.ticket_event(&event, ticket).await;
                }
                Delivery::default()
            }
        }
    }
}
