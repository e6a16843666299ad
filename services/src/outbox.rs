//! Side-effect boundary for account and ticket lifecycle events.
//!
//! Services publish a `DomainEvent` after their primary write has succeeded.
//! The transport (email, in-app notification rows, the live event stream) is
//! chosen by whoever implements `Outbox`; a publish can never fail the caller.

use async_trait::async_trait;
use db::models::{ticket, ticket::TicketStatus, ticket_comment, user};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum DomainEvent {
    UserCreated {
        user: user::Model,
        temporary_password: String,
    },
    PasswordReset {
        user: user::Model,
        temporary_password: String,
    },
    TicketCreated {
        ticket: ticket::Model,
    },
    TicketUpdated {
        ticket: ticket::Model,
        previous_status: TicketStatus,
        changed_by: i64,
    },
    TicketAssigned {
        ticket: ticket::Model,
        previous_assignee: Option<i64>,
        assigned_by: i64,
    },
    TicketCommented {
        ticket: ticket::Model,
        comment: ticket_comment::Model,
    },
}

impl DomainEvent {
    /// Wire name used for notifications and the event stream.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::UserCreated { .. } => "user_created",
            DomainEvent::PasswordReset { .. } => "password_reset",
            DomainEvent::TicketCreated { .. } => "ticket_created",
            DomainEvent::TicketUpdated { .. } => "ticket_updated",
            DomainEvent::TicketAssigned { .. } => "ticket_assigned",
            DomainEvent::TicketCommented { .. } => "ticket_commented",
        }
    }

    pub fn ticket(&self) -> Option<&ticket::Model> {
        match self {
            DomainEvent::TicketCreated { ticket }
            | DomainEvent::TicketUpdated { ticket, .. }
            | DomainEvent::TicketAssigned { ticket, .. }
            | DomainEvent::TicketCommented { ticket, .. } => Some(ticket),
            DomainEvent::UserCreated { .. } | DomainEvent::PasswordReset { .. } => None,
        }
    }
}

/// What the outbox managed to do synchronously.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// The account email (temporary password) reached the mail server.
    pub email_delivered: bool,
}

#[async_trait]
pub trait Outbox: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Delivery;
}

/// Drops every event. Emails count as undelivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOutbox;

#[async_trait]
impl Outbox for NoopOutbox {
    async fn publish(&self, _event: DomainEvent) -> Delivery {
        Delivery::default()
    }
}

/// Records published events in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutbox {
    events: Arc<Mutex<Vec<DomainEvent>>>,
    email_delivered: bool,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// An outbox whose emails are reported as delivered.
    pub fn delivering() -> Self {
        Self {
            email_delivered: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(DomainEvent::name).collect()
    }
}

#[async_trait]
impl Outbox for MemoryOutbox {
    async fn publish(&self, event: DomainEvent) -> Delivery {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
        Delivery {
            email_delivered: self.email_delivered,
        }
    }
}
