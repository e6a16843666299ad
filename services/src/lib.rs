pub mod analytics_service;
pub mod attachment_service;
pub mod comment_service;
pub mod error;
pub mod knowledge_service;
pub mod notification_service;
pub mod outbox;
pub mod policy;
pub mod session_service;
pub mod ticket_query;
pub mod ticket_service;
pub mod user_service;

pub use error::ServiceError;
pub use outbox::{DomainEvent, Outbox};
pub use policy::Actor;

#[cfg(test)]
mod test_support;
