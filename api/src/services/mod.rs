//! Transports behind the service-layer outbox.

pub mod dispatcher;
pub mod email;
