//! HTTP layer of the help desk: routes, session guards, the response
//! envelope, and the transports behind the service outbox.

pub mod auth;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
