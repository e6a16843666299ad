//! HTTP route entry point for `/api/...`.
//!
//! Routes are organized by domain, each protected by the session guard that
//! matches its audience:
//! - `/health` → liveness (public)
//! - `/login`, `/logout`, `/auth` → session lifecycle and self-service profile
//! - `/tickets` → tickets, comments, attachments (authenticated)
//! - `/users` → account directory and administration (role-gated per route)
//! - `/knowledge-base` → articles (authenticated; edits need manager/admin)
//! - `/notifications` → the caller's in-app notifications (authenticated)
//! - `/analytics` → dashboard aggregates (staff)
//! - `/events` → server-sent live ticket events (authenticated)

use crate::auth::guards::{allow_authenticated, allow_staff};
use crate::routes::{
    analytics::analytics_routes, auth::auth_routes, events::event_stream,
    health::health_routes, knowledge_base::knowledge_base_routes,
    notifications::notification_routes, tickets::ticket_routes, users::users_routes,
};
use crate::state::AppState;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

pub mod analytics;
pub mod auth;
pub mod common;
pub mod events;
pub mod health;
pub mod knowledge_base;
pub mod notifications;
pub mod tickets;
pub mod users;

/// Builds the complete `/api` router.
///
/// `POST /login` and `GET /logout` are kept as short aliases of
/// `POST /auth/login` and `POST /auth/logout`.
pub fn routes(app_state: AppState) -> Router {
    let authenticated = || from_fn_with_state(app_state.clone(), allow_authenticated);

    Router::new()
        .nest("/health", health_routes())
        .route("/login", post(auth::post::login))
        .route("/logout", get(auth::post::logout))
        .nest("/auth", auth_routes(app_state.clone()))
        .nest("/tickets", ticket_routes().route_layer(authenticated()))
        .nest("/users", users_routes(app_state.clone()))
        .nest(
            "/knowledge-base",
            knowledge_base_routes().route_layer(authenticated()),
        )
        .nest(
            "/notifications",
            notification_routes().route_layer(authenticated()),
        )
        .nest(
            "/analytics",
            analytics_routes()
                .route_layer(from_fn_with_state(app_state.clone(), allow_staff)),
        )
        .route("/events", get(event_stream).route_layer(authenticated()))
        .with_state(app_state)
}
