//! Session guards, mounted with `route_layer(from_fn_with_state(...))`.
//!
//! Every guard resolves the session cookie against the database, so a
//! deactivated or deleted account is locked out on its very next request.
//! On success the caller is inserted into the request extensions as
//! [`AuthUser`] (and copied onto the response for request logging).

use crate::auth::{
    claims::AuthUser,
    cookies::{cleared_session_cookie, session_token},
};
use crate::response::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use services::policy::Capability;
use services::session_service::SessionService;
use services::{Actor, ServiceError};

async fn authorize(
    state: &AppState,
    mut req: Request<Body>,
    next: Next,
    allowed: fn(&Actor) -> bool,
    failure_msg: &str,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let Some(token) = session_token(&jar) else {
        return ApiError(ServiceError::Unauthenticated).into_response();
    };

    let actor = match SessionService::resolve(state.db(), &token).await {
        Ok((actor, _)) => actor,
        Err(err @ (ServiceError::Unauthenticated | ServiceError::AccountDeactivated)) => {
            // The session row is gone; drop the browser's copy too.
            return (jar.remove(cleared_session_cookie()), ApiError(err)).into_response();
        }
        Err(err) => return ApiError(err).into_response(),
    };

    if !allowed(&actor) {
        return ApiError(ServiceError::forbidden(failure_msg)).into_response();
    }

    let user = AuthUser(actor);
    req.extensions_mut().insert(user.clone());
    let mut res = next.run(req).await;
    res.extensions_mut().insert(user);
    res
}

/// Any active, signed-in user.
pub async fn allow_authenticated(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    authorize(&state, req, next, |_| true, "").await
}

/// it_staff, manager or admin.
pub async fn allow_staff(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    authorize(
        &state,
        req,
        next,
        |a| a.is_staff(),
        "IT staff access required",
    )
    .await
}

/// manager or admin.
pub async fn allow_manager(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    authorize(
        &state,
        req,
        next,
        |a| a.can(Capability::ViewUsers),
        "Manager access required",
    )
    .await
}

pub async fn allow_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    authorize(
        &state,
        req,
        next,
        |a| a.can(Capability::ManageUsers),
        "Admin access required",
    )
    .await
}
