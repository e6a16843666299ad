//! `GET /api/events`: server-sent ticket events.
//!
//! Staff subscribe to the shared staff topic; end users get a private topic
//! carrying only their own tickets (never internal notes). The first frame
//! sets the client's reconnect delay, and comment frames keep idle proxies
//! from closing the connection.
//!
//! The session is resolved again before every frame. The stream ends once
//! it no longer maps to the topic it was opened on.

use crate::auth::{AuthUser, cookies::session_token};
use crate::state::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use axum_extra::extract::cookie::CookieJar;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use services::session_service::SessionService;
use std::{convert::Infallible, time::Duration};
use tokio::sync::broadcast::{Receiver, error::RecvError};
use util::{
    config,
    events::{STAFF_TOPIC, owner_topic},
};

/// Topic a caller listens on.
pub fn topic_for(user: &AuthUser) -> String {
    if user.0.is_staff() {
        STAFF_TOPIC.to_string()
    } else {
        owner_topic(user.id())
    }
}

#[derive(Deserialize)]
struct EnvelopeName {
    event: String,
}

/// One broadcast frame as an SSE event named after the domain event.
fn to_event(frame: String) -> Event {
    let name = serde_json::from_str::<EnvelopeName>(&frame)
        .map(|e| e.event)
        .unwrap_or_else(|_| "message".to_string());
    Event::default().event(name).data(frame)
}

/// What an open stream was authorized for.
#[derive(Clone)]
struct Subscription {
    state: AppState,
    token: String,
    topic: String,
}

impl Subscription {
    async fn still_valid(&self) -> bool {
        match SessionService::resolve(self.state.db(), &self.token).await {
            Ok((actor, _)) => {
                let topic = topic_for(&AuthUser(actor));
                if topic != self.topic {
                    tracing::info!(topic = %self.topic, now = %topic, "event stream closed: role changed");
                    return false;
                }
                true
            }
            Err(err) => {
                tracing::info!(topic = %self.topic, code = err.code(), "event stream closed: session no longer valid");
                false
            }
        }
    }
}

fn frames(rx: Receiver<String>) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(frame) => return Some((Ok(to_event(frame)), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

/// GET /api/events
///
/// ### Response
/// `text/event-stream`:
/// ```text
/// retry: 5000
/// : connected
///
/// event: ticket_updated
/// data: {"type":"event","event":"ticket_updated","topic":"tickets:staff","payload":{...},"ts":"..."}
/// ```
pub async fn event_stream(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let topic = topic_for(&user);
    let rx = state.events().subscribe(&topic).await;
    tracing::debug!(user_id = user.id(), topic = %topic, "event stream opened");

    let subscription = Subscription {
        state,
        token: session_token(&jar).unwrap_or_default(),
        topic,
    };
    let live = frames(rx).take_while(move |_| {
        let subscription = subscription.clone();
        async move { subscription.still_valid().await }
    });

    let hello = Event::default()
        .retry(Duration::from_millis(config::events_retry_ms()))
        .comment("connected");

    let stream = stream::once(async move { Ok(hello) }).chain(live);

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(config::events_keepalive_secs()))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::models::user::Role;
    use services::Actor;

    #[test]
    fn staff_share_a_topic_and_end_users_get_their_own() {
        let staff = AuthUser(Actor::new(1, Role::ItStaff, "s@example.com"));
        let admin = AuthUser(Actor::new(2, Role::Admin, "a@example.com"));
        let user = AuthUser(Actor::new(3, Role::EndUser, "u@example.com"));
        assert_eq!(topic_for(&staff), STAFF_TOPIC);
        assert_eq!(topic_for(&admin), STAFF_TOPIC);
        assert_eq!(topic_for(&user), "tickets:user:3");
    }

    #[tokio::test]
    async fn frames_are_named_after_the_event() {
        let events = util::events::EventBroadcaster::new();
        let rx = events.subscribe("t").await;
        util::events::emit(&events, "t", "ticket_created", &serde_json::json!({"id": 1})).await;
        drop(events);

        let mut s = Box::pin(frames(rx));
        assert!(s.next().await.is_some());
    }
}
