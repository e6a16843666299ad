pub mod broadcaster;
pub use broadcaster::EventBroadcaster;

use chrono::Utc;
use serde::Serialize;

/// Topic every staff member (it_staff, manager, admin) listens on.
pub const STAFF_TOPIC: &str = "tickets:staff";

/// Private topic for a single end user's own tickets.
pub fn owner_topic(user_id: i64) -> String {
    format!("tickets:user:{user_id}")
}

/// Standard envelope written as the `data:` line of each SSE frame.
#[derive(Serialize)]
pub struct EventEnvelope<'a, T> {
    #[serde(rename = "type")]
    pub r#type: &'static str,
    pub event: &'a str,
    pub topic: &'a str,
    pub payload: T,
    pub ts: String,
}

/// Serialize an `EventEnvelope` and broadcast it on `topic`.
pub async fn emit<T: Serialize>(
    events: &EventBroadcaster,
    topic: &str,
    event: &str,
    payload: &T,
) -> usize {
    let env = EventEnvelope {
        r#type: "event",
        event,
        topic,
        payload,
        ts: Utc::now().to_rfc3339(),
    };
    match serde_json::to_string(&env) {
        Ok(json) => events.broadcast(topic, json).await,
        Err(err) => {
            tracing::warn!(event, topic, error = %err, "failed to serialize event");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_wraps_payload_in_envelope() {
        let events = EventBroadcaster::new();
        let mut rx = events.subscribe(STAFF_TOPIC).await;

        emit(&events, STAFF_TOPIC, "ticket.created", &serde_json::json!({ "id": 9 })).await;

        let raw = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["type"], "event");
        assert_eq!(v["event"], "ticket.created");
        assert_eq!(v["topic"], STAFF_TOPIC);
        assert_eq!(v["payload"]["id"], 9);
        assert!(v["ts"].as_str().is_some());
    }

    #[test]
    fn owner_topic_is_scoped_per_user() {
        assert_eq!(owner_topic(42), "tickets:user:42");
    }
}
