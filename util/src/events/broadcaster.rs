//! Topic-based fan-out for server-sent ticket events.
//!
//! Uses Tokio broadcast channels per topic. A subscriber that falls behind
//! loses the oldest frames (`RecvError::Lagged`) rather than blocking publishers.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

type Topic = String;
type Sender = broadcast::Sender<String>;
type Receiver = broadcast::Receiver<String>;

/// Buffered frames per topic before slow subscribers start lagging.
const CHANNEL_CAPACITY: usize = 256;

/// Manages broadcast channels per topic.
///
/// - Lazily creates a channel on first subscription
/// - Removes a topic once a send finds no remaining receivers
/// - Sweeps abandoned topics whenever someone subscribes
#[derive(Clone, Default)]
pub struct EventBroadcaster {
    inner: Arc<RwLock<HashMap<Topic, Sender>>>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to the given topic, creating it if necessary.
    pub async fn subscribe(&self, topic: &str) -> Receiver {
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, sender| sender.receiver_count() > 0);
        if map.len() < before {
            tracing::debug!(removed = before - map.len(), "pruned event topics with no subscribers");
        }
        map.entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Broadcasts a frame to all subscribers of `topic`.
    ///
    /// No-op if nobody ever subscribed. Returns how many receivers got the frame.
    pub async fn broadcast<T: Into<String>>(&self, topic: &str, msg: T) -> usize {
        let mut map = self.inner.write().await;
        let Some(sender) = map.get(topic) else {
            return 0;
        };
        let delivered = sender.send(msg.into()).unwrap_or(0);
        if sender.receiver_count() == 0 {
            tracing::debug!(topic, "removing event topic with no subscribers");
            map.remove(topic);
        }
        delivered
    }

    /// Number of live topics, for diagnostics and tests.
    pub async fn topic_count(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn has_topic(&self, topic: &str) -> bool {
        self.inner.read().await.contains_key(topic)
    }
}
