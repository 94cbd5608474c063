//! In-process pub/sub hub for real-time GraphQL subscriptions.
//!
//! Topic-keyed broadcast channels. Delivery is best-effort and in-memory:
//! a subscriber sees only what is published after it subscribed, in publish
//! order, and nothing survives a restart.
//!
//! Producers (resolvers):
//!   hub.publish("announcementSent", json!("Hello")).await;
//!
//! Consumers (subscription resolvers):
//!   let rx = hub.subscribe("announcementSent").await;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Default number of buffered events per topic before slow subscribers lag.
pub const DEFAULT_TOPIC_CAPACITY: usize = 256;

/// Process-local pub/sub hub.
///
/// Cloneable handle; clones share the same topic registry. Constructed once
/// at startup and injected wherever it is needed.
#[derive(Clone)]
pub struct StreamHub {
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<serde_json::Value>>>>,
    capacity: usize,
}

impl StreamHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TOPIC_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish a payload to a topic and return how many subscribers it reached.
    ///
    /// No-op (returns 0) when nobody is subscribed.
    pub async fn publish(&self, topic: &str, payload: serde_json::Value) -> usize {
        let topics = self.topics.read().await;
        let delivered = topics
            .get(topic)
            .and_then(|tx| tx.send(payload).ok())
            .unwrap_or(0);
        tracing::debug!(topic, delivered, "Published event");
        delivered
    }

    /// Subscribe to a topic, creating it on first use.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<serde_json::Value> {
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of live subscribers on a topic.
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        let topics = self.topics.read().await;
        topics.get(topic).map_or(0, |tx| tx.receiver_count())
    }

    /// Drop topics with no remaining subscribers.
    pub async fn cleanup(&self) {
        let mut topics = self.topics.write().await;
        topics.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}
