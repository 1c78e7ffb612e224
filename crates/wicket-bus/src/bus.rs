use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::BusError;

/// A raw message on a topic.
#[derive(Clone, Debug)]
pub struct BusMessage {
    /// The topic the message was published to.
    pub topic: String,
    /// Opaque payload bytes (JSON on the device topics).
    pub payload: Vec<u8>,
}

/// A broadcast receiver for one topic's messages.
pub type TopicStream = broadcast::Receiver<BusMessage>;

/// Topic-based publish/subscribe boundary.
///
/// Real deployments back this with an external broker; tests and demos use
/// [`InMemoryBus`]. Publishing has no delivery guarantee beyond currently
/// connected subscribers.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish a payload to a topic.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError>;

    /// Subscribe to a topic.
    fn subscribe(&self, topic: &str) -> TopicStream;
}

/// In-memory bus: per-topic broadcast channels with lazy creation.
pub struct InMemoryBus {
    capacity: usize,
    topics: RwLock<HashMap<String, broadcast::Sender<BusMessage>>>,
}

impl InMemoryBus {
    /// Create a bus with the given per-topic channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            topics: RwLock::new(HashMap::new()),
        }
    }

    fn sender_for(&self, topic: &str) -> broadcast::Sender<BusMessage> {
        let mut topics = self.topics.write().expect("bus lock poisoned");
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Number of live subscribers on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .expect("bus lock poisoned")
            .get(topic)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError> {
        let sender = self.sender_for(topic);
        // A send error only means no subscriber is currently listening;
        // that is not a bus failure for fire-and-forget topics.
        let _ = sender.send(BusMessage {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> TopicStream {
        self.sender_for(topic).subscribe()
    }
}
