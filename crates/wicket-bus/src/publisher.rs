use std::sync::Arc;

use tracing::{debug, warn};

use wicket_types::DeviceId;

use crate::bus::MessageBus;
use crate::topics::response_topic;
use crate::wire::DeviceResponse;

/// Fire-and-forget publisher of decision responses.
///
/// The ledger write is the source of truth; device notification is
/// best-effort. Publish failures are logged and swallowed, never rolled
/// back into the already-committed decision.
#[derive(Clone)]
pub struct ResponsePublisher {
    bus: Arc<dyn MessageBus>,
    base_topic: String,
}

impl ResponsePublisher {
    /// Create a publisher emitting to `<base_topic>/response/<deviceId>`.
    pub fn new(bus: Arc<dyn MessageBus>, base_topic: impl Into<String>) -> Self {
        Self {
            bus,
            base_topic: base_topic.into(),
        }
    }

    /// Publish a decision response to the device's topic.
    pub async fn publish(&self, device: &DeviceId, response: &DeviceResponse) {
        let topic = response_topic(&self.base_topic, device);
        let payload = match serde_json::to_vec(response) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%device, error = %e, "response encoding failed");
                return;
            }
        };

        match self.bus.publish(&topic, payload).await {
            Ok(()) => debug!(%device, topic, granted = response.access_granted, "response published"),
            Err(e) => warn!(%device, topic, error = %e, "response publish failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use wicket_types::SubjectId;

    use super::*;
    use crate::bus::{InMemoryBus, TopicStream};
    use crate::error::BusError;

    fn response(granted: bool) -> DeviceResponse {
        DeviceResponse {
            access_granted: granted,
            subject_id: SubjectId::known("S7"),
            similarity: 92.0,
            credential_present: true,
            verification_matched: granted,
            ledger_receipt: "feed".into(),
            decided_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publishes_to_per_device_topic() {
        let bus = Arc::new(InMemoryBus::default());
        let publisher = ResponsePublisher::new(bus.clone(), "access/attempt");
        let device = DeviceId::new("door-1").unwrap();
        let mut stream = bus.subscribe("access/attempt/response/door-1");

        publisher.publish(&device, &response(true)).await;

        let msg = stream.recv().await.unwrap();
        let decoded: DeviceResponse = serde_json::from_slice(&msg.payload).unwrap();
        assert!(decoded.access_granted);
        assert_eq!(decoded.subject_id, SubjectId::known("S7"));
    }

    /// Bus double whose publish always fails.
    struct BrokenBus;

    #[async_trait]
    impl MessageBus for BrokenBus {
        async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<(), BusError> {
            Err(BusError::Closed)
        }

        fn subscribe(&self, _topic: &str) -> TopicStream {
            tokio::sync::broadcast::channel(1).1
        }
    }

    #[tokio::test]
    async fn publish_failure_is_swallowed() {
        let publisher = ResponsePublisher::new(Arc::new(BrokenBus), "access/attempt");
        let device = DeviceId::new("door-1").unwrap();
        // Must not panic or propagate.
        publisher.publish(&device, &response(false)).await;
    }
}
