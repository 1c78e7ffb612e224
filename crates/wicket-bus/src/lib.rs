//! Device messaging for Wicket.
//!
//! Edge devices talk to the orchestrator over a topic-based message bus.
//! Broker operation (connections, TLS, reconnects) is out of scope; this
//! crate provides the [`MessageBus`] seam, the JSON wire payloads, topic
//! naming, an in-memory bus for tests and demos, and the fire-and-forget
//! [`ResponsePublisher`].

pub mod bus;
pub mod error;
pub mod publisher;
pub mod topics;
pub mod wire;

pub use bus::{BusMessage, InMemoryBus, MessageBus, TopicStream};
pub use error::BusError;
pub use publisher::ResponsePublisher;
pub use topics::{response_topic, DEFAULT_EVENT_TOPIC};
pub use wire::{DeviceEvent, DeviceResponse};
