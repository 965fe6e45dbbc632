//! Message publisher and the broker clients it drives.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  MessagePublisher<C>                         │
//! │  - lazily connects once, reuses the client                  │
//! │  - publish(): enqueue → poll(0) → flush × max_attempts      │
//! │  - shutdown(): final flush, then drop the client            │
//! └─────────────────────────────────────────────────────────────┘
//!                            │ BrokerConnector / BrokerClient
//!              ┌─────────────┴──────────────┐
//!              ▼                            ▼
//!     ┌─────────────────┐         ┌──────────────────────┐
//!     │ InMemoryBroker  │         │ KafkaConnector       │
//!     │ (included)      │         │ (feature = "kafka")  │
//!     └─────────────────┘         └──────────────────────┘
//! ```

mod client;
mod error;
mod in_memory;
#[cfg(feature = "kafka")]
mod kafka;
mod message_publisher;

pub use client::{BrokerClient, BrokerConnector, BrokerError};
pub use error::PublishError;
pub use in_memory::{BrokerRecord, InMemoryBroker};
#[cfg(feature = "kafka")]
pub use kafka::{KafkaClient, KafkaConnector};
pub use message_publisher::MessagePublisher;
