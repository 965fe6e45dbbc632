//! Change notifications for the student service.
//!
//! Each committed create, update or delete raises a [`StudentEvent`]. The
//! [`StudentSubscriber`] encodes it as a JSON record keyed by the student's
//! id and submits a [`ProduceRecord`] command; the [`CommandBus`] routes it
//! to the [`ProduceRecordHandler`], whose [`MessagePublisher`] enqueues the
//! record and flushes with a bounded retry budget. A record that cannot be
//! confirmed surfaces as a [`PublishError`] all the way back to the caller.

mod command;
mod config;
mod event;
mod pipeline;
mod publisher;
mod record;
mod store;
mod student;
mod subscriber;

pub use command::{
    Command, CommandBus, CommandError, CommandHandler, CommandKind, ProduceRecord,
    ProduceRecordHandler, RoutingError,
};
pub use config::{BrokerConfig, ConfigError, FlushPolicy, PipelineConfig};
pub use event::{Action, EventBus, EventBusError, EventSubscriber, StudentEvent};
pub use pipeline::{Pipeline, PipelineError};
#[cfg(feature = "kafka")]
pub use publisher::{KafkaClient, KafkaConnector};
pub use publisher::{
    BrokerClient, BrokerConnector, BrokerError, BrokerRecord, InMemoryBroker, MessagePublisher,
    PublishError,
};
pub use record::{EncodeError, EncodedRecord, RecordEncoder, StudentRecord};
pub use store::{Notify, StoreError, StudentStore};
pub use student::{NewStudent, Student};
pub use subscriber::{StudentSubscriber, SubscriberError};
