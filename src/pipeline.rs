//! Wires the notification pipeline together.
//!
//! ```text
//! raise(event) → EventBus → StudentSubscriber → CommandBus
//!              → ProduceRecordHandler → MessagePublisher → broker
//! ```
//!
//! Every stage runs on the caller's thread; `raise` returns only after the
//! record is confirmed or the flush budget is spent.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::command::{CommandBus, CommandKind, ProduceRecordHandler, RoutingError};
use crate::config::{ConfigError, PipelineConfig};
use crate::event::{EventBus, EventBusError, EventSubscriber, StudentEvent};
use crate::publisher::{BrokerConnector, MessagePublisher, PublishError};
use crate::store::Notify;
use crate::subscriber::StudentSubscriber;

#[cfg(feature = "kafka")]
use crate::publisher::KafkaConnector;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("command bus wiring is incomplete: {0}")]
    Routing(#[from] RoutingError),
}

pub struct Pipeline<C: BrokerConnector> {
    config: PipelineConfig,
    publisher: Arc<MessagePublisher<C>>,
    commands: Arc<CommandBus>,
    events: EventBus,
}

impl<C: BrokerConnector + 'static> Pipeline<C> {
    /// Build and verify the pipeline. Nothing connects to the broker until
    /// the first event is raised.
    pub fn new(config: PipelineConfig, connector: C) -> Result<Self, PipelineError> {
        config.validate()?;

        let publisher = Arc::new(MessagePublisher::new(connector, config.flush.clone())?);
        let commands = CommandBus::new().register(ProduceRecordHandler::new(
            Arc::clone(&publisher),
            config.topic.clone(),
        ))?;
        commands.verify(CommandKind::ALL)?;
        let commands = Arc::new(commands);

        let events = EventBus::new()
            .with_subscriber(Arc::new(StudentSubscriber::new(Arc::clone(&commands))));

        info!(
            topic = %config.topic,
            max_attempts = config.flush.max_attempts,
            flush_timeout_ms = config.flush.timeout_ms,
            "notification pipeline ready"
        );

        Ok(Self {
            config,
            publisher,
            commands,
            events,
        })
    }

    /// Add a subscriber after the built-in one.
    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        self.events.subscribe(subscriber);
    }

    /// Entry point for the CRUD layer, called once per committed write.
    pub fn raise(&self, event: &StudentEvent) -> Result<(), EventBusError> {
        self.events.dispatch(event)
    }

    /// Flush outstanding records and close the broker client.
    pub fn shutdown(&self) -> Result<(), PublishError> {
        self.publisher.shutdown()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn publisher(&self) -> &MessagePublisher<C> {
        &self.publisher
    }

    pub fn command_bus(&self) -> &CommandBus {
        &self.commands
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }
}

#[cfg(feature = "kafka")]
impl Pipeline<KafkaConnector> {
    /// Pipeline publishing to Kafka with `config.broker`.
    pub fn kafka(config: PipelineConfig) -> Result<Self, PipelineError> {
        let connector = KafkaConnector::new(config.broker.clone());
        Self::new(config, connector)
    }
}

impl<C: BrokerConnector + 'static> Notify for Pipeline<C> {
    fn notify(&self, event: &StudentEvent) -> Result<(), EventBusError> {
        self.raise(event)
    }
}
