use std::sync::Arc;

use crate::publisher::{BrokerConnector, MessagePublisher};

use super::bus::CommandHandler;
use super::error::CommandError;
use super::produce_record::{Command, CommandKind};

/// Publishes `ProduceRecord` commands to a fixed topic.
pub struct ProduceRecordHandler<C: BrokerConnector> {
    publisher: Arc<MessagePublisher<C>>,
    topic: String,
}

impl<C: BrokerConnector> ProduceRecordHandler<C> {
    pub fn new(publisher: Arc<MessagePublisher<C>>, topic: impl Into<String>) -> Self {
        Self {
            publisher,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl<C: BrokerConnector> CommandHandler for ProduceRecordHandler<C> {
    fn kind(&self) -> CommandKind {
        CommandKind::ProduceRecord
    }

    fn handle(&self, command: Command) -> Result<(), CommandError> {
        let Command::ProduceRecord(cmd) = command;
        self.publisher
            .publish(&self.topic, cmd.key(), cmd.record().as_bytes())?;
        Ok(())
    }
}
