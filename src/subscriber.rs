//! Turns student events into `ProduceRecord` commands.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::command::{CommandBus, CommandError, ProduceRecord};
use crate::event::{EventSubscriber, StudentEvent};
use crate::record::{EncodeError, RecordEncoder};

#[derive(Debug, Error)]
pub enum SubscriberError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Encodes every created/updated/deleted event and submits exactly one
/// command per event. No batching, deduplication or buffering.
pub struct StudentSubscriber {
    encoder: RecordEncoder,
    commands: Arc<CommandBus>,
}

impl StudentSubscriber {
    const EVENTS: &'static [&'static str] = &[
        StudentEvent::CREATED,
        StudentEvent::UPDATED,
        StudentEvent::DELETED,
    ];

    pub fn new(commands: Arc<CommandBus>) -> Self {
        Self {
            encoder: RecordEncoder,
            commands,
        }
    }
}

impl EventSubscriber for StudentSubscriber {
    fn subscribed_events(&self) -> &'static [&'static str] {
        Self::EVENTS
    }

    fn on_event(&self, event: &StudentEvent) -> Result<(), SubscriberError> {
        let encoded = self.encoder.encode(event)?;
        debug!(
            event = event.name(),
            key = %encoded.key,
            "submitting produce record command"
        );
        self.commands.dispatch(ProduceRecord::from(encoded).into())?;
        Ok(())
    }
}
