use thiserror::Error;

use crate::subscriber::SubscriberError;

/// Error returned by `EventBus::dispatch`.
#[derive(Debug, Error)]
pub enum EventBusError {
    /// A subscriber failed; subscribers registered after it were not run.
    #[error("subscriber #{index} failed handling {event}: {source}")]
    Subscriber {
        event: &'static str,
        index: usize,
        #[source]
        source: SubscriberError,
    },
}

impl EventBusError {
    /// The subscriber error that aborted dispatch.
    pub fn subscriber_error(&self) -> &SubscriberError {
        match self {
            EventBusError::Subscriber { source, .. } => source,
        }
    }
}
