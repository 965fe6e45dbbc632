use thiserror::Error;

use super::client::BrokerError;

/// Outcome of a failed publish or shutdown.
///
/// Every variant means the record must be treated as possibly undelivered.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("could not connect to broker: {0}")]
    Connect(#[source] BrokerError),

    #[error("could not enqueue record for topic {topic} (key {key}): {source}")]
    Enqueue {
        topic: String,
        key: String,
        #[source]
        source: BrokerError,
    },

    #[error("was unable to flush after {attempts} attempts for topic {topic} (key {key}), messages might be lost")]
    Unconfirmed {
        topic: String,
        key: String,
        attempts: u32,
        #[source]
        last: Option<BrokerError>,
    },

    #[error("was unable to flush outstanding records at shutdown after {attempts} attempts, messages might be lost")]
    Drain {
        attempts: u32,
        #[source]
        last: Option<BrokerError>,
    },

    #[error("publisher has been shut down")]
    Closed,

    #[error("publisher lock poisoned")]
    LockPoisoned,
}

impl PublishError {
    /// True when the record reached the client but delivery was never
    /// confirmed, so it may or may not be on the topic.
    pub fn might_have_lost_messages(&self) -> bool {
        matches!(
            self,
            PublishError::Unconfirmed { .. } | PublishError::Drain { .. }
        )
    }
}
