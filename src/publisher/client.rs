//! Traits at the broker boundary.

use std::time::Duration;

use thiserror::Error;

/// Raw failure reported by a broker client.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("enqueue failed: {0}")]
    Enqueue(String),

    #[error("flush timed out after {0:?} with records still outstanding")]
    FlushTimeout(Duration),

    /// The broker gave up on a record it had accepted. Flushing again
    /// cannot bring it back.
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("broker error: {0}")]
    Broker(String),
}

impl BrokerError {
    /// Whether another flush call may still confirm the outstanding records.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BrokerError::FlushTimeout(_) | BrokerError::Broker(_))
    }
}

/// A connected producer handle.
///
/// Implementations are not required to be safe for concurrent use; the
/// publisher serializes every call.
pub trait BrokerClient: Send {
    /// Queue a record for `topic` without choosing a partition. Records that
    /// share a key must end up in the same partition.
    fn enqueue(&mut self, topic: &str, key: &str, payload: &[u8]) -> Result<(), BrokerError>;

    /// Serve delivery reports without blocking longer than `timeout`.
    fn poll(&mut self, timeout: Duration);

    /// Block until every outstanding record is confirmed or `timeout` elapses.
    ///
    /// Never re-enqueues anything, so calling it again only waits longer.
    fn flush(&mut self, timeout: Duration) -> Result<(), BrokerError>;
}

/// Opens a [`BrokerClient`]. Called at most once per successful connection.
pub trait BrokerConnector: Send + Sync {
    type Client: BrokerClient;

    fn connect(&self) -> Result<Self::Client, BrokerError>;
}
