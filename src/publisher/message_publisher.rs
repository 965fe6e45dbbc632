//! Publishes one record to one topic and insists on delivery confirmation.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, FlushPolicy};

use super::client::{BrokerClient, BrokerConnector, BrokerError};
use super::error::PublishError;

enum Connection<T> {
    Idle,
    Open(T),
    Closed,
}

/// Owns the broker client for the whole process.
///
/// The client is created on the first publish and reused afterwards. All
/// access goes through one mutex, so enqueue and flush of one record never
/// interleave with another caller's.
///
/// ## Example
///
/// ```
/// use student_events::{FlushPolicy, InMemoryBroker, MessagePublisher};
///
/// let broker = InMemoryBroker::new();
/// let publisher = MessagePublisher::new(broker.clone(), FlushPolicy::default())?;
///
/// publisher.publish("students", "7", br#"{"action":"CREATED"}"#)?;
/// assert_eq!(broker.records_for("students").len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MessagePublisher<C: BrokerConnector> {
    connector: C,
    policy: FlushPolicy,
    connection: Mutex<Connection<C::Client>>,
}

impl<C: BrokerConnector> MessagePublisher<C> {
    /// Fails when `policy` allows no flush attempt at all.
    pub fn new(connector: C, policy: FlushPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self {
            connector,
            policy,
            connection: Mutex::new(Connection::Idle),
        })
    }

    pub fn flush_policy(&self) -> &FlushPolicy {
        &self.policy
    }

    /// Whether a client is currently open.
    pub fn is_connected(&self) -> bool {
        self.lock()
            .map(|conn| matches!(*conn, Connection::Open(_)))
            .unwrap_or(false)
    }

    /// Deliver `payload` to `topic` under `key`.
    ///
    /// Enqueues once, serves delivery reports without blocking, then flushes
    /// up to `max_attempts` times. Flush never re-enqueues, so retrying it
    /// cannot duplicate the record. A failure the broker reports as final
    /// (see [`BrokerError::is_retryable`]) ends the loop early.
    pub fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), PublishError> {
        let mut conn = self.lock()?;
        let client = self.client(&mut conn)?;

        debug!(topic, key, bytes = payload.len(), "enqueueing record");
        client
            .enqueue(topic, key, payload)
            .map_err(|source| PublishError::Enqueue {
                topic: topic.to_string(),
                key: key.to_string(),
                source,
            })?;
        client.poll(Duration::ZERO);

        match flush_with_retry(client, &self.policy) {
            Ok(attempts) => {
                debug!(topic, key, attempts, "record confirmed");
                Ok(())
            }
            Err((attempts, last)) => {
                error!(
                    topic,
                    key,
                    attempts,
                    "was unable to flush, messages might be lost"
                );
                Err(PublishError::Unconfirmed {
                    topic: topic.to_string(),
                    key: key.to_string(),
                    attempts,
                    last,
                })
            }
        }
    }

    /// Flush whatever is outstanding and close the client.
    ///
    /// Later publishes fail with [`PublishError::Closed`].
    pub fn shutdown(&self) -> Result<(), PublishError> {
        let mut conn = self.lock()?;
        let previous = std::mem::replace(&mut *conn, Connection::Closed);
        drop(conn);

        let Connection::Open(mut client) = previous else {
            info!("publisher shut down without an open connection");
            return Ok(());
        };

        let result =
            flush_with_retry(&mut client, &self.policy).map_err(|(attempts, last)| {
                error!(attempts, "outstanding records unconfirmed at shutdown");
                PublishError::Drain { attempts, last }
            });
        drop(client);
        info!("publisher shut down");
        result.map(|_| ())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection<C::Client>>, PublishError> {
        self.connection
            .lock()
            .map_err(|_| PublishError::LockPoisoned)
    }

    fn client<'a>(
        &self,
        conn: &'a mut Connection<C::Client>,
    ) -> Result<&'a mut C::Client, PublishError> {
        if let Connection::Idle = *conn {
            let client = self.connector.connect().map_err(|err| {
                warn!(error = %err, "broker connection failed");
                PublishError::Connect(err)
            })?;
            info!("broker connection established");
            *conn = Connection::Open(client);
        }

        match conn {
            Connection::Open(client) => Ok(client),
            Connection::Idle | Connection::Closed => Err(PublishError::Closed),
        }
    }
}

/// Flush until confirmed, the attempt budget is spent, or the broker reports
/// a failure that waiting cannot fix.
///
/// Returns the number of flush calls made, with the last flush error on
/// failure.
fn flush_with_retry<T: BrokerClient>(
    client: &mut T,
    policy: &FlushPolicy,
) -> Result<u32, (u32, Option<BrokerError>)> {
    let timeout = policy.timeout();
    let mut last = None;
    let mut attempts = 0;

    while attempts < policy.max_attempts {
        attempts += 1;
        match client.flush(timeout) {
            Ok(()) => return Ok(attempts),
            Err(err) if !err.is_retryable() => {
                warn!(attempt = attempts, error = %err, "flush failed permanently");
                return Err((attempts, Some(err)));
            }
            Err(err) => {
                warn!(
                    attempt = attempts,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "flush failed"
                );
                last = Some(err);
            }
        }
    }

    Err((attempts, last))
}
