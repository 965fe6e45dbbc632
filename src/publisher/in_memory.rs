//! In-memory broker for testing and single-process hosts.
//!
//! Behaves like a keyed, partitioned topic log:
//! - enqueued records wait in an unconfirmed buffer
//! - a successful flush confirms them, assigning per-partition offsets
//! - the partition is a stable hash of the key, so records sharing a key
//!   stay in enqueue order
//!
//! Flush timeouts, lost deliveries and refused connections can be scripted
//! to exercise the publisher's retry path.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::client::{BrokerClient, BrokerConnector, BrokerError};

const DEFAULT_PARTITIONS: u32 = 3;

/// A record confirmed (or waiting to be confirmed) by the broker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerRecord {
    pub topic: String,
    pub key: String,
    pub payload: Vec<u8>,
    pub partition: u32,
    /// Offset within the partition; `None` until confirmed.
    pub offset: Option<u64>,
}

impl BrokerRecord {
    /// Get the payload as a string (if valid UTF-8).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

#[derive(Default)]
struct State {
    pending: Vec<BrokerRecord>,
    log: Vec<BrokerRecord>,
    offsets: HashMap<(String, u32), u64>,
    failing_flushes: u32,
    failing_deliveries: u32,
    refuse_connections: bool,
    connect_calls: u32,
    poll_calls: u32,
    flush_calls: u32,
}

/// Shared in-memory broker.
///
/// Clones share the same log, so a test keeps one handle for inspection and
/// hands another to the publisher as its connector.
///
/// ```
/// use student_events::{BrokerClient, BrokerConnector, InMemoryBroker};
/// use std::time::Duration;
///
/// let broker = InMemoryBroker::new();
/// let mut client = broker.connect().unwrap();
/// client.enqueue("students", "7", b"{}").unwrap();
/// assert!(broker.records().is_empty());
///
/// client.flush(Duration::from_secs(1)).unwrap();
/// assert_eq!(broker.records()[0].offset, Some(0));
/// ```
#[derive(Clone)]
pub struct InMemoryBroker {
    state: Arc<Mutex<State>>,
    partitions: u32,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::with_partitions(DEFAULT_PARTITIONS)
    }

    /// Create a broker whose topics have `partitions` partitions (at least one).
    pub fn with_partitions(partitions: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            partitions: partitions.max(1),
        }
    }

    /// Partition a key is assigned to.
    pub fn partition_for(&self, key: &str) -> u32 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % u64::from(self.partitions)) as u32
    }

    /// Make the next `count` flush calls time out.
    pub fn fail_next_flushes(&self, count: u32) {
        self.inspect().failing_flushes = count;
    }

    /// Make the next `count` flush calls drop every outstanding record and
    /// report it as undeliverable.
    pub fn fail_next_deliveries(&self, count: u32) {
        self.inspect().failing_deliveries = count;
    }

    /// Refuse (or accept again) new connections.
    pub fn refuse_connections(&self, refuse: bool) {
        self.inspect().refuse_connections = refuse;
    }

    /// All confirmed records in confirmation order.
    pub fn records(&self) -> Vec<BrokerRecord> {
        self.inspect().log.clone()
    }

    /// Confirmed records for one topic.
    pub fn records_for(&self, topic: &str) -> Vec<BrokerRecord> {
        self.inspect()
            .log
            .iter()
            .filter(|r| r.topic == topic)
            .cloned()
            .collect()
    }

    /// Confirmed records in one partition of a topic, in offset order.
    pub fn partition(&self, topic: &str, partition: u32) -> Vec<BrokerRecord> {
        self.inspect()
            .log
            .iter()
            .filter(|r| r.topic == topic && r.partition == partition)
            .cloned()
            .collect()
    }

    /// Records enqueued but not yet confirmed.
    pub fn pending(&self) -> Vec<BrokerRecord> {
        self.inspect().pending.clone()
    }

    pub fn connect_calls(&self) -> u32 {
        self.inspect().connect_calls
    }

    pub fn poll_calls(&self) -> u32 {
        self.inspect().poll_calls
    }

    pub fn flush_calls(&self) -> u32 {
        self.inspect().flush_calls
    }

    /// Clear all records, counters and scripted failures.
    pub fn clear(&self) {
        *self.inspect() = State::default();
    }

    // Inspection never fails: a panic in another test thread should not hide
    // what was recorded.
    fn inspect(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, BrokerError> {
        self.state
            .lock()
            .map_err(|_| BrokerError::Broker("in-memory broker lock poisoned".to_string()))
    }
}

impl BrokerConnector for InMemoryBroker {
    type Client = InMemoryBroker;

    fn connect(&self) -> Result<Self::Client, BrokerError> {
        let mut state = self.state()?;
        state.connect_calls += 1;
        if state.refuse_connections {
            return Err(BrokerError::Connect("connection refused".to_string()));
        }
        Ok(self.clone())
    }
}

impl BrokerClient for InMemoryBroker {
    fn enqueue(&mut self, topic: &str, key: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let partition = self.partition_for(key);
        self.state()?.pending.push(BrokerRecord {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_vec(),
            partition,
            offset: None,
        });
        Ok(())
    }

    fn poll(&mut self, _timeout: Duration) {
        if let Ok(mut state) = self.state() {
            state.poll_calls += 1;
        }
    }

    fn flush(&mut self, timeout: Duration) -> Result<(), BrokerError> {
        let mut state = self.state()?;
        state.flush_calls += 1;

        if state.failing_flushes > 0 {
            state.failing_flushes -= 1;
            return Err(BrokerError::FlushTimeout(timeout));
        }

        if state.failing_deliveries > 0 {
            state.failing_deliveries -= 1;
            let dropped = std::mem::take(&mut state.pending);
            return Err(BrokerError::Delivery(format!(
                "{} record(s) expired before acknowledgement",
                dropped.len()
            )));
        }

        let pending = std::mem::take(&mut state.pending);
        for mut record in pending {
            let next = state
                .offsets
                .entry((record.topic.clone(), record.partition))
                .or_insert(0);
            record.offset = Some(*next);
            *next += 1;
            state.log.push(record);
        }
        Ok(())
    }
}
