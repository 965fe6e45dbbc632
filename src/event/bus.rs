//! Synchronous in-process event multicast.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::subscriber::SubscriberError;

use super::error::EventBusError;
use super::student_event::StudentEvent;

/// Something interested in student events.
pub trait EventSubscriber: Send + Sync {
    /// Event names (`StudentEvent::name`) this subscriber listens to.
    fn subscribed_events(&self) -> &'static [&'static str];

    /// Handle one event on the dispatching thread.
    fn on_event(&self, event: &StudentEvent) -> Result<(), SubscriberError>;
}

/// Dispatches events to subscribers by event name.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use student_events::{
///     CommandBus, EventBus, FlushPolicy, InMemoryBroker, MessagePublisher,
///     ProduceRecordHandler, Student, StudentEvent, StudentSubscriber,
/// };
///
/// let broker = InMemoryBroker::new();
/// let publisher = Arc::new(MessagePublisher::new(broker.clone(), FlushPolicy::default())?);
/// let commands = Arc::new(
///     CommandBus::new().register(ProduceRecordHandler::new(publisher, "students"))?,
/// );
///
/// let bus = EventBus::new().with_subscriber(Arc::new(StudentSubscriber::new(commands)));
/// bus.dispatch(&StudentEvent::created(Student::new(7, "Ana", "ana@example.com", 21)))?;
///
/// let records = broker.records_for("students");
/// assert_eq!(records[0].key, "7");
/// assert!(records[0].payload_str().unwrap().contains("CREATED"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: HashMap<&'static str, Vec<Arc<dyn EventSubscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber under every event name it declares.
    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        for &name in subscriber.subscribed_events() {
            debug!(event = name, "registering event subscriber");
            self.subscribers
                .entry(name)
                .or_default()
                .push(Arc::clone(&subscriber));
        }
    }

    /// Builder form of [`subscribe`](Self::subscribe).
    pub fn with_subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.subscribe(subscriber);
        self
    }

    /// Run every subscriber registered for `event`, in registration order.
    ///
    /// Stops at the first failing subscriber.
    pub fn dispatch(&self, event: &StudentEvent) -> Result<(), EventBusError> {
        let name = event.name();
        let Some(subscribers) = self.subscribers.get(name) else {
            debug!(event = name, "no subscribers registered");
            return Ok(());
        };

        debug!(event = name, subscribers = subscribers.len(), "dispatching event");
        for (index, subscriber) in subscribers.iter().enumerate() {
            if let Err(source) = subscriber.on_event(event) {
                warn!(event = name, index, error = %source, "subscriber failed, aborting dispatch");
                return Err(EventBusError::Subscriber {
                    event: name,
                    index,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Number of subscribers registered for an event name.
    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.subscribers.get(event_name).map_or(0, Vec::len)
    }
}
