//! Command bus routing and event bus propagation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use student_events::{
    Command, CommandBus, CommandError, CommandHandler, CommandKind, EventSubscriber,
    InMemoryBroker, ProduceRecord, RoutingError, Student, StudentEvent, SubscriberError,
};

use crate::support::{pipeline, TOPIC};

struct Counting(Arc<AtomicUsize>);

impl CommandHandler for Counting {
    fn kind(&self) -> CommandKind {
        CommandKind::ProduceRecord
    }

    fn handle(&self, _command: Command) -> Result<(), CommandError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// One command, one handler invocation
// ============================================================================

#[test]
fn single_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let bus = CommandBus::new()
        .register(Counting(Arc::clone(&calls)))
        .unwrap();

    bus.dispatch(ProduceRecord::new("{}", "1").into()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Unregistered command kind fails without invoking anything
// ============================================================================

#[test]
fn unregistered_command_fails() {
    let bus = CommandBus::new();

    let err = bus.dispatch(ProduceRecord::new("{}", "1").into()).unwrap_err();

    assert!(matches!(
        err,
        CommandError::Routing(RoutingError::Unrouted(CommandKind::ProduceRecord))
    ));
    assert!(bus.verify(CommandKind::ALL).is_err());
}

// ============================================================================
// Extra subscribers run after the publishing one, and only if it succeeded
// ============================================================================

struct Audit(Arc<AtomicUsize>);

impl EventSubscriber for Audit {
    fn subscribed_events(&self) -> &'static [&'static str] {
        &[StudentEvent::CREATED]
    }

    fn on_event(&self, _event: &StudentEvent) -> Result<(), SubscriberError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn publish_failure_aborts_later_subscribers() {
    let broker = InMemoryBroker::new();
    let audited = Arc::new(AtomicUsize::new(0));
    let mut pipeline = pipeline(&broker);
    pipeline.subscribe(Arc::new(Audit(Arc::clone(&audited))));
    let event = StudentEvent::created(Student::new(1, "Ana", "a@x.com", 20));

    pipeline.raise(&event).unwrap();
    assert_eq!(audited.load(Ordering::SeqCst), 1);

    broker.fail_next_flushes(u32::MAX);
    assert!(pipeline.raise(&event).is_err());
    assert_eq!(audited.load(Ordering::SeqCst), 1);
    assert_eq!(broker.records_for(TOPIC).len(), 1);
}
