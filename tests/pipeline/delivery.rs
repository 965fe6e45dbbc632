//! Flush retry budget and ordering guarantees.

use std::time::Duration;

use student_events::{
    BrokerError, CommandError, FlushPolicy, InMemoryBroker, PublishError, Student,
    StudentEvent, SubscriberError,
};

use crate::support::{pipeline, pipeline_with, TOPIC};

fn created(id: i64) -> StudentEvent {
    StudentEvent::created(Student::new(id, "Ana", "a@x.com", 20))
}

// ============================================================================
// Flush failing k < 10 times then succeeding makes exactly k + 1 calls
// ============================================================================

#[test]
fn recovers_within_budget() {
    for k in 0..10 {
        let broker = InMemoryBroker::new();
        broker.fail_next_flushes(k);

        pipeline(&broker).raise(&created(1)).unwrap();

        assert_eq!(broker.flush_calls(), k + 1, "k = {k}");
        assert_eq!(broker.records_for(TOPIC).len(), 1);
    }
}

// ============================================================================
// Flush failing 10 times is a hard failure with no 11th attempt
// ============================================================================

#[test]
fn fails_after_ten_attempts() {
    let broker = InMemoryBroker::new();
    broker.fail_next_flushes(u32::MAX);

    let err = pipeline(&broker).raise(&created(1)).unwrap_err();

    assert_eq!(broker.flush_calls(), 10);
    assert!(broker.records_for(TOPIC).is_empty());
    assert_eq!(broker.pending().len(), 1);

    match err.subscriber_error() {
        SubscriberError::Command(CommandError::Publish(publish)) => {
            assert!(publish.might_have_lost_messages());
            assert!(matches!(publish, PublishError::Unconfirmed { attempts: 10, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// A record the broker drops is a failure, not a silent success
// ============================================================================

#[test]
fn dropped_record_fails_the_raise() {
    let broker = InMemoryBroker::new();
    broker.fail_next_deliveries(1);

    let err = pipeline(&broker).raise(&created(1)).unwrap_err();

    assert_eq!(broker.flush_calls(), 1);
    assert!(broker.records_for(TOPIC).is_empty());
    match err.subscriber_error() {
        SubscriberError::Command(CommandError::Publish(publish)) => {
            assert!(publish.might_have_lost_messages());
            assert!(matches!(
                publish,
                PublishError::Unconfirmed {
                    attempts: 1,
                    last: Some(BrokerError::Delivery(_)),
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Each flush attempt uses the configured timeout
// ============================================================================

#[test]
fn flush_policy_from_config() {
    let broker = InMemoryBroker::new();
    broker.fail_next_flushes(u32::MAX);
    let policy = FlushPolicy::default()
        .with_max_attempts(2)
        .with_timeout(Duration::from_millis(250));

    let err = pipeline_with(&broker, policy).raise(&created(1)).unwrap_err();

    assert_eq!(broker.flush_calls(), 2);
    assert!(err.to_string().contains("messages might be lost"));
}

// ============================================================================
// Records about one student stay in raise order within their partition
// ============================================================================

#[test]
fn same_student_records_keep_order() {
    let broker = InMemoryBroker::with_partitions(4);
    let pipeline = pipeline(&broker);
    let ana = Student::new(42, "Ana", "a@x.com", 20);

    pipeline.raise(&StudentEvent::created(ana.clone())).unwrap();
    pipeline.raise(&created(8)).unwrap();
    pipeline
        .raise(&StudentEvent::updated(Student { age: 21, ..ana.clone() }))
        .unwrap();
    pipeline.raise(&StudentEvent::deleted(ana, 42)).unwrap();

    let partition = broker.partition_for("42");
    let actions: Vec<String> = broker
        .partition(TOPIC, partition)
        .iter()
        .filter(|r| r.key == "42")
        .map(|r| crate::support::body(r)["action"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(actions, vec!["CREATED", "UPDATED", "DELETED"]);
}

// ============================================================================
// The broker connection is opened once and reused
// ============================================================================

#[test]
fn connection_is_reused() {
    let broker = InMemoryBroker::new();
    let pipeline = pipeline(&broker);

    for id in 1..=5 {
        pipeline.raise(&created(id)).unwrap();
    }

    assert_eq!(broker.connect_calls(), 1);
    assert_eq!(broker.poll_calls(), 5);
    assert_eq!(broker.flush_calls(), 5);
}

// ============================================================================
// After shutdown, raising fails loudly
// ============================================================================

#[test]
fn raise_after_shutdown_fails() {
    let broker = InMemoryBroker::new();
    let pipeline = pipeline(&broker);
    pipeline.raise(&created(1)).unwrap();

    pipeline.shutdown().unwrap();

    let err = pipeline.raise(&created(2)).unwrap_err();
    assert!(matches!(
        err.subscriber_error(),
        SubscriberError::Command(CommandError::Publish(PublishError::Closed))
    ));
    assert_eq!(broker.records_for(TOPIC).len(), 1);
}

// ============================================================================
// Shutdown with an unconfirmed record spends the flush budget and reports it
// ============================================================================

#[test]
fn shutdown_reports_unconfirmed_records() {
    let broker = InMemoryBroker::new();
    let pipeline = pipeline(&broker);
    broker.fail_next_flushes(u32::MAX);
    assert!(pipeline.raise(&created(1)).is_err());

    let err = pipeline.shutdown().unwrap_err();

    assert_eq!(broker.flush_calls(), 20);
    assert_eq!(broker.pending().len(), 1);
    assert!(err.might_have_lost_messages());
    assert!(matches!(err, PublishError::Drain { attempts: 10, .. }));
}
