//! Store writes driving the pipeline end to end.

use student_events::{InMemoryBroker, NewStudent, StoreError};

use crate::support::{ana, body, key_actions, store, TOPIC};

// ============================================================================
// create → update → delete yields CREATED, UPDATED, DELETED keyed "1"
// ============================================================================

#[test]
fn create_update_delete_scenario() {
    let broker = InMemoryBroker::new();
    let store = store(&broker);

    let created = store.create(ana()).unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(key_actions(&broker), vec![("1".to_string(), "CREATED".to_string())]);

    store
        .update(1, NewStudent::new("Ana Maria", "a@x.com", 21))
        .unwrap();
    store.delete(1).unwrap();

    assert_eq!(
        key_actions(&broker),
        vec![
            ("1".to_string(), "CREATED".to_string()),
            ("1".to_string(), "UPDATED".to_string()),
            ("1".to_string(), "DELETED".to_string()),
        ]
    );

    let records = broker.records_for(TOPIC);
    assert_eq!(body(&records[1])["student"]["name"], "Ana Maria");
    // The deleted snapshot has lost its id in the store; the record has not.
    assert_eq!(body(&records[2])["student"]["id"], 1);
    assert_eq!(broker.flush_calls(), 3);
}

// ============================================================================
// A broker outage turns a stored write into a reported failure
// ============================================================================

#[test]
fn broker_outage_fails_the_write() {
    let broker = InMemoryBroker::new();
    broker.refuse_connections(true);
    let store = store(&broker);

    let err = store.create(ana()).unwrap_err();

    assert!(matches!(err, StoreError::Notification(_)));
    // The write itself went through.
    assert_eq!(store.get(1).unwrap().unwrap().name, "Ana");
    assert!(broker.records().is_empty());

    broker.refuse_connections(false);
    store.update(1, ana()).unwrap();
    assert_eq!(key_actions(&broker), vec![("1".to_string(), "UPDATED".to_string())]);
}

// ============================================================================
// Failed lookups raise no events
// ============================================================================

#[test]
fn missing_student_publishes_nothing() {
    let broker = InMemoryBroker::new();
    let store = store(&broker);

    assert!(matches!(store.delete(5), Err(StoreError::NotFound(5))));
    assert_eq!(broker.connect_calls(), 0);
    assert!(broker.records().is_empty());
}
