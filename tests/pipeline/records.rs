//! What lands on the topic.

use serde_json::json;
use student_events::{InMemoryBroker, Student, StudentEvent, StudentRecord};

use crate::support::{body, pipeline, TOPIC};

// ============================================================================
// Created record carries the full snapshot and the student id as key
// ============================================================================

#[test]
fn created_record_payload_and_key() {
    let broker = InMemoryBroker::new();
    let pipeline = pipeline(&broker);

    pipeline
        .raise(&StudentEvent::created(Student::new(7, "Ana", "a@x.com", 20)))
        .unwrap();

    let records = broker.records_for(TOPIC);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "7");
    assert_eq!(
        body(&records[0]),
        json!({
            "student": {"id": 7, "name": "Ana", "email": "a@x.com", "age": 20},
            "action": "CREATED"
        })
    );
}

// ============================================================================
// Deleted record overrides the snapshot id with the explicit one
// ============================================================================

#[test]
fn deleted_record_uses_explicit_id() {
    let broker = InMemoryBroker::new();
    let pipeline = pipeline(&broker);

    let stale = Student::new(123, "Ana", "a@x.com", 20);
    pipeline.raise(&StudentEvent::deleted(stale, 7)).unwrap();

    let record = &broker.records_for(TOPIC)[0];
    assert_eq!(record.key, "7");

    let decoded = StudentRecord::decode(&record.payload).unwrap();
    assert_eq!(decoded.student, Student::new(7, "Ana", "a@x.com", 20));
    assert_eq!(body(record)["action"], "DELETED");
}

// ============================================================================
// Updated record
// ============================================================================

#[test]
fn updated_record_action() {
    let broker = InMemoryBroker::new();
    let pipeline = pipeline(&broker);

    pipeline
        .raise(&StudentEvent::updated(Student::new(2, "Bo", "b@x.com", 31)))
        .unwrap();

    let record = &broker.records_for(TOPIC)[0];
    assert_eq!(record.key, "2");
    assert_eq!(body(record)["action"], "UPDATED");
    assert_eq!(body(record)["student"]["age"], 31);
}
