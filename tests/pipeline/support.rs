//! Shared fixtures for the pipeline suite.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use student_events::{
    BrokerRecord, FlushPolicy, InMemoryBroker, NewStudent, Pipeline, PipelineConfig,
    StudentStore,
};

pub const TOPIC: &str = "students";

pub fn pipeline(broker: &InMemoryBroker) -> Pipeline<InMemoryBroker> {
    Pipeline::new(PipelineConfig::default(), broker.clone()).unwrap()
}

pub fn pipeline_with(broker: &InMemoryBroker, flush: FlushPolicy) -> Pipeline<InMemoryBroker> {
    let config = PipelineConfig::default().with_flush_policy(flush);
    Pipeline::new(config, broker.clone()).unwrap()
}

pub fn store(broker: &InMemoryBroker) -> StudentStore<Arc<Pipeline<InMemoryBroker>>> {
    StudentStore::new(Arc::new(pipeline(broker)))
}

pub fn ana() -> NewStudent {
    NewStudent::new("Ana", "a@x.com", 20)
}

pub fn body(record: &BrokerRecord) -> Value {
    serde_json::from_slice(&record.payload).unwrap()
}

/// (key, action) for every confirmed record on the students topic.
pub fn key_actions(broker: &InMemoryBroker) -> Vec<(String, String)> {
    broker
        .records_for(TOPIC)
        .iter()
        .map(|r| {
            let action = body(r)["action"].as_str().unwrap().to_string();
            (r.key.clone(), action)
        })
        .collect()
}
