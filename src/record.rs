//! Wire format for student change records.
//!
//! A record is a JSON object with two top-level fields:
//!
//! ```text
//! {"student":{"id":7,"name":"Ana","email":"a@x.com","age":20},"action":"CREATED"}
//! ```
//!
//! keyed by the student's identifier as a string.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{Action, StudentEvent};
use crate::student::Student;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to encode record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Body of a record as it appears on the topic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student: Student,
    pub action: Action,
}

impl StudentRecord {
    pub fn from_event(event: &StudentEvent) -> Self {
        Self {
            student: event.student(),
            action: event.action(),
        }
    }

    /// Parse a record body read back from the topic.
    pub fn decode(payload: &[u8]) -> Result<Self, EncodeError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// A record ready to be wrapped in a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedRecord {
    pub key: String,
    pub payload: String,
}

/// Turns domain events into record bodies and partition keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordEncoder;

impl RecordEncoder {
    pub fn encode(&self, event: &StudentEvent) -> Result<EncodedRecord, EncodeError> {
        let record = StudentRecord::from_event(event);
        let payload = serde_json::to_string(&record)?;
        Ok(EncodedRecord {
            key: record.student.key(),
            payload,
        })
    }
}
