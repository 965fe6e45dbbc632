//! Student snapshot carried by domain events.

use serde::{Deserialize, Serialize};

/// An immutable copy of a student's fields at the moment an event was raised.
///
/// Field order matters: it is the order the fields appear in the encoded
/// record (`id`, `name`, `email`, `age`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
}

impl Student {
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>, age: i64) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            age,
        }
    }

    /// Copy of this snapshot with the identifier replaced.
    pub fn with_id(&self, id: i64) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// Partition key for records about this student.
    pub fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Writable student attributes, as accepted by the store on create and update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub age: i64,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }

    pub(crate) fn into_student(self, id: i64) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            age: self.age,
        }
    }
}
