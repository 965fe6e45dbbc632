use serde::{Deserialize, Serialize};

use crate::student::Student;

/// Action tag written into every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Created,
    Updated,
    Deleted,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Created => "CREATED",
            Action::Updated => "UPDATED",
            Action::Deleted => "DELETED",
        }
    }
}

/// A student changed.
///
/// Each variant owns its snapshot, so later mutation of the caller's entity
/// cannot leak into an event that has already been constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StudentEvent {
    Created(Student),
    Updated(Student),
    /// The snapshot's own `id` may already have been cleared by the
    /// persistence layer; `id` is the identifier to trust.
    Deleted { student: Student, id: i64 },
}

impl StudentEvent {
    pub const CREATED: &'static str = "student.created";
    pub const UPDATED: &'static str = "student.updated";
    pub const DELETED: &'static str = "student.deleted";

    pub fn created(student: Student) -> Self {
        StudentEvent::Created(student)
    }

    pub fn updated(student: Student) -> Self {
        StudentEvent::Updated(student)
    }

    pub fn deleted(student: Student, id: i64) -> Self {
        StudentEvent::Deleted { student, id }
    }

    /// Event name subscribers register against.
    pub fn name(&self) -> &'static str {
        match self {
            StudentEvent::Created(_) => Self::CREATED,
            StudentEvent::Updated(_) => Self::UPDATED,
            StudentEvent::Deleted { .. } => Self::DELETED,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            StudentEvent::Created(_) => Action::Created,
            StudentEvent::Updated(_) => Action::Updated,
            StudentEvent::Deleted { .. } => Action::Deleted,
        }
    }

    /// The snapshot as it should be seen downstream.
    ///
    /// For deletions the explicit identifier is overlaid onto the snapshot.
    pub fn student(&self) -> Student {
        match self {
            StudentEvent::Created(student) | StudentEvent::Updated(student) => student.clone(),
            StudentEvent::Deleted { student, id } => student.with_id(*id),
        }
    }

    /// Identifier of the affected student.
    pub fn student_id(&self) -> i64 {
        match self {
            StudentEvent::Created(student) | StudentEvent::Updated(student) => student.id,
            StudentEvent::Deleted { id, .. } => *id,
        }
    }
}
