//! In-memory student store that raises change events after each write.
//!
//! Stands in for the CRUD layer: it applies the write first and raises the
//! event second. A failed notification does not roll the write back; it is
//! reported as [`StoreError::Notification`] so the caller answers with a
//! failure instead of a silent success.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::event::{EventBus, EventBusError, StudentEvent};
use crate::student::{NewStudent, Student};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("student {0} not found")]
    NotFound(i64),

    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("change was stored but its notification failed: {0}")]
    Notification(#[from] EventBusError),
}

/// Receiver of raised events.
pub trait Notify: Send + Sync {
    fn notify(&self, event: &StudentEvent) -> Result<(), EventBusError>;
}

impl Notify for EventBus {
    fn notify(&self, event: &StudentEvent) -> Result<(), EventBusError> {
        self.dispatch(event)
    }
}

impl<T: Notify + ?Sized> Notify for Arc<T> {
    fn notify(&self, event: &StudentEvent) -> Result<(), EventBusError> {
        (**self).notify(event)
    }
}

pub struct StudentStore<N> {
    students: RwLock<BTreeMap<i64, Student>>,
    next_id: AtomicI64,
    notifier: N,
}

impl<N: Notify> StudentStore<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            students: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            notifier,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn create(&self, new: NewStudent) -> Result<Student, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let student = new.into_student(id);
        self.students
            .write()
            .map_err(|_| StoreError::LockPoisoned("create"))?
            .insert(id, student.clone());

        self.notifier
            .notify(&StudentEvent::created(student.clone()))?;
        Ok(student)
    }

    pub fn get(&self, id: i64) -> Result<Option<Student>, StoreError> {
        let students = self
            .students
            .read()
            .map_err(|_| StoreError::LockPoisoned("get"))?;
        Ok(students.get(&id).cloned())
    }

    /// All students ordered by id.
    pub fn list(&self) -> Result<Vec<Student>, StoreError> {
        let students = self
            .students
            .read()
            .map_err(|_| StoreError::LockPoisoned("list"))?;
        Ok(students.values().cloned().collect())
    }

    pub fn update(&self, id: i64, changes: NewStudent) -> Result<Student, StoreError> {
        let student = {
            let mut students = self
                .students
                .write()
                .map_err(|_| StoreError::LockPoisoned("update"))?;
            let slot = students.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            *slot = changes.into_student(id);
            slot.clone()
        };

        self.notifier
            .notify(&StudentEvent::updated(student.clone()))?;
        Ok(student)
    }

    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let removed = self
            .students
            .write()
            .map_err(|_| StoreError::LockPoisoned("delete"))?
            .remove(&id)
            .ok_or(StoreError::NotFound(id))?;

        // A removed entity no longer carries its identity.
        let detached = removed.with_id(0);
        self.notifier
            .notify(&StudentEvent::deleted(detached, id))?;
        Ok(())
    }
}
