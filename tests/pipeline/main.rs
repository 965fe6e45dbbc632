//! Notification pipeline integration tests.
//!
//! Drives the full chain (store → event bus → subscriber → command bus →
//! handler → publisher) against the in-memory broker:
//! - record shape and keys
//! - per-student ordering
//! - flush retry budget
//! - failures surfacing to the writer

mod delivery;
mod dispatch;
mod lifecycle;
mod records;
mod support;
