//! Domain events raised by the CRUD layer and the in-process bus that
//! multicasts them to subscribers.
//!
//! ```text
//! store write ──► EventBus::dispatch(event)
//!                      │  (registration order, calling thread)
//!                      ▼
//!               EventSubscriber::on_event
//! ```
//!
//! The bus is a direct multicast: nothing is queued, persisted or retried.
//! The first subscriber error aborts the remaining subscribers for that
//! event and is returned to the caller of `dispatch`.

mod bus;
mod error;
mod student_event;

pub use bus::{EventBus, EventSubscriber};
pub use error::EventBusError;
pub use student_event::{Action, StudentEvent};
