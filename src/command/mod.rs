//! Commands and the bus that routes them to exactly one handler.
//!
//! Routes are registered at startup, one handler per [`CommandKind`].
//! `CommandBus::verify` rejects a wiring that leaves a kind unrouted before
//! the first command is ever dispatched.

mod bus;
mod error;
mod handler;
mod produce_record;

pub use bus::{CommandBus, CommandHandler};
pub use error::{CommandError, RoutingError};
pub use handler::ProduceRecordHandler;
pub use produce_record::{Command, CommandKind, ProduceRecord};
