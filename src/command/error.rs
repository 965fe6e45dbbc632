use thiserror::Error;

use crate::publisher::PublishError;

use super::produce_record::CommandKind;

/// Wiring defects in the command bus. Never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("no handler registered for command {0}")]
    Unrouted(CommandKind),

    #[error("a handler is already registered for command {0}")]
    DuplicateHandler(CommandKind),

    #[error("no handlers registered for commands {0:?}")]
    MissingRoutes(Vec<CommandKind>),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl CommandError {
    /// True for wiring defects rather than runtime delivery failures.
    pub fn is_routing(&self) -> bool {
        matches!(self, CommandError::Routing(_))
    }
}
