use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error};

use super::error::{CommandError, RoutingError};
use super::produce_record::{Command, CommandKind};

/// Handles one kind of command.
pub trait CommandHandler: Send + Sync {
    /// The command kind this handler is registered for.
    fn kind(&self) -> CommandKind;

    fn handle(&self, command: Command) -> Result<(), CommandError>;
}

/// Synchronous single-dispatch command bus.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use student_events::{
///     CommandBus, CommandKind, FlushPolicy, InMemoryBroker, MessagePublisher, ProduceRecord,
///     ProduceRecordHandler,
/// };
///
/// let broker = InMemoryBroker::new();
/// let publisher = Arc::new(MessagePublisher::new(broker.clone(), FlushPolicy::default())?);
///
/// let bus = CommandBus::new()
///     .register(ProduceRecordHandler::new(publisher, "students"))?;
/// bus.verify(CommandKind::ALL)?;
///
/// bus.dispatch(ProduceRecord::new(r#"{"action":"CREATED"}"#, "7").into())?;
/// assert_eq!(broker.records_for("students")[0].key, "7");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Default)]
pub struct CommandBus {
    handlers: HashMap<CommandKind, Arc<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for its command kind.
    ///
    /// Uses builder pattern; fails if the kind already has a handler.
    pub fn register<H>(mut self, handler: H) -> Result<Self, RoutingError>
    where
        H: CommandHandler + 'static,
    {
        let kind = handler.kind();
        if self.handlers.contains_key(&kind) {
            return Err(RoutingError::DuplicateHandler(kind));
        }
        debug!(command = %kind, "registering command handler");
        self.handlers.insert(kind, Arc::new(handler));
        Ok(self)
    }

    /// Check that every kind in `required` has a handler.
    pub fn verify(&self, required: &[CommandKind]) -> Result<(), RoutingError> {
        let missing: Vec<CommandKind> = required
            .iter()
            .copied()
            .filter(|kind| !self.handlers.contains_key(kind))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RoutingError::MissingRoutes(missing))
        }
    }

    /// Hand `command` to its handler on the calling thread.
    pub fn dispatch(&self, command: Command) -> Result<(), CommandError> {
        let kind = command.kind();
        let handler = self.handlers.get(&kind).ok_or_else(|| {
            error!(command = %kind, "command dispatched without a registered handler");
            RoutingError::Unrouted(kind)
        })?;

        debug!(command = %kind, key = command.key(), "dispatching command");
        handler.handle(command)
    }

    /// Registered command kinds, sorted.
    pub fn routes(&self) -> Vec<CommandKind> {
        let mut kinds: Vec<_> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }
}
