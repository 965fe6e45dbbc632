use std::fmt;

use crate::record::EncodedRecord;

/// Tag identifying a command variant for routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    ProduceRecord,
}

impl CommandKind {
    /// Every kind the system can issue.
    pub const ALL: &'static [CommandKind] = &[CommandKind::ProduceRecord];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::ProduceRecord => "produce_record",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publish a pre-encoded record under a partition key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProduceRecord {
    record: String,
    key: String,
}

impl ProduceRecord {
    pub fn new(record: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            key: key.into(),
        }
    }

    pub fn record(&self) -> &str {
        &self.record
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl From<EncodedRecord> for ProduceRecord {
    fn from(encoded: EncodedRecord) -> Self {
        Self::new(encoded.payload, encoded.key)
    }
}

/// Instruction submitted to the command bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    ProduceRecord(ProduceRecord),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::ProduceRecord(_) => CommandKind::ProduceRecord,
        }
    }

    /// Key used for partitioning and log correlation.
    pub fn key(&self) -> &str {
        match self {
            Command::ProduceRecord(cmd) => cmd.key(),
        }
    }
}

impl From<ProduceRecord> for Command {
    fn from(cmd: ProduceRecord) -> Self {
        Command::ProduceRecord(cmd)
    }
}
