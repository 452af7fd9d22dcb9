//! Error types for parsing and execution.
//!
//! Every error is fatal to a run: the engine never retries or rolls back, it
//! hands the error back to the driver with enough context to locate it.

use thiserror::Error;

use crate::runtime::CellId;

pub type Result<T> = std::result::Result<T, Error>;

/// Faults raised while touching the operand stack or the memory store.
///
/// These carry no location of their own; the engine wraps them into
/// [`Error::Command`] or [`Error::Dispatch`] with the task that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("stack underflow")]
    StackUnderflow,

    #[error("dangling reference to cell {0}")]
    DanglingReference(CellId),

    #[error("index {index} out of range for {len} cell(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("read of unbound cell {0}")]
    UnboundRead(CellId),

    #[error("expected {expected}, found {found}")]
    OperandMismatch { expected: &'static str, found: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed program at line {line}: {reason}")]
    MalformedProgram { line: usize, reason: String },

    #[error("unknown command `{name}` at line {line}")]
    UnknownCommand { line: usize, name: String },

    #[error("no such function `{name}`")]
    UnknownFunction { name: String },

    #[error("task `{task}` failed at command {ip} (`{command}`)")]
    Command {
        task: String,
        ip: usize,
        command: String,
        #[source]
        fault: Fault,
    },

    #[error("task `{task}` could not be dispatched")]
    Dispatch {
        task: String,
        #[source]
        fault: Fault,
    },

    #[error("primitive `{name}` failed: {message}")]
    PrimitiveFailed { name: String, message: String },

    #[error("snapshot belongs to program {found}, expected {expected}")]
    SnapshotMismatch { expected: String, found: String },

    #[error("invalid snapshot")]
    Snapshot(#[from] serde_json::Error),
}

/// Flat classification of [`Error`], with command faults unwrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedProgram,
    UnknownFunction,
    UnknownCommand,
    StackUnderflow,
    DanglingReference,
    IndexOutOfRange,
    UnboundRead,
    OperandMismatch,
    PrimitiveFailed,
    SnapshotMismatch,
}

impl Fault {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Fault::StackUnderflow => ErrorKind::StackUnderflow,
            Fault::DanglingReference(_) => ErrorKind::DanglingReference,
            Fault::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Fault::UnboundRead(_) => ErrorKind::UnboundRead,
            Fault::OperandMismatch { .. } => ErrorKind::OperandMismatch,
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedProgram { .. } => ErrorKind::MalformedProgram,
            Error::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            Error::UnknownFunction { .. } => ErrorKind::UnknownFunction,
            Error::Command { fault, .. } | Error::Dispatch { fault, .. } => fault.kind(),
            Error::PrimitiveFailed { .. } => ErrorKind::PrimitiveFailed,
            Error::SnapshotMismatch { .. } | Error::Snapshot(_) => ErrorKind::SnapshotMismatch,
        }
    }

    /// Name of the task the error was raised in, when it has one.
    pub fn task(&self) -> Option<&str> {
        match self {
            Error::Command { task, .. } | Error::Dispatch { task, .. } => Some(task),
            Error::PrimitiveFailed { name, .. } | Error::UnknownFunction { name } => Some(name),
            _ => None,
        }
    }
}
