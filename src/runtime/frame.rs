use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runtime::{CellId, task::TaskDescriptor};

/// A slot on the runner's operand stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Cell(CellId),
    /// A word pushed verbatim by `push`.
    Literal(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Cell(id) => write!(f, "cell {}", id),
            Operand::Literal(word) => write!(f, "literal `{}`", word),
        }
    }
}

/// The call descriptor a runner is assembling.
///
/// `shared_inputs`/`shared_outputs` count the leading cells that already
/// belong to an enqueued copy of this descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBuilder {
    pub descriptor: TaskDescriptor,
    pub shared_inputs: usize,
    pub shared_outputs: usize,
}

impl CallBuilder {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Resumable state of the function task being executed.
///
/// Together with the memory store and the task queue this is everything the
/// engine needs to pick up at the next command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub task: TaskDescriptor,
    pub ip: usize,
    pub stack: Vec<Operand>,
    pub call: CallBuilder,
}

impl Frame {
    pub fn new(task: TaskDescriptor) -> Self {
        Self {
            task,
            ip: 0,
            stack: Vec::new(),
            call: CallBuilder::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }
}
