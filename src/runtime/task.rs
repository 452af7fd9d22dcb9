use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::Fault, runtime::CellId, runtime::memory::MemoryStore};

/// One pending or running invocation.
///
/// `name` is `None` only while a runner is still building the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub name: Option<String>,
    pub inputs: Vec<CellId>,
    pub outputs: Vec<CellId>,
}

impl TaskDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Every cell this task holds a reference on, inputs first.
    pub fn cells(&self) -> impl Iterator<Item = &CellId> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// A task is ready once all of its inputs are bound.
    pub fn is_ready(&self, memory: &MemoryStore) -> Result<bool, Fault> {
        for &input in &self.inputs {
            if !memory.is_bound(input)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Display for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inputs={:?} outputs={:?}",
            self.name(),
            self.inputs,
            self.outputs
        )
    }
}

/// Pending tasks in enqueue order.
///
/// Entries leave only through [`Self::remove`]; the scheduler never reorders
/// what stays behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskQueue {
    tasks: Vec<TaskDescriptor>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: TaskDescriptor) {
        self.tasks.push(task);
    }

    pub fn remove(&mut self, index: usize) -> TaskDescriptor {
        self.tasks.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&TaskDescriptor> {
        self.tasks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
