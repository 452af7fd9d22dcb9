use tracing::{debug, trace};

use crate::{
    error::{Error, Fault, Result},
    primop::{Primitives, StdPrimitives, primitive_key},
    runtime::{
        Value,
        frame::Frame,
        memory::{MemoryStore, ReadPolicy},
        runner::Runner,
        task::{TaskDescriptor, TaskQueue},
    },
    syntax::Program,
};

mod snapshot;

pub use snapshot::{SNAPSHOT_VERSION, Snapshot};

/// Conventional name of the entry-point function.
pub const ENTRY_POINT: &str = "#main";

/// What a single call to [`Engine::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A primitive task ran to completion.
    Primitive { name: String },
    /// One command of a function task ran; `ip` is its index in the body.
    Command { task: String, ip: usize },
    /// A function task ran out of commands and released its cells.
    Finished { task: String },
    /// Tasks are pending but none has all of its inputs bound.
    Stalled { pending: usize },
    /// Nothing is running and the queue is empty.
    Done,
}

impl Step {
    /// `false` once the engine cannot move on by itself.
    pub fn made_progress(&self) -> bool {
        !matches!(self, Step::Stalled { .. } | Step::Done)
    }
}

/// How a driven run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { steps: u64 },
    /// Halted with tasks that can never become ready.
    Stalled { steps: u64, pending: usize },
}

/// Dataflow scheduler and owner of all run state.
///
/// The engine is either idle (`frame` is `None`) or running one function
/// task. Memory store, task queue and frame together determine everything
/// that happens next, which is what [`Snapshot`] captures.
pub struct Engine<P: Primitives = StdPrimitives> {
    program: Program,
    primitives: P,
    memory: MemoryStore,
    tasks: TaskQueue,
    frame: Option<Frame>,
    read_policy: ReadPolicy,
    steps: u64,
}

enum Target {
    Primitive(String),
    Function,
}

impl<P: Primitives> Engine<P> {
    /// Creates an idle engine with an empty queue.
    pub fn new(program: Program, primitives: P) -> Self {
        Self {
            program,
            primitives,
            memory: MemoryStore::new(),
            tasks: TaskQueue::new(),
            frame: None,
            read_policy: ReadPolicy::default(),
            steps: 0,
        }
    }

    /// Enqueues a task for `name` with no inputs or outputs.
    pub fn seed(&mut self, name: &str) {
        self.tasks.push(TaskDescriptor::new(name));
    }

    pub fn set_read_policy(&mut self, policy: ReadPolicy) {
        self.read_policy = policy;
    }

    pub fn read_policy(&self) -> ReadPolicy {
        self.read_policy
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn primitives(&self) -> &P {
        &self.primitives
    }

    pub fn primitives_mut(&mut self) -> &mut P {
        &mut self.primitives
    }

    pub fn into_primitives(self) -> P {
        self.primitives
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.frame.is_none()
    }

    /// Number of steps that made progress so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Performs one unit of work.
    ///
    /// When idle, this dispatches the first ready task. A primitive runs to
    /// completion; a function task starts running and executes its first
    /// command in the same step. When running, it executes the next command,
    /// or finishes the task once the body is exhausted.
    pub fn step(&mut self) -> Result<Step> {
        if self.frame.is_none() {
            if self.tasks.is_empty() {
                return Ok(Step::Done);
            }
            let Some(index) = self.next_ready_task()? else {
                return Ok(Step::Stalled {
                    pending: self.tasks.len(),
                });
            };
            let task = self.tasks.remove(index);
            debug!(task = %task, "running");

            match self.resolve(&task)? {
                Target::Primitive(key) => {
                    self.run_primitive(&key, &task)?;
                    self.finish(&task);
                    self.steps += 1;
                    return Ok(Step::Primitive {
                        name: task.name().to_string(),
                    });
                }
                Target::Function => self.frame = Some(Frame::new(task)),
            }
        }

        let step = self.advance()?;
        self.steps += 1;
        Ok(step)
    }

    /// Steps until the queue drains or no task can become ready.
    pub fn run(&mut self) -> Result<RunOutcome> {
        loop {
            match self.step()? {
                Step::Done => return Ok(RunOutcome::Completed { steps: self.steps }),
                Step::Stalled { pending } => {
                    return Ok(RunOutcome::Stalled {
                        steps: self.steps,
                        pending,
                    });
                }
                _ => {}
            }
        }
    }

    fn next_ready_task(&self) -> Result<Option<usize>> {
        for (index, task) in self.tasks.iter().enumerate() {
            let ready = task.is_ready(&self.memory).map_err(|fault| Error::Dispatch {
                task: task.name().to_string(),
                fault,
            })?;
            if ready {
                return Ok(Some(index));
            }
            debug!(task = %task, "skip not ready");
        }
        Ok(None)
    }

    /// Prefixed names try the primitive table first; bare names try the
    /// function table first and fall back to a primitive of the same name.
    fn resolve(&self, task: &TaskDescriptor) -> Result<Target> {
        let name = task.name();
        if let Some(key) = primitive_key(name)
            && self.primitives.has(key)
        {
            return Ok(Target::Primitive(key.to_string()));
        }
        if self.program.contains(name) {
            return Ok(Target::Function);
        }
        if primitive_key(name).is_none() && self.primitives.has(name) {
            return Ok(Target::Primitive(name.to_string()));
        }
        Err(Error::UnknownFunction {
            name: name.to_string(),
        })
    }

    fn run_primitive(&mut self, key: &str, task: &TaskDescriptor) -> Result<()> {
        let dispatch_err = |fault: Fault| Error::Dispatch {
            task: task.name().to_string(),
            fault,
        };

        let values = task
            .inputs
            .iter()
            .map(|&id| self.memory.read(id, self.read_policy))
            .collect::<std::result::Result<Vec<Value>, _>>()
            .map_err(dispatch_err)?;

        let results = self
            .primitives
            .invoke(key, &values)
            .map_err(|message| Error::PrimitiveFailed {
                name: task.name().to_string(),
                message,
            })?;
        if results.len() < task.outputs.len() {
            return Err(Error::PrimitiveFailed {
                name: task.name().to_string(),
                message: format!(
                    "returned {} value(s) for {} output(s)",
                    results.len(),
                    task.outputs.len()
                ),
            });
        }
        debug!(primitive = key, ?values, ?results, "primitive returned");

        for (&id, &value) in task.outputs.iter().zip(results.iter()) {
            self.memory.bind(id, value).map_err(dispatch_err)?;
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<Step> {
        let Some(frame) = self.frame.as_mut() else {
            return Ok(Step::Done);
        };
        let function = self
            .program
            .get(frame.name())
            .ok_or_else(|| Error::UnknownFunction {
                name: frame.name().to_string(),
            })?;

        let ip = frame.ip;
        let Some(command) = function.commands.get(ip) else {
            let task = frame.task.clone();
            self.frame = None;
            self.finish(&task);
            return Ok(Step::Finished {
                task: task.name().to_string(),
            });
        };

        trace!(task = frame.name(), ip, %command, "exec");
        let mut runner = Runner::new(frame, &mut self.memory, &mut self.tasks, self.read_policy);
        runner.execute(command).map_err(|fault| Error::Command {
            task: frame.name().to_string(),
            ip,
            command: command.to_string(),
            fault,
        })?;
        frame.ip += 1;

        Ok(Step::Command {
            task: frame.name().to_string(),
            ip,
        })
    }

    /// Releases the task's cells and sweeps the store.
    fn finish(&mut self, task: &TaskDescriptor) {
        self.memory.release(task.cells());
        let collected = self.memory.collect();
        debug!(task = %task, collected = collected.len(), "finished");
    }
}

#[cfg(test)]
mod snapshot_test;
