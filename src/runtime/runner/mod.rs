use crate::{
    error::Fault,
    runtime::{
        CellId,
        frame::{Frame, Operand},
        memory::{MemoryStore, ReadPolicy},
        task::TaskQueue,
    },
};

mod dispatch;

/// Command executor for one function task.
///
/// A runner only borrows its state: the frame, the memory store and the task
/// queue all stay owned by the engine, which builds a fresh runner for every
/// command it executes.
pub struct Runner<'a> {
    frame: &'a mut Frame,
    memory: &'a mut MemoryStore,
    tasks: &'a mut TaskQueue,
    read_policy: ReadPolicy,
}

impl<'a> Runner<'a> {
    pub fn new(
        frame: &'a mut Frame,
        memory: &'a mut MemoryStore,
        tasks: &'a mut TaskQueue,
        read_policy: ReadPolicy,
    ) -> Self {
        Self {
            frame,
            memory,
            tasks,
            read_policy,
        }
    }

    fn push(&mut self, operand: Operand) {
        self.frame.stack.push(operand);
    }

    fn pop(&mut self) -> Result<Operand, Fault> {
        self.frame.stack.pop().ok_or(Fault::StackUnderflow)
    }

    fn peek(&self) -> Result<&Operand, Fault> {
        self.frame.stack.last().ok_or(Fault::StackUnderflow)
    }

    fn pop_cell(&mut self) -> Result<CellId, Fault> {
        let operand = self.pop()?;
        expect_cell(&operand)
    }

    fn peek_cell(&self) -> Result<CellId, Fault> {
        expect_cell(self.peek()?)
    }

    fn pop_name(&mut self) -> Result<String, Fault> {
        match self.pop()? {
            Operand::Literal(word) => Ok(word),
            other => Err(Fault::OperandMismatch {
                expected: "a function name",
                found: other.to_string(),
            }),
        }
    }
}

fn expect_cell(operand: &Operand) -> Result<CellId, Fault> {
    match operand {
        Operand::Cell(id) => Ok(*id),
        other => Err(Fault::OperandMismatch {
            expected: "a cell id",
            found: other.to_string(),
        }),
    }
}
