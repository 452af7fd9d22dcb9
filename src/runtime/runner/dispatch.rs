use tracing::debug;

use crate::{
    error::Fault,
    runtime::{CellId, frame::Operand},
    syntax::Command,
};

use super::Runner;

impl Runner<'_> {
    /// Executes one command against the frame, store and queue.
    ///
    /// On a fault the frame may be left partially updated; faults are fatal to
    /// the run so nothing is rolled back.
    pub fn execute(&mut self, command: &Command) -> Result<(), Fault> {
        match command {
            Command::Dupl => {
                let top = self.peek()?.clone();
                self.push(top);
            }
            Command::DescCall => {
                self.frame.call.reset();
            }
            Command::Create => {
                let id = self.memory.allocate();
                self.push(Operand::Cell(id));
            }
            Command::Assign(value) => {
                let target = self.peek_cell()?;
                self.memory.bind(target, *value)?;
            }
            Command::AssignTop => {
                let source = self.pop_cell()?;
                let value = self.memory.read(source, self.read_policy)?;
                let target = self.peek_cell()?;
                self.memory.bind(target, value)?;
            }
            Command::Return => {
                let id = self.pop_cell()?;
                self.memory.incref(id)?;
                self.frame.call.descriptor.outputs.push(id);
            }
            Command::Input => {
                let id = self.pop_cell()?;
                self.memory.incref(id)?;
                self.frame.call.descriptor.inputs.push(id);
            }
            Command::Push(word) => {
                self.push(Operand::Literal(word.clone()));
            }
            Command::PushFunc => {
                let name = self.pop_name()?;
                self.enqueue_call(name)?;
            }
            Command::PushParam(index) => {
                let id = cell_at(&self.frame.task.inputs, *index)?;
                self.push(Operand::Cell(id));
            }
            Command::PushReturn(index) => {
                let id = cell_at(&self.frame.task.outputs, *index)?;
                self.push(Operand::Cell(id));
            }
        }
        Ok(())
    }

    /// Enqueues a copy of the accumulator under `name`.
    ///
    /// Cells already handed to an earlier copy gain one more reference, so
    /// each enqueued task owns a reference on every cell it lists.
    fn enqueue_call(&mut self, name: String) -> Result<(), Fault> {
        let call = &mut self.frame.call;
        let shared = call.descriptor.inputs[..call.shared_inputs]
            .iter()
            .chain(call.descriptor.outputs[..call.shared_outputs].iter());
        for &id in shared {
            self.memory.incref(id)?;
        }

        call.descriptor.name = Some(name);
        call.shared_inputs = call.descriptor.inputs.len();
        call.shared_outputs = call.descriptor.outputs.len();

        let task = call.descriptor.clone();
        debug!(task = %task, "enqueue");
        self.tasks.push(task);
        Ok(())
    }
}

fn cell_at(cells: &[CellId], index: usize) -> Result<CellId, Fault> {
    cells.get(index).copied().ok_or(Fault::IndexOutOfRange {
        index,
        len: cells.len(),
    })
}
