use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::Fault,
    runtime::{CellId, Value},
};

/// How [`MemoryStore::read`] treats a cell that was never bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadPolicy {
    /// Return the undefined scalar (`0`).
    #[default]
    Lenient,
    /// Fail with [`Fault::UnboundRead`].
    Strict,
}

/// One addressable, reference-counted memory unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub bound: bool,
    pub value: Value,
    pub refs: usize,
}

/// Integer-addressed cell store with sweep-based reclamation.
///
/// Cells are never freed on decref; they are removed only by [`Self::collect`],
/// which the engine runs each time a task finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    cells: BTreeMap<CellId, Cell>,
    total_allocations: usize,
    total_collections: usize,
    total_collected: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unbound cell with no references.
    ///
    /// The id is one past the highest live id, so ids of collected cells may
    /// come back once nothing above them is live.
    pub fn allocate(&mut self) -> CellId {
        let id = self
            .cells
            .last_key_value()
            .map(|(&id, _)| id + 1)
            .unwrap_or(1);
        self.cells.insert(id, Cell::default());
        self.total_allocations += 1;
        id
    }

    /// Binds a value, overwriting any previous binding.
    pub fn bind(&mut self, id: CellId, value: Value) -> Result<(), Fault> {
        let cell = self.cell_mut(id)?;
        cell.value = value;
        cell.bound = true;
        Ok(())
    }

    pub fn read(&self, id: CellId, policy: ReadPolicy) -> Result<Value, Fault> {
        let cell = self.cell(id)?;
        match (cell.bound, policy) {
            (true, _) => Ok(cell.value),
            (false, ReadPolicy::Lenient) => Ok(Value::default()),
            (false, ReadPolicy::Strict) => Err(Fault::UnboundRead(id)),
        }
    }

    pub fn is_bound(&self, id: CellId) -> Result<bool, Fault> {
        Ok(self.cell(id)?.bound)
    }

    pub fn incref(&mut self, id: CellId) -> Result<(), Fault> {
        self.cell_mut(id)?.refs += 1;
        Ok(())
    }

    /// Drops one reference.
    ///
    /// Counts never go below zero. A decref of an unreferenced cell is an
    /// engine bug; it is logged at `warn` and leaves the count at zero.
    pub fn decref(&mut self, id: CellId) -> Result<(), Fault> {
        let cell = self.cell_mut(id)?;
        if cell.refs == 0 {
            warn!(cell = id, "decref of cell with no references");
            return Ok(());
        }
        cell.refs -= 1;
        Ok(())
    }

    /// Drops one reference for every listed cell.
    ///
    /// Missing cells are skipped: release runs as part of collection, which
    /// never fails.
    pub fn release<'a>(&mut self, ids: impl IntoIterator<Item = &'a CellId>) {
        for &id in ids {
            if self.decref(id).is_err() {
                debug!(cell = id, "release of missing cell");
            }
        }
    }

    /// Removes every cell with no outstanding references.
    ///
    /// Returns the removed ids in ascending order.
    pub fn collect(&mut self) -> Vec<CellId> {
        let garbage: Vec<CellId> = self
            .cells
            .iter()
            .filter(|(_, cell)| cell.refs == 0)
            .map(|(&id, _)| id)
            .collect();

        for id in &garbage {
            self.cells.remove(id);
            debug!(cell = *id, "garbage");
        }

        self.total_collections += 1;
        self.total_collected += garbage.len();
        garbage
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains_key(&id)
    }

    pub fn refs(&self, id: CellId) -> Option<usize> {
        self.cells.get(&id).map(|cell| cell.refs)
    }

    /// Live cells in id order.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells.iter().map(|(&id, cell)| (id, cell))
    }

    /// Returns the number of currently live cells.
    pub fn live_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the total number of cells ever allocated.
    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }

    /// Returns the total number of completed collection passes.
    pub fn total_collections(&self) -> usize {
        self.total_collections
    }

    /// Returns the total number of cells removed by collection.
    pub fn total_collected(&self) -> usize {
        self.total_collected
    }

    fn cell(&self, id: CellId) -> Result<&Cell, Fault> {
        self.cells.get(&id).ok_or(Fault::DanglingReference(id))
    }

    fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell, Fault> {
        self.cells.get_mut(&id).ok_or(Fault::DanglingReference(id))
    }
}
