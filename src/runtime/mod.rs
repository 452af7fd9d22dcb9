//! Runtime core: cells, tasks, the command runner and the scheduler.
//!
//! # Reference-count invariant
//! A cell's `refs` equals the number of roles it plays in enqueued tasks,
//! the running task and descriptors under construction:
//! - `input`/`return` add one role when a cell joins an accumulator.
//! - Enqueueing the same accumulator again adds one role per cell it already
//!   listed.
//! - A finishing task (primitive or function) drops exactly one role per
//!   listed cell, then the whole store is swept for cells with no roles.
//!
//! Cells that a function leaves in an accumulator it never enqueues keep
//! their roles and are never collected.

pub mod engine;
pub mod frame;
pub mod memory;
pub mod runner;
pub mod task;

/// Address of a memory cell. Ids start at 1.
pub type CellId = u64;

/// The scalar stored in a bound cell.
pub type Value = i64;

#[cfg(test)]
mod memory_test;
