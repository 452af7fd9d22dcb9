use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    primop::Primitives,
    runtime::{
        frame::Frame,
        memory::{MemoryStore, ReadPolicy},
        task::TaskQueue,
    },
    syntax::Program,
};

use super::Engine;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable image of an engine between two steps.
///
/// `program` is the hex fingerprint of the function table the state was
/// produced by; a snapshot only resumes against that same program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub program: String,
    pub read_policy: ReadPolicy,
    pub steps: u64,
    pub memory: MemoryStore,
    pub tasks: TaskQueue,
    pub frame: Option<Frame>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Snapshot> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<P: Primitives> Engine<P> {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            program: self.program.fingerprint_hex(),
            read_policy: self.read_policy,
            steps: self.steps,
            memory: self.memory.clone(),
            tasks: self.tasks.clone(),
            frame: self.frame.clone(),
        }
    }

    /// Rebuilds an engine from a snapshot taken against `program`.
    pub fn resume(program: Program, primitives: P, snapshot: Snapshot) -> Result<Self> {
        let expected = program.fingerprint_hex();
        if snapshot.program != expected {
            return Err(Error::SnapshotMismatch {
                expected,
                found: snapshot.program,
            });
        }
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::SnapshotMismatch {
                expected: format!("version {}", SNAPSHOT_VERSION),
                found: format!("version {}", snapshot.version),
            });
        }

        Ok(Self {
            program,
            primitives,
            memory: snapshot.memory,
            tasks: snapshot.tasks,
            frame: snapshot.frame,
            read_policy: snapshot.read_policy,
            steps: snapshot.steps,
        })
    }
}
