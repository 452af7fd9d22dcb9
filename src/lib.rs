pub mod error;
pub mod primop;
pub mod runtime;
pub mod syntax;

pub use error::{Error, ErrorKind, Fault, Result};
pub use primop::{Primitives, StdPrimitives};
pub use runtime::engine::{ENTRY_POINT, Engine, RunOutcome, Snapshot, Step};
pub use runtime::memory::ReadPolicy;
