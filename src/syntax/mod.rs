pub mod command;
pub mod parser;
pub mod program;

pub use command::Command;
pub use parser::{Parser, parse};
pub use program::{Function, Program};
