use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runtime::Value;

/// A single runner instruction, decoded at parse time.
///
/// The set is closed: every name the runner understands has exactly one
/// variant here, and its parameters are already typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// `dupl`: duplicate the top of the operand stack.
    Dupl,
    /// `desccall`: reset the call accumulator.
    DescCall,
    /// `create`: allocate an unbound cell and push its id.
    Create,
    /// `assign V`: bind `V` into the cell on top of the stack, leaving it there.
    Assign(Value),
    /// `assign_top`: pop a cell, copy its value into the cell now on top.
    AssignTop,
    /// `return`: pop a cell into the accumulator outputs.
    Return,
    /// `input`: pop a cell into the accumulator inputs.
    Input,
    /// `push V`: push a literal word verbatim.
    Push(String),
    /// `push_func`: pop a name and enqueue the accumulator under it.
    PushFunc,
    /// `push_param I`: push the owning task's `I`th input cell.
    PushParam(usize),
    /// `push_return I`: push the owning task's `I`th output cell.
    PushReturn(usize),
}

/// Why a tokenized line could not become a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown,
    Arity { expected: usize, found: usize },
    InvalidParameter { expected: &'static str, found: String },
}

impl Command {
    /// Decodes a command name and its raw parameters.
    pub fn parse(name: &str, params: &[&str]) -> Result<Command, CommandError> {
        let command = match name {
            "dupl" => nullary(params, Command::Dupl)?,
            "desccall" => nullary(params, Command::DescCall)?,
            "create" => nullary(params, Command::Create)?,
            "assign_top" => nullary(params, Command::AssignTop)?,
            "return" => nullary(params, Command::Return)?,
            "input" => nullary(params, Command::Input)?,
            "push_func" => nullary(params, Command::PushFunc)?,
            "assign" => {
                let raw = unary(params)?;
                let value = raw.parse::<Value>().map_err(|_| CommandError::InvalidParameter {
                    expected: "an integer literal",
                    found: raw.to_string(),
                })?;
                Command::Assign(value)
            }
            "push" => Command::Push(unary(params)?.to_string()),
            "push_param" => Command::PushParam(index(unary(params)?)?),
            "push_return" => Command::PushReturn(index(unary(params)?)?),
            _ => return Err(CommandError::Unknown),
        };
        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Dupl => "dupl",
            Command::DescCall => "desccall",
            Command::Create => "create",
            Command::Assign(_) => "assign",
            Command::AssignTop => "assign_top",
            Command::Return => "return",
            Command::Input => "input",
            Command::Push(_) => "push",
            Command::PushFunc => "push_func",
            Command::PushParam(_) => "push_param",
            Command::PushReturn(_) => "push_return",
        }
    }
}

fn nullary(params: &[&str], command: Command) -> Result<Command, CommandError> {
    if !params.is_empty() {
        return Err(CommandError::Arity {
            expected: 0,
            found: params.len(),
        });
    }
    Ok(command)
}

fn unary<'a>(params: &[&'a str]) -> Result<&'a str, CommandError> {
    match params {
        [single] => Ok(*single),
        _ => Err(CommandError::Arity {
            expected: 1,
            found: params.len(),
        }),
    }
}

fn index(raw: &str) -> Result<usize, CommandError> {
    raw.parse::<usize>()
        .map_err(|_| CommandError::InvalidParameter {
            expected: "a non-negative index",
            found: raw.to_string(),
        })
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Assign(value) => write!(f, "assign {}", value),
            Command::Push(word) => write!(f, "push {}", word),
            Command::PushParam(idx) => write!(f, "push_param {}", idx),
            Command::PushReturn(idx) => write!(f, "push_return {}", idx),
            other => f.write_str(other.name()),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown => f.write_str("unknown command"),
            CommandError::Arity { expected, found } => {
                write!(f, "expected {} parameter(s), found {}", expected, found)
            }
            CommandError::InvalidParameter { expected, found } => {
                write!(f, "expected {}, found `{}`", expected, found)
            }
        }
    }
}
