use std::io::{self, Write};

use crate::runtime::Value;

/// Task names starting with this marker are looked up as primitives.
pub const PRIMITIVE_PREFIX: &str = "#_intrin_";

/// Strips the primitive marker, returning the capability key.
pub fn primitive_key(name: &str) -> Option<&str> {
    name.strip_prefix(PRIMITIVE_PREFIX)
}

/// Pluggable set of built-in operations.
///
/// Primitives map the values of a task's inputs to the values bound into its
/// outputs, by position. They run to completion inside a single step.
pub trait Primitives {
    fn has(&self, name: &str) -> bool;

    fn invoke(&mut self, name: &str, values: &[Value]) -> Result<Vec<Value>, String>;
}

pub type PrimitiveFn = fn(&[Value], &mut dyn Write) -> Result<Vec<Value>, String>;

#[derive(Clone, Copy)]
pub struct PrimitiveFunction {
    pub name: &'static str,
    /// Number of input values the function expects.
    pub arity: usize,
    pub func: PrimitiveFn,
}

/// The standard primitive table.
pub static PRIMITIVES: &[PrimitiveFunction] = &[
    PrimitiveFunction {
        name: "add",
        arity: 2,
        func: primitive_add,
    },
    PrimitiveFunction {
        name: "mul",
        arity: 2,
        func: primitive_mul,
    },
    PrimitiveFunction {
        name: "putstring",
        arity: 1,
        func: primitive_putstring,
    },
];

pub fn get_primitive(name: &str) -> Option<&'static PrimitiveFunction> {
    PRIMITIVES.iter().find(|p| p.name == name)
}

fn primitive_add(args: &[Value], _out: &mut dyn Write) -> Result<Vec<Value>, String> {
    let (a, b) = (args[0], args[1]);
    a.checked_add(b)
        .map(|sum| vec![sum])
        .ok_or_else(|| format!("integer overflow in {} + {}", a, b))
}

fn primitive_mul(args: &[Value], _out: &mut dyn Write) -> Result<Vec<Value>, String> {
    let (a, b) = (args[0], args[1]);
    a.checked_mul(b)
        .map(|product| vec![product])
        .ok_or_else(|| format!("integer overflow in {} * {}", a, b))
}

fn primitive_putstring(args: &[Value], out: &mut dyn Write) -> Result<Vec<Value>, String> {
    writeln!(out, "{}", args[0]).map_err(|err| err.to_string())?;
    Ok(Vec::new())
}

/// [`Primitives`] backed by [`PRIMITIVES`], writing output to `W`.
pub struct StdPrimitives<W: Write = io::Stdout> {
    out: W,
}

impl StdPrimitives {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdPrimitives {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> StdPrimitives<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn into_writer(self) -> W {
        self.out
    }
}

impl<W: Write> Primitives for StdPrimitives<W> {
    fn has(&self, name: &str) -> bool {
        get_primitive(name).is_some()
    }

    fn invoke(&mut self, name: &str, values: &[Value]) -> Result<Vec<Value>, String> {
        let primitive =
            get_primitive(name).ok_or_else(|| format!("unknown primitive `{}`", name))?;
        if values.len() != primitive.arity {
            return Err(format!(
                "{} expects {} input(s), got {}",
                primitive.name,
                primitive.arity,
                values.len()
            ));
        }
        (primitive.func)(values, &mut self.out)
    }
}
