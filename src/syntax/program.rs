use std::{collections::HashMap, fmt};

use sha2::{Digest, Sha256};

use crate::syntax::command::Command;

/// A named, ordered command body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub commands: Vec<Command>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// The function table of a parsed program.
///
/// Functions keep their source order for listings; lookups go through a
/// name index so tasks never copy a body.
#[derive(Debug, Clone, Default)]
pub struct Program {
    functions: Vec<Function>,
    index: HashMap<String, usize>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function, handing it back if the name is already taken.
    pub fn insert(&mut self, function: Function) -> Result<(), Function> {
        if self.index.contains_key(&function.name) {
            return Err(function);
        }
        self.index.insert(function.name.clone(), self.functions.len());
        self.functions.push(function);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.index.get(name).map(|&idx| &self.functions[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// SHA-256 of the canonical listing.
    ///
    /// Comments, blank lines and spacing do not change the fingerprint.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.to_string().as_bytes());
        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    pub fn fingerprint_hex(&self) -> String {
        to_hex(&self.fingerprint())
    }
}

fn to_hex(bytes: &[u8; 32]) -> String {
    let mut out = String::with_capacity(64);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in &self.functions {
            writeln!(f, "start {}", function.name)?;
            for command in &function.commands {
                writeln!(f, "  {}", command)?;
            }
            writeln!(f, "finish")?;
        }
        Ok(())
    }
}
