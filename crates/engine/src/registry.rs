use std::collections::HashMap;
use fescall_core::{Error, Result};

use crate::function::FunctionSpec;

/// Registry that maps capability names to their specs
///
/// Built once at startup and handed to the dispatcher, which only ever reads
/// it. Lookup is exact and case-sensitive.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionSpec>,
}

impl FunctionRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self { functions: HashMap::new() }
    }

    /// Builds a registry from a provider's table
    pub fn from_specs(specs: impl IntoIterator<Item = FunctionSpec>) -> Result<Self> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    /// Registers a new capability
    ///
    /// Returns error if the name is not a lowercase identifier or is already taken
    pub fn register(&mut self, spec: FunctionSpec) -> Result<()> {
        let name = spec.name().to_string();

        if !is_lowercase_identifier(&name) {
            return Err(Error::Validation(format!(
                "function name '{}' must match [a-z_][a-z0-9_]*",
                name
            )));
        }

        if self.functions.contains_key(&name) {
            return Err(Error::Validation(format!("function '{}' already registered", name)));
        }

        self.functions.insert(name, spec);
        Ok(())
    }

    /// Moves every capability of `other` into this registry
    pub fn merge(&mut self, other: FunctionRegistry) -> Result<()> {
        for (_, spec) in other.functions {
            self.register(spec)?;
        }
        Ok(())
    }

    /// Gets a capability by name
    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name)
    }

    /// Checks if a capability exists
    pub fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns names of all registered capabilities, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns all specs sorted by name
    pub fn specs(&self) -> Vec<&FunctionSpec> {
        let mut specs: Vec<&FunctionSpec> = self.functions.values().collect();
        specs.sort_by(|a, b| a.name().cmp(b.name()));
        specs
    }

    /// Returns the number of registered capabilities
    pub fn count(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn is_lowercase_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first == '_' => {
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    }
}
