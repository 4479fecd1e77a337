//! Reference capability providers
//!
//! Each domain module exposes a `functions` table. The engine never names a
//! capability itself; it only sees the registry built here.

pub mod arithmetic;
pub mod system;
pub mod text;

use fescall_core::{CapabilitiesConfig, Domain, Result};

use crate::registry::FunctionRegistry;

pub use system::SystemOptions;

/// Builds the capability table for a single domain
pub fn domain_registry(domain: Domain, config: &CapabilitiesConfig) -> Result<FunctionRegistry> {
    match domain {
        Domain::Arithmetic => FunctionRegistry::from_specs(arithmetic::functions()),
        Domain::System => FunctionRegistry::from_specs(system::functions(SystemOptions::from(config))),
        Domain::Text => FunctionRegistry::from_specs(text::functions()),
    }
}

/// Merges the tables of the requested domains into one registry
///
/// Repeated domains are registered once.
pub fn registry_for(domains: &[Domain], config: &CapabilitiesConfig) -> Result<FunctionRegistry> {
    let mut selected = domains.to_vec();
    selected.sort();
    selected.dedup();

    let mut registry = FunctionRegistry::new();
    for domain in selected {
        registry.merge(domain_registry(domain, config)?)?;
    }
    Ok(registry)
}
