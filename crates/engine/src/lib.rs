//! Directive execution engine
//!
//! Scans text for `CALL: name(args)` directives, coerces their arguments to
//! the kinds a capability declares, dispatches them against a registry and
//! renders one result line per directive.

pub mod arguments;
pub mod builtin;
pub mod coercion;
pub mod directive;
pub mod dispatcher;
pub mod function;
pub mod registry;
pub mod result_formatting;

pub use arguments::parse_arguments;
pub use builtin::{SystemOptions, domain_registry, registry_for};
pub use coercion::{Argument, CoercionError, coerce};
pub use directive::{Directive, DirectiveScanner, scan};
pub use dispatcher::{CallError, CallOutcome, CallRecord, Dispatcher, RunReport};
pub use function::{ArgKind, CapabilityResult, FunctionSpec, Value};
pub use registry::FunctionRegistry;
pub use result_formatting::OutputFormatter;
