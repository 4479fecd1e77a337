use thiserror::Error;
use tracing::{debug, info};

use crate::arguments::parse_arguments;
use crate::coercion::{Argument, CoercionError, coerce};
use crate::directive::{Directive, scan};
use crate::function::Value;
use crate::registry::FunctionRegistry;

/// Classified failure of a single directive
///
/// None of these abort a run; each becomes one output line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// Name not present in the registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong arity or unparsable value
    #[error(transparent)]
    ArgumentCoercion(#[from] CoercionError),

    /// The capability itself reported a failure
    #[error("{0}")]
    Implementation(String),
}

impl CallError {
    /// Stable identifier for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::UnknownFunction(_) => "unknown_function",
            CallError::ArgumentCoercion(_) => "argument_coercion",
            CallError::Implementation(_) => "implementation",
        }
    }
}

/// Per-directive result of dispatch
pub type CallOutcome = std::result::Result<Value, CallError>;

/// Everything known about one dispatched directive
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    /// Directive name as written in the text
    pub name: String,
    /// Byte offset of the directive in the source text
    pub position: usize,
    /// Coerced arguments; empty when coercion did not succeed
    pub arguments: Vec<Argument>,
    pub outcome: CallOutcome,
}

impl CallRecord {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Records of one run, in scan order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub records: Vec<CallRecord>,
}

impl RunReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn successes(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.len() - self.successes()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallRecord> {
        self.records.iter()
    }
}

/// Dispatches directives to the capabilities of a registry
///
/// For each directive the dispatcher:
/// - Looks the name up in the registry
/// - Splits and coerces the raw arguments to the declared kind
/// - Invokes the capability
///
/// A failure at any step is captured in that directive's record and
/// processing continues with the next directive.
pub struct Dispatcher {
    registry: FunctionRegistry,
}

impl Dispatcher {
    /// Creates a new dispatcher that owns the given registry
    pub fn new(registry: FunctionRegistry) -> Self {
        Self { registry }
    }

    /// Gets a reference to the underlying registry
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Dispatches a single directive
    pub fn dispatch(&self, directive: &Directive<'_>) -> CallRecord {
        let mut record = CallRecord {
            name: directive.name.to_string(),
            position: directive.position,
            arguments: Vec::new(),
            outcome: Err(CallError::UnknownFunction(directive.name.to_string())),
        };

        let Some(spec) = self.registry.get(directive.name) else {
            debug!(function = directive.name, position = directive.position, "unknown function");
            return record;
        };

        let arguments = match coerce(spec.arg_kind(), parse_arguments(directive.raw_args)) {
            Ok(arguments) => arguments,
            Err(err) => {
                debug!(function = directive.name, position = directive.position, error = %err, "argument coercion failed");
                record.outcome = Err(err.into());
                return record;
            }
        };

        record.outcome = spec.invoke(&arguments).map_err(CallError::Implementation);
        record.arguments = arguments;

        match &record.outcome {
            Ok(_) => debug!(function = directive.name, position = directive.position, "call succeeded"),
            Err(err) => {
                debug!(function = directive.name, position = directive.position, error = %err, "capability failed")
            }
        }

        record
    }

    /// Scans `text` and dispatches every directive in order
    pub fn run(&self, text: &str) -> RunReport {
        let records: Vec<CallRecord> = scan(text).map(|directive| self.dispatch(&directive)).collect();
        let report = RunReport { records };

        info!(
            directives = report.len(),
            succeeded = report.successes(),
            failed = report.failures(),
            "run complete"
        );

        report
    }
}

impl From<FunctionRegistry> for Dispatcher {
    fn from(registry: FunctionRegistry) -> Self {
        Self::new(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::number_pair;
    use crate::function::{ArgKind, FunctionSpec};

    fn setup_dispatcher() -> Dispatcher {
        let specs = vec![
            FunctionSpec::new("add", "Add two numbers", ArgKind::NumberPair, |args| {
                let (a, b) = number_pair(args)?;
                Ok(Value::Number(a + b))
            }),
            FunctionSpec::new("ping", "Reply with pong", ArgKind::None, |_| Ok(Value::Text("pong".to_string()))),
            FunctionSpec::new("fail", "Always fails", ArgKind::String, |args| {
                Err(format!("cannot handle {}", args[0]))
            }),
        ];
        Dispatcher::new(FunctionRegistry::from_specs(specs).unwrap())
    }

    fn directive<'a>(name: &'a str, raw_args: &'a str) -> Directive<'a> {
        Directive { name, raw_args, position: 0 }
    }

    #[test]
    fn test_dispatch_success() {
        let dispatcher = setup_dispatcher();
        let record = dispatcher.dispatch(&directive("add", "2, 3"));
        assert!(record.is_success());
        assert_eq!(record.outcome, Ok(Value::Number(5.0)));
        assert_eq!(record.arguments, vec![Argument::number(2.0), Argument::number(3.0)]);
    }

    #[test]
    fn test_dispatch_zero_args() {
        let dispatcher = setup_dispatcher();
        let record = dispatcher.dispatch(&directive("ping", "  "));
        assert_eq!(record.outcome, Ok(Value::Text("pong".to_string())));
        assert!(record.arguments.is_empty());
    }

    #[test]
    fn test_dispatch_unknown_function() {
        let dispatcher = setup_dispatcher();
        let record = dispatcher.dispatch(&directive("bogus", "1"));
        assert_eq!(record.outcome, Err(CallError::UnknownFunction("bogus".to_string())));
        assert_eq!(record.outcome.as_ref().unwrap_err().kind(), "unknown_function");
    }

    #[test]
    fn test_dispatch_coercion_error() {
        let dispatcher = setup_dispatcher();

        let record = dispatcher.dispatch(&directive("add", "2"));
        let err = record.outcome.unwrap_err();
        assert_eq!(err.kind(), "argument_coercion");
        assert_eq!(err.to_string(), "wrong number of arguments");

        let record = dispatcher.dispatch(&directive("ping", "extra"));
        assert_eq!(record.outcome.unwrap_err().to_string(), "unexpected arguments");
    }

    #[test]
    fn test_dispatch_implementation_error() {
        let dispatcher = setup_dispatcher();
        let record = dispatcher.dispatch(&directive("fail", "\"x\""));
        let err = record.outcome.as_ref().unwrap_err();
        assert_eq!(err.kind(), "implementation");
        assert_eq!(err.to_string(), "cannot handle x");
        assert_eq!(record.arguments, vec![Argument::Text("x".to_string())]);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let dispatcher = setup_dispatcher();
        let record = dispatcher.dispatch(&directive("ADD", "1, 2"));
        assert!(matches!(record.outcome, Err(CallError::UnknownFunction(_))));
    }

    #[test]
    fn test_run_isolates_failures() {
        let dispatcher = setup_dispatcher();
        let text = "CALL: add(2) then CALL: bogus() then CALL: fail(x) then CALL: add(4, 5)";
        let report = dispatcher.run(text);

        assert_eq!(report.len(), 4);
        assert_eq!(report.failures(), 3);
        assert_eq!(report.successes(), 1);
        assert_eq!(report.records[3].outcome, Ok(Value::Number(9.0)));

        let names: Vec<_> = report.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["add", "bogus", "fail", "add"]);
    }

    #[test]
    fn test_run_records_positions() {
        let dispatcher = setup_dispatcher();
        let text = "xx CALL: ping() yy CALL: ping()";
        let report = dispatcher.run(text);
        assert_eq!(report.records[0].position, 3);
        assert_eq!(report.records[1].position, 19);
    }

    #[test]
    fn test_run_empty_text() {
        let dispatcher = setup_dispatcher();
        let report = dispatcher.run("nothing to do here");
        assert!(report.is_empty());
        assert_eq!(report.failures(), 0);
    }

    #[test]
    fn test_from_registry() {
        let registry = FunctionRegistry::new();
        let dispatcher: Dispatcher = registry.into();
        assert_eq!(dispatcher.registry().count(), 0);
    }
}
