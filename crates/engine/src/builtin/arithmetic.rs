use crate::coercion::number_pair;
use crate::function::{ArgKind, FunctionSpec, Value};

/// Arithmetic capabilities
pub fn functions() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec::new("add", "Add two numbers", ArgKind::NumberPair, |args| {
            let (a, b) = number_pair(args)?;
            Ok(Value::Number(a + b))
        }),
        FunctionSpec::new("subtract", "Subtract the second number from the first", ArgKind::NumberPair, |args| {
            let (a, b) = number_pair(args)?;
            Ok(Value::Number(a - b))
        }),
    ]
}
