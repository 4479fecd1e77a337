use std::fmt;

use crate::coercion::Argument;

/// Declared parameter shape of a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// No arguments
    None,
    /// One string, used verbatim
    String,
    /// Two strings (e.g. a haystack and a search term)
    StringPair,
    /// One decimal number
    Number,
    /// Two decimal numbers
    NumberPair,
}

impl ArgKind {
    /// Number of tokens this kind accepts
    pub fn arity(&self) -> usize {
        match self {
            ArgKind::None => 0,
            ArgKind::String | ArgKind::Number => 1,
            ArgKind::StringPair | ArgKind::NumberPair => 2,
        }
    }

    /// Whether tokens are coerced to numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, ArgKind::Number | ArgKind::NumberPair)
    }

    /// Parameter list as shown in capability listings, e.g. `number, number`
    pub fn signature(&self) -> &'static str {
        match self {
            ArgKind::None => "",
            ArgKind::String => "string",
            ArgKind::StringPair => "string, string",
            ArgKind::Number => "number",
            ArgKind::NumberPair => "number, number",
        }
    }
}

/// Value produced by a successful capability call
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Floating point result, printed without a fraction when integral
    Number(f64),
    /// Non-negative count
    Count(usize),
    /// Free text
    Text(String),
    /// Ordered list of names
    List(Vec<String>),
    /// Ordered `(word, count)` pairs
    Frequencies(Vec<(String, usize)>),
}

impl Value {
    /// JSON form used by the JSON Lines output
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Number(n) => serde_json::json!(n),
            Value::Count(n) => serde_json::json!(n),
            Value::Text(s) => serde_json::json!(s),
            Value::List(items) => serde_json::json!(items),
            Value::Frequencies(pairs) => serde_json::Value::Array(
                pairs
                    .iter()
                    .map(|(word, count)| serde_json::json!({ "word": word, "count": count }))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Count(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
            Value::Frequencies(pairs) => {
                let body = pairs
                    .iter()
                    .map(|(word, count)| format!("{}: {}", word, count))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", body)
            }
        }
    }
}

/// Result returned by a capability; the error text is reported verbatim
pub type CapabilityResult = std::result::Result<Value, String>;

/// Boxed capability body
pub type Implementation = Box<dyn Fn(&[Argument]) -> CapabilityResult + Send + Sync>;

/// A named, schema-typed capability
///
/// Specs are built by capability providers at startup and never change once
/// they are registered.
pub struct FunctionSpec {
    name: String,
    description: String,
    arg_kind: ArgKind,
    implementation: Implementation,
}

impl FunctionSpec {
    /// Creates a new spec
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, arg_kind: ArgKind, implementation: F) -> Self
    where
        F: Fn(&[Argument]) -> CapabilityResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            arg_kind,
            implementation: Box::new(implementation),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn arg_kind(&self) -> ArgKind {
        self.arg_kind
    }

    /// Runs the capability on already-coerced arguments
    pub fn invoke(&self, arguments: &[Argument]) -> CapabilityResult {
        (self.implementation)(arguments)
    }

    /// `name(kind)` line used by `--list`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.arg_kind.signature())
    }
}

impl fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("arg_kind", &self.arg_kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_kind_arity() {
        assert_eq!(ArgKind::None.arity(), 0);
        assert_eq!(ArgKind::String.arity(), 1);
        assert_eq!(ArgKind::Number.arity(), 1);
        assert_eq!(ArgKind::StringPair.arity(), 2);
        assert_eq!(ArgKind::NumberPair.arity(), 2);
        assert!(ArgKind::NumberPair.is_numeric());
        assert!(!ArgKind::StringPair.is_numeric());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Number(2.25).to_string(), "2.25");
        assert_eq!(Value::Count(7).to_string(), "7");
        assert_eq!(Value::Text("12.5%".to_string()).to_string(), "12.5%");
        assert_eq!(Value::List(vec!["a.txt".into(), "b".into()]).to_string(), "[a.txt, b]");
        assert_eq!(Value::List(vec![]).to_string(), "[]");
        assert_eq!(
            Value::Frequencies(vec![("the".into(), 3), ("cat".into(), 1)]).to_string(),
            "{the: 3, cat: 1}"
        );
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(Value::Number(9.0).to_json(), serde_json::json!(9.0));
        assert_eq!(Value::Count(2).to_json(), serde_json::json!(2));
        assert_eq!(
            Value::Frequencies(vec![("a".into(), 2)]).to_json(),
            serde_json::json!([{ "word": "a", "count": 2 }])
        );
    }

    #[test]
    fn test_function_spec_invoke() {
        let spec = FunctionSpec::new("answer", "Always 42", ArgKind::None, |_| Ok(Value::Count(42)));
        assert_eq!(spec.name(), "answer");
        assert_eq!(spec.description(), "Always 42");
        assert_eq!(spec.arg_kind(), ArgKind::None);
        assert_eq!(spec.invoke(&[]), Ok(Value::Count(42)));
        assert_eq!(spec.signature(), "answer()");
    }

    #[test]
    fn test_function_spec_debug_omits_body() {
        let spec = FunctionSpec::new("add", "", ArgKind::NumberPair, |_| Ok(Value::Number(0.0)));
        let debug = format!("{:?}", spec);
        assert!(debug.contains("add"));
        assert!(debug.contains("NumberPair"));
        assert_eq!(spec.signature(), "add(number, number)");
    }
}
