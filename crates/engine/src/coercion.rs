use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::function::ArgKind;

/// A token converted to the kind its capability declares
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Parsed value and the token it was read from
    Number { value: f64, token: String },
    Text(String),
}

impl Argument {
    /// Number whose written form is its shortest rendering
    pub fn number(value: f64) -> Self {
        Argument::Number { value, token: value.to_string() }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Argument::Number { value, .. } => Some(*value),
            Argument::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Argument::Text(s) => Some(s),
            Argument::Number { .. } => None,
        }
    }
}

/// Integral numbers print without a fraction; others keep the precision they were written with.
impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Number { value, .. } if value.fract() == 0.0 => write!(f, "{}", value),
            Argument::Number { token, .. } => write!(f, "{}", token),
            Argument::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for Argument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Argument::Number { value, .. } => serializer.serialize_f64(*value),
            Argument::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Why a directive's tokens could not be matched to its capability
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// Tokens supplied to a capability that takes none
    #[error("unexpected arguments")]
    UnexpectedArguments,

    /// Token count differs from the declared arity
    #[error("wrong number of arguments")]
    WrongArity { expected: usize, found: usize },

    /// Token is not a finite decimal number
    #[error("invalid numeric argument: {0}")]
    InvalidNumber(String),
}

/// Converts tokens into the arguments `kind` expects
///
/// Arity is checked before any token is parsed.
pub fn coerce(kind: ArgKind, tokens: Vec<String>) -> Result<Vec<Argument>, CoercionError> {
    if kind == ArgKind::None {
        return if tokens.is_empty() { Ok(Vec::new()) } else { Err(CoercionError::UnexpectedArguments) };
    }

    if tokens.len() != kind.arity() {
        return Err(CoercionError::WrongArity { expected: kind.arity(), found: tokens.len() });
    }

    if kind.is_numeric() {
        tokens
            .into_iter()
            .map(|token| parse_number(&token).map(|value| Argument::Number { value, token }))
            .collect()
    } else {
        Ok(tokens.into_iter().map(Argument::Text).collect())
    }
}

/// Parses an integer or floating point token
pub fn parse_number(token: &str) -> Result<f64, CoercionError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CoercionError::InvalidNumber(token.to_string())),
    }
}

/// Extracts the two numbers of a `NumberPair` call
pub fn number_pair(arguments: &[Argument]) -> Result<(f64, f64), String> {
    match arguments {
        [a, b] => match (a.as_number(), b.as_number()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err("expected two numeric arguments".to_string()),
        },
        _ => Err(CoercionError::WrongArity { expected: 2, found: arguments.len() }.to_string()),
    }
}

/// Extracts the text of a single `String` call
pub fn single_text(arguments: &[Argument]) -> Result<&str, String> {
    match arguments {
        [a] => a.as_text().ok_or_else(|| "expected a string argument".to_string()),
        _ => Err(CoercionError::WrongArity { expected: 1, found: arguments.len() }.to_string()),
    }
}

/// Extracts the two strings of a `StringPair` call
pub fn text_pair(arguments: &[Argument]) -> Result<(&str, &str), String> {
    match arguments {
        [a, b] => match (a.as_text(), b.as_text()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err("expected two string arguments".to_string()),
        },
        _ => Err(CoercionError::WrongArity { expected: 2, found: arguments.len() }.to_string()),
    }
}
