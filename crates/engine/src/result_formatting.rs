//! Rendering of call records
//!
//! Formatting never changes an outcome: it only decides how the name, the
//! echoed arguments and the value or error text are laid out on one line.

use fescall_core::Result;

use crate::coercion::Argument;
use crate::dispatcher::{CallError, CallRecord};

/// Default prefix length kept when echoing long string arguments
pub const DEFAULT_TRUNCATE_LENGTH: usize = 30;

/// Renders one line per call record
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    truncate_length: usize,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TRUNCATE_LENGTH)
    }
}

impl OutputFormatter {
    /// Create a formatter that shortens echoed strings past `truncate_length` chars
    pub fn new(truncate_length: usize) -> Self {
        Self { truncate_length }
    }

    /// Format a record as a text line
    ///
    /// - `name() = value` / `name(arg1, arg2) = value` on success
    /// - `Unknown function: name` for unknown names
    /// - `Error calling name: message` for coercion and capability failures
    pub fn format(&self, record: &CallRecord) -> String {
        match &record.outcome {
            Ok(value) => format!(
                "{}({}) = {}",
                record.name,
                self.format_arguments(&record.arguments),
                single_line(&value.to_string())
            ),
            Err(err @ CallError::UnknownFunction(_)) => err.to_string(),
            Err(err) => format!("Error calling {}: {}", record.name, single_line(&err.to_string())),
        }
    }

    /// Format a record as one JSON object (JSON Lines)
    ///
    /// Arguments and values are emitted in full; truncation only applies to
    /// the text format.
    pub fn format_json(&self, record: &CallRecord) -> Result<String> {
        let line = match &record.outcome {
            Ok(value) => serde_json::json!({
                "function": record.name,
                "position": record.position,
                "arguments": record.arguments,
                "status": "ok",
                "value": value.to_json(),
            }),
            Err(err) => serde_json::json!({
                "function": record.name,
                "position": record.position,
                "arguments": record.arguments,
                "status": "error",
                "error_kind": err.kind(),
                "message": err.to_string(),
            }),
        };

        Ok(serde_json::to_string(&line)?)
    }

    /// Echo arguments: numbers as written, strings quoted and truncated
    fn format_arguments(&self, arguments: &[Argument]) -> String {
        arguments
            .iter()
            .map(|arg| match arg {
                arg @ Argument::Number { .. } => arg.to_string(),
                Argument::Text(s) => format!("\"{}\"", single_line(&self.truncate_for_display(s))),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Truncate a string for display purposes
    pub fn truncate_for_display(&self, s: &str) -> String {
        if s.chars().count() <= self.truncate_length {
            s.to_string()
        } else {
            let prefix: String = s.chars().take(self.truncate_length).collect();
            format!("{}...", prefix)
        }
    }
}

/// Keeps a rendered piece on one output line
fn single_line(s: &str) -> String {
    s.replace('\r', "\\r").replace('\n', "\\n")
}
