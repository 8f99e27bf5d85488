//! Turns a failed response into a single display message
//!
//! The remote service reports errors in a few shapes: a top-level `error`
//! string, a `non_field_errors` list, or a map of field names to messages.
//! A body is classified into exactly one [`ErrorShape`] and rendered from it;
//! the checks run in that order and the first match wins.

use reqwest::StatusCode;
use serde_json::Value;

/// Field carrying a top-level error message
const ERROR_FIELD: &str = "error";
/// Field carrying errors that are not tied to one input field
const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Recognized layouts of a JSON error body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorShape {
    /// `{"error": "..."}`
    Message(String),
    /// `{"non_field_errors": ["...", ...]}`
    NonField(Vec<String>),
    /// `{"field": ["...", ...], "other": "..."}`, in body order
    Fields(Vec<(String, String)>),
    /// Valid JSON without a usable layout
    Unknown,
}

impl ErrorShape {
    /// Classifies a decoded error body
    #[must_use]
    pub fn classify(body: &Value) -> Self {
        let Value::Object(fields) = body else {
            return Self::Unknown;
        };

        if let Some(error) = fields.get(ERROR_FIELD).filter(|v| is_truthy(v)) {
            return Self::Message(render(error));
        }

        if let Some(non_field) = fields.get(NON_FIELD_ERRORS).filter(|v| is_truthy(v)) {
            let items = match non_field {
                Value::Array(items) => items.iter().map(render).collect(),
                other => vec![render(other)],
            };
            return Self::NonField(items);
        }

        if fields.is_empty() {
            return Self::Unknown;
        }

        let pairs = fields
            .iter()
            .map(|(field, value)| {
                let rendered = match value {
                    Value::Array(items) => join(items, ", "),
                    other => render(other),
                };
                (field.clone(), rendered)
            })
            .collect();

        Self::Fields(pairs)
    }

    /// Renders the display message for a response with `status`
    #[must_use]
    pub fn into_message(self, status: StatusCode) -> String {
        match self {
            Self::Message(message) => message,
            Self::NonField(items) => items.join(", "),
            Self::Fields(pairs) => pairs
                .into_iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect::<Vec<_>>()
                .join("; "),
            Self::Unknown => generic_message(status),
        }
    }
}

/// Builds the display message for a failed response
///
/// `body` is `None` when the body could not be read at all. A body that is
/// not JSON, or is a bare `null`, falls back to the status reason phrase, then
/// to `HTTP <code>`.
#[must_use]
pub fn normalize_error(status: StatusCode, body: Option<&[u8]>) -> String {
    // A `null` body carries no structure at all, like a body that is not JSON
    let decoded = body
        .and_then(|bytes| serde_json::from_slice::<Value>(bytes).ok())
        .filter(|value| !value.is_null());

    match decoded {
        Some(decoded) => ErrorShape::classify(&decoded).into_message(status),
        None => status
            .canonical_reason()
            .map_or_else(|| generic_message(status), str::to_owned),
    }
}

fn generic_message(status: StatusCode) -> String {
    format!("HTTP {}", status.as_u16())
}

fn join(items: &[Value], separator: &str) -> String {
    items.iter().map(render).collect::<Vec<_>>().join(separator)
}

// Strings render raw, anything else as compact JSON
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
