// Per-endpoint reading of a parsed API response.
//
// The two mutating endpoints signal success differently: `create_expense`
// fails when `errors` is non-empty, while `delete_expense` answers with an
// `errors` key (usually empty) on success and without it otherwise. Each
// endpoint keeps its own rule.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The response parsed as JSON but has a shape the endpoint cannot answer with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a JSON object in the response, got {0}")]
pub struct UnexpectedBody(pub &'static str);

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(Value),
    CreateFailed(Value),
    Deleted { id: String, body: Value },
    MaybeDeleted { id: String },
    Listed(Value),
}

impl Outcome {
    /// True when the API reported that the operation did not happen.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::CreateFailed(_) | Outcome::MaybeDeleted { .. })
    }
}

/// Only containers and strings can hold error entries; scalars never do.
fn has_entries(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

/// A `null` body is rejected; any other body without error entries counts
/// as a created expense.
pub fn interpret_create(body: Value) -> Result<Outcome, UnexpectedBody> {
    if body.is_null() {
        return Err(UnexpectedBody(kind(&body)));
    }
    Ok(match body.get("errors") {
        Some(errors) if has_entries(errors) => Outcome::CreateFailed(errors.clone()),
        _ => Outcome::Created(body),
    })
}

/// Requires an object body; the `errors` key alone decides the outcome.
pub fn interpret_delete(id: &str, body: Value) -> Result<Outcome, UnexpectedBody> {
    let Some(map) = body.as_object() else {
        return Err(UnexpectedBody(kind(&body)));
    };
    Ok(if map.contains_key("errors") {
        Outcome::Deleted {
            id: id.to_string(),
            body,
        }
    } else {
        Outcome::MaybeDeleted { id: id.to_string() }
    })
}

pub fn interpret_list(body: Value) -> Outcome {
    Outcome::Listed(body)
}

struct Pretty<'a>(&'a Value);

impl fmt::Display for Pretty<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created(body) => {
                write!(f, "Expense created successfully: {}", Pretty(body))
            }
            Outcome::CreateFailed(errors) => {
                write!(f, "Failed to create expense: {}", Pretty(errors))
            }
            Outcome::Deleted { id, body } => {
                write!(f, "Expense with ID {id} deleted successfully: {}", Pretty(body))
            }
            Outcome::MaybeDeleted { id } => write!(
                f,
                "Expense with ID {id} might have already been deleted or the ID is incorrect."
            ),
            Outcome::Listed(body) => write!(f, "Response data: {}", Pretty(body)),
        }
    }
}
