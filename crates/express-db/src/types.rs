//! Document value types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored document: a JSON object of named fields.
pub type Document = serde_json::Map<String, Value>;

/// Field the store stamps with the creation instant on [`add`](crate::DocumentBackend::add).
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Field typed reads inject the document id under.
pub const ID_FIELD: &str = "id";

/// Reference to a freshly created document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Store-assigned document id.
    pub id: String,
    /// Store-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Guard for a conditional update: the write applies only while
/// `field` still holds `expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct Precondition {
    /// Field to compare.
    pub field: String,
    /// Value the field must currently hold.
    pub expected: Value,
}

impl Precondition {
    /// Create a precondition on a single field.
    pub fn new(field: impl Into<String>, expected: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Check the precondition against a stored document.
    ///
    /// Numbers compare by value so `5` and `5.0` are equal.
    pub fn holds(&self, document: &Document) -> bool {
        match (document.get(&self.field), &self.expected) {
            (Some(Value::Number(a)), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => a == b,
                _ => a.as_f64() == b.as_f64(),
            },
            (Some(actual), expected) => actual == expected,
            (None, Value::Null) => true,
            (None, _) => false,
        }
    }
}
