//! Compiled requests and protocol field names
//!
//! A [`Request`] is what the driver receives: a placeholder-free JSON object
//! qualified with a table name and stripped of template metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Protocol field names
// ============================================================================

/// Target table of a single-table request.
pub const TABLE_NAME: &str = "TableName";
/// Per-table key/request map of batch requests.
pub const REQUEST_ITEMS: &str = "RequestItems";
/// Continuation token attached to the next query/scan request.
pub const EXCLUSIVE_START_KEY: &str = "ExclusiveStartKey";
/// Continuation token returned by a query/scan response.
pub const LAST_EVALUATED_KEY: &str = "LastEvaluatedKey";
/// Batch-get keys the driver did not process; continuation for batch gets.
pub const UNPROCESSED_KEYS: &str = "UnprocessedKeys";
/// Single item of a get response.
pub const ITEM: &str = "Item";
/// Item list of a query/scan response.
pub const ITEMS: &str = "Items";
/// Per-table item lists of a batch-get response.
pub const RESPONSES: &str = "Responses";
/// Number of items in a query/scan page.
pub const COUNT: &str = "Count";

/// Key inside `RequestItems` rebound to the effective table name.
pub const DYNAMIC_TABLE_KEY: &str = "tableName";

// ============================================================================
// Template metadata
// ============================================================================

/// Operation kind marker in template definitions.
pub const TYPE_FIELD: &str = "_type";
/// Validator slot in template definitions.
pub const VALIDATOR_FIELD: &str = "_validator";
/// Output builder slot in template definitions.
pub const OUTPUT_BUILDER_FIELD: &str = "_outputBuilder";
/// Call options carried inside a runtime model.
pub const OPTIONS_FIELD: &str = "_options";

const RESERVED_FIELDS: [&str; 4] = [TYPE_FIELD, VALIDATOR_FIELD, OUTPUT_BUILDER_FIELD, OPTIONS_FIELD];

/// Whether `key` is template-only metadata that must never reach a driver.
pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

// ============================================================================
// Request
// ============================================================================

/// A compiled, protocol-legal request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Request {
    body: Map<String, Value>,
}

impl Request {
    /// Wrap a request body, dropping any template metadata members.
    pub fn new(mut body: Map<String, Value>) -> Self {
        body.retain(|key, _| !is_reserved_field(key));
        Self { body }
    }

    /// The `TableName` member, if it is a string.
    pub fn table_name(&self) -> Option<&str> {
        self.body.get(TABLE_NAME).and_then(Value::as_str)
    }

    /// Replace the `TableName` member.
    pub fn set_table_name(&mut self, table: impl Into<String>) {
        self.body
            .insert(TABLE_NAME.to_string(), Value::String(table.into()));
    }

    /// Look up a top-level member.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Mutable access to a top-level member.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.body.get_mut(key)
    }

    /// Set a top-level member. Metadata keys are ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if !is_reserved_field(&key) {
            self.body.insert(key, value);
        }
    }

    /// Remove a top-level member.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.body.remove(key)
    }

    /// Borrow the request body.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Take the request body.
    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }

    /// The request as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.body.clone())
    }
}
