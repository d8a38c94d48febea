//! Query builder: template + model -> compiled request.
//!
//! Compilation is one walk over the skeleton:
//!
//! 1. start from `{ TableName: <resolved table> }`
//! 2. render the skeleton against the sanitized model
//! 3. merge the rendered skeleton over the base; skeleton members win
//! 4. drop template metadata members
//!
//! The table name is itself a template string, so `"{{stage}}.movies"`
//! resolves from the model like any other leaf.

use dynochamber_core::placeholder::TextTemplate;
use dynochamber_core::request::TABLE_NAME;
use dynochamber_core::{Fields, OperationTemplate, Request};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Compile `template` for `table_name` against a sanitized model.
///
/// Placeholders missing from the model are not an error here; the member is
/// left out and the driver reports whatever the protocol requires.
///
/// # Errors
///
/// Fails closed with [`Error::InvalidTemplate`] when the request would carry
/// no usable table name.
pub fn build(table_name: &str, template: &OperationTemplate, fields: &Fields) -> Result<Request> {
    let mut body = Map::new();
    if let Some(table) = TextTemplate::parse(table_name).render(fields) {
        body.insert(TABLE_NAME.to_string(), table);
    }

    for (key, value) in template.request().render(fields) {
        merge_member(&mut body, key, value);
    }

    match body.get(TABLE_NAME) {
        Some(Value::String(table)) if !table.is_empty() => Ok(Request::new(body)),
        Some(other) => Err(Error::InvalidTemplate {
            reason: format!("table name resolved to {}", other),
        }),
        None => Err(Error::InvalidTemplate {
            reason: format!("table name {} did not resolve", table_name),
        }),
    }
}

fn merge_member(target: &mut Map<String, Value>, key: String, value: Value) {
    match (target.get_mut(&key), value) {
        (Some(Value::Object(existing)), Value::Object(incoming)) => {
            for (k, v) in incoming {
                merge_member(existing, k, v);
            }
        }
        (_, value) => {
            target.insert(key, value);
        }
    }
}
