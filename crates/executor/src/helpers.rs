//! Template helpers.
//!
//! Ready-made generator nodes and option presets for common operation
//! shapes.

use dynochamber_core::{CallOptions, Fields, Model, TemplateNode};
use serde_json::{json, Value};

/// Sources for a batch write request list.
///
/// Each side is rendered against the call's model and should produce an
/// array: keys to delete and items to put.
#[derive(Debug, Clone, Default)]
pub struct BatchWriteSpec {
    put: Option<TemplateNode>,
    delete: Option<TemplateNode>,
}

impl BatchWriteSpec {
    /// Empty spec; produces an empty request list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items to put, usually a whole-value placeholder like `"{{movies}}"`.
    pub fn put(mut self, items: impl Into<TemplateNode>) -> Self {
        self.put = Some(items.into());
        self
    }

    /// Keys to delete.
    pub fn delete(mut self, keys: impl Into<TemplateNode>) -> Self {
        self.delete = Some(keys.into());
        self
    }
}

/// Generator for a batch write request list.
///
/// Emits every `DeleteRequest` before any `PutRequest`. A side that renders
/// to a single non-array value contributes one request; a missing or `null`
/// side contributes none.
///
/// ```ignore
/// let template = OperationTemplate::new(OperationKind::BatchWrite).with_field(
///     "RequestItems",
///     TemplateNode::object([(
///         "Movies",
///         batch_write(BatchWriteSpec::new().put("{{moviesToAdd}}").delete("{{moviesToDelete}}")),
///     )]),
/// );
/// ```
pub fn batch_write(spec: BatchWriteSpec) -> TemplateNode {
    TemplateNode::generator(move |fields| {
        let deletes = render_list(spec.delete.as_ref(), fields)
            .into_iter()
            .map(|key| json!({ "DeleteRequest": { "Key": key } }));
        let puts = render_list(spec.put.as_ref(), fields)
            .into_iter()
            .map(|item| json!({ "PutRequest": { "Item": item } }));
        Value::Array(deletes.chain(puts).collect())
    })
}

fn render_list(node: Option<&TemplateNode>, fields: &Fields) -> Vec<Value> {
    match node.and_then(|n| n.render(fields)) {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single],
    }
}

/// Copy of `model` set up to count records across every page.
///
/// Existing options are kept; paging, raw mode and the reducer are forced.
/// The caller's model is left untouched.
pub fn records_counter(model: &Model) -> Model {
    let counter = match model.options() {
        Some(existing) => existing.clone().overlay(CallOptions::records_counter()),
        None => CallOptions::records_counter(),
    };
    model.clone().with_options(counter)
}
