//! Operation templates
//!
//! An [`OperationTemplate`] is the declarative description of one store
//! operation: its [`OperationKind`], a request skeleton whose leaves may hold
//! placeholders or generators, and two optional capabilities:
//!
//! - a validator run against the sanitized model before any driver call
//! - an output builder that reshapes each raw driver response
//!
//! Skeleton leaves are [`TemplateNode`]s. Strings are parsed into the
//! placeholder mini-language once, when the template is defined, so a
//! compiled request is produced by a single walk of the tree.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::kind::OperationKind;
use crate::placeholder::{PlaceholderName, TextTemplate};
use crate::request::{is_reserved_field, TYPE_FIELD};

/// Boxed error returned by caller-supplied capabilities.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The sanitized runtime model a template is rendered against.
pub type Fields = Map<String, Value>;

// =============================================================================
// Capabilities
// =============================================================================

/// Produces a substitutable value from the sanitized model.
///
/// Generators stand in for a request subtree that is easier to compute than
/// to describe, such as the request list of a batch write.
#[derive(Clone)]
pub struct Generator(Arc<dyn Fn(&Fields) -> Value + Send + Sync>);

impl Generator {
    /// Wrap a value-producing function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Fields) -> Value + Send + Sync + 'static,
    {
        Generator(Arc::new(f))
    }

    /// Produce the value for this model.
    pub fn generate(&self, fields: &Fields) -> Value {
        (self.0)(fields)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Generator(..)")
    }
}

/// Why a validator rejected a model.
///
/// Returned to the caller as-is; the store never inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Human-readable reason
    pub message: String,
    /// Optional structured detail
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl ValidationFailure {
    /// Create a failure with a message and no details.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Value::Null,
        }
    }

    /// Attach structured detail.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Checks a sanitized model before compilation.
#[derive(Clone)]
pub struct Validator(Arc<dyn Fn(&Fields) -> std::result::Result<(), ValidationFailure> + Send + Sync>);

impl Validator {
    /// Wrap a validation function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Fields) -> std::result::Result<(), ValidationFailure> + Send + Sync + 'static,
    {
        Validator(Arc::new(f))
    }

    /// Run the check.
    pub fn validate(&self, fields: &Fields) -> std::result::Result<(), ValidationFailure> {
        (self.0)(fields)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// Reshapes one raw driver response into the caller-visible result.
#[derive(Clone)]
pub struct OutputBuilder(Arc<dyn Fn(&Value) -> std::result::Result<Value, BoxError> + Send + Sync>);

impl OutputBuilder {
    /// Wrap a projection function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        OutputBuilder(Arc::new(f))
    }

    /// Apply the projection.
    pub fn build(&self, raw: &Value) -> std::result::Result<Value, BoxError> {
        (self.0)(raw)
    }
}

impl fmt::Debug for OutputBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OutputBuilder(..)")
    }
}

// =============================================================================
// TemplateNode
// =============================================================================

/// One node of a request skeleton.
#[derive(Debug, Clone)]
pub enum TemplateNode {
    /// Non-string leaf copied as-is (number, bool, null)
    Value(Value),
    /// String leaf, possibly holding placeholders
    Text(TextTemplate),
    /// Array whose elements are rendered in order
    Array(Vec<TemplateNode>),
    /// Object whose members are rendered by key
    Object(BTreeMap<String, TemplateNode>),
    /// Leaf computed from the model at build time
    Generator(Generator),
}

impl TemplateNode {
    /// Build an object node from key/node pairs.
    pub fn object<K, N, I>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<TemplateNode>,
    {
        TemplateNode::Object(
            members
                .into_iter()
                .map(|(k, n)| (k.into(), n.into()))
                .collect(),
        )
    }

    /// Build a generator leaf.
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn(&Fields) -> Value + Send + Sync + 'static,
    {
        TemplateNode::Generator(Generator::new(f))
    }

    /// Render this node against a model.
    ///
    /// Returns `None` when the node is a whole-value placeholder missing from
    /// the model. Object members that render to `None` are dropped; array
    /// elements become `null` so positions are preserved. Generator output is
    /// rendered like skeleton text, so it may itself hold placeholders.
    pub fn render(&self, fields: &Fields) -> Option<Value> {
        match self {
            TemplateNode::Value(v) => Some(v.clone()),
            TemplateNode::Text(text) => text.render(fields),
            TemplateNode::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| item.render(fields).unwrap_or(Value::Null))
                    .collect(),
            )),
            TemplateNode::Object(members) => Some(Value::Object(render_members(members, fields))),
            TemplateNode::Generator(generator) => {
                TemplateNode::from(generator.generate(fields)).render(fields)
            }
        }
    }

    /// Merge `other` into `self`; `other` wins on conflicts.
    ///
    /// Objects merge member by member, anything else is replaced.
    pub fn merge(&mut self, other: TemplateNode) {
        match (self, other) {
            (TemplateNode::Object(mine), TemplateNode::Object(theirs)) => {
                merge_members(mine, theirs);
            }
            (slot, other) => *slot = other,
        }
    }

    /// Collect every placeholder referenced below this node.
    pub fn placeholders(&self) -> Vec<&PlaceholderName> {
        let mut names = Vec::new();
        self.collect_placeholders(&mut names);
        names
    }

    fn collect_placeholders<'a>(&'a self, names: &mut Vec<&'a PlaceholderName>) {
        match self {
            TemplateNode::Text(text) => names.extend(text.placeholders()),
            TemplateNode::Array(items) => items.iter().for_each(|i| i.collect_placeholders(names)),
            TemplateNode::Object(members) => members
                .values()
                .for_each(|m| m.collect_placeholders(names)),
            TemplateNode::Value(_) | TemplateNode::Generator(_) => {}
        }
    }
}

pub(crate) fn render_members(members: &BTreeMap<String, TemplateNode>, fields: &Fields) -> Map<String, Value> {
    members
        .iter()
        .filter_map(|(key, node)| node.render(fields).map(|v| (key.clone(), v)))
        .collect()
}

pub(crate) fn merge_members(
    mine: &mut BTreeMap<String, TemplateNode>,
    theirs: BTreeMap<String, TemplateNode>,
) {
    for (key, node) in theirs {
        match mine.get_mut(&key) {
            Some(existing) => existing.merge(node),
            None => {
                mine.insert(key, node);
            }
        }
    }
}

impl From<Value> for TemplateNode {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => TemplateNode::Text(TextTemplate::parse(&s)),
            Value::Array(items) => {
                TemplateNode::Array(items.into_iter().map(TemplateNode::from).collect())
            }
            Value::Object(map) => TemplateNode::Object(
                map.into_iter()
                    .map(|(k, v)| (k, TemplateNode::from(v)))
                    .collect(),
            ),
            other => TemplateNode::Value(other),
        }
    }
}

impl From<&str> for TemplateNode {
    fn from(s: &str) -> Self {
        TemplateNode::Text(TextTemplate::parse(s))
    }
}

impl From<String> for TemplateNode {
    fn from(s: String) -> Self {
        TemplateNode::Text(TextTemplate::parse(&s))
    }
}

impl From<Generator> for TemplateNode {
    fn from(g: Generator) -> Self {
        TemplateNode::Generator(g)
    }
}

// =============================================================================
// RequestTemplate
// =============================================================================

/// The top-level object of a request skeleton.
#[derive(Debug, Clone, Default)]
pub struct RequestTemplate {
    members: BTreeMap<String, TemplateNode>,
}

impl RequestTemplate {
    /// Create an empty skeleton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object into a skeleton.
    ///
    /// Template-only metadata members (`_type`, `_validator`, ...) are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                members: map
                    .into_iter()
                    .filter(|(k, _)| !is_reserved_field(k))
                    .map(|(k, v)| (k, TemplateNode::from(v)))
                    .collect(),
            }),
            other => Err(Error::InvalidTemplate(format!(
                "request skeleton must be an object, got {}",
                other
            ))),
        }
    }

    /// Set a top-level member, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<TemplateNode>) {
        self.members.insert(key.into(), node.into());
    }

    /// Look up a top-level member.
    pub fn get(&self, key: &str) -> Option<&TemplateNode> {
        self.members.get(key)
    }

    /// Iterate top-level members in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TemplateNode)> {
        self.members.iter()
    }

    /// Whether the skeleton has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Merge `other` into this skeleton; `other` wins on conflicts.
    pub fn merge(&mut self, other: RequestTemplate) {
        merge_members(&mut self.members, other.members);
    }

    /// Render every member against a model.
    pub fn render(&self, fields: &Fields) -> Map<String, Value> {
        render_members(&self.members, fields)
    }

    /// Every placeholder referenced anywhere in the skeleton.
    pub fn placeholders(&self) -> Vec<&PlaceholderName> {
        self.members
            .values()
            .flat_map(|node| node.placeholders())
            .collect()
    }
}

// =============================================================================
// OperationTemplate
// =============================================================================

/// A named operation's kind, request skeleton and optional capabilities.
///
/// Immutable once registered in a [`Registry`](crate::Registry); the
/// `with_*` methods are for construction only.
///
/// # Example
///
/// ```
/// use dynochamber_core::{OperationKind, OperationTemplate};
/// use serde_json::json;
///
/// let get_movie = OperationTemplate::new(OperationKind::Get)
///     .with_field("Key", json!({ "title": "{{title}}:{{part}}", "year": "{{year}}" }));
/// assert_eq!(get_movie.kind(), OperationKind::Get);
/// ```
#[derive(Debug, Clone)]
pub struct OperationTemplate {
    kind: OperationKind,
    request: RequestTemplate,
    validator: Option<Validator>,
    output_builder: Option<OutputBuilder>,
}

impl OperationTemplate {
    /// Create a template with an empty skeleton.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            request: RequestTemplate::new(),
            validator: None,
            output_builder: None,
        }
    }

    /// Create a template from a JSON skeleton.
    ///
    /// # Errors
    ///
    /// Returns an error if `skeleton` is not an object.
    pub fn from_json(kind: OperationKind, skeleton: Value) -> Result<Self> {
        Ok(Self {
            request: RequestTemplate::from_json(skeleton)?,
            ..Self::new(kind)
        })
    }

    /// Create a template from a definition whose `_type` member names the
    /// kind and whose other members form the skeleton.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition is not an object, `_type` is
    /// missing or not a known kind.
    pub fn from_definition(definition: Value) -> Result<Self> {
        let kind = match definition.get(TYPE_FIELD) {
            Some(Value::String(id)) => id.parse::<OperationKind>()?,
            Some(other) => {
                return Err(Error::InvalidTemplate(format!(
                    "{} must be a string, got {}",
                    TYPE_FIELD, other
                )))
            }
            None => {
                return Err(Error::InvalidTemplate(format!("missing {}", TYPE_FIELD)));
            }
        };
        Self::from_json(kind, definition)
    }

    /// Set a top-level skeleton member.
    pub fn with_field(mut self, key: impl Into<String>, node: impl Into<TemplateNode>) -> Self {
        self.request.insert(key, node);
        self
    }

    /// Attach a validator.
    pub fn with_validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Fields) -> std::result::Result<(), ValidationFailure> + Send + Sync + 'static,
    {
        self.validator = Some(Validator::new(f));
        self
    }

    /// Attach an output builder.
    pub fn with_output_builder<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.output_builder = Some(OutputBuilder::new(f));
        self
    }

    /// The operation kind.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The request skeleton.
    pub fn request(&self) -> &RequestTemplate {
        &self.request
    }

    /// The validator, if any.
    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// The output builder, if any.
    pub fn output_builder(&self) -> Option<&OutputBuilder> {
        self.output_builder.as_ref()
    }

    /// Run the validator, if one is attached.
    pub fn validate(&self, fields: &Fields) -> std::result::Result<(), ValidationFailure> {
        match &self.validator {
            Some(validator) => validator.validate(fields),
            None => Ok(()),
        }
    }
}
