//! Runtime model supplied by the caller
//!
//! A [`Model`] maps placeholder names to values. It may also carry call
//! options, either typed or as a JSON `_options` member. Stores only ever
//! read a model: [`Model::sanitize`] produces a private copy with the
//! options split off, and everything downstream works on that copy.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::options::CallOptions;
use crate::request::OPTIONS_FIELD;
use crate::template::Fields;

/// Caller-supplied placeholder values plus optional call options.
#[derive(Debug, Clone, Default)]
pub struct Model {
    fields: Map<String, Value>,
    options: Option<CallOptions>,
}

impl Model {
    /// Empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing map of fields.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            options: None,
        }
    }

    /// Build a model from a JSON value.
    ///
    /// `null` yields an empty model.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is neither an object nor `null`.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            other => Err(Error::InvalidOptions(format!(
                "model must be an object, got {}",
                other
            ))),
        }
    }

    /// Set a field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Attach typed call options.
    ///
    /// They are layered over any `_options` member: whatever the typed
    /// options set explicitly wins.
    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Fields as supplied, including any `_options` member.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Typed options, if attached.
    pub fn options(&self) -> Option<&CallOptions> {
        self.options.as_ref()
    }

    /// Copy the fields and split off the call options.
    ///
    /// The returned fields never contain `_options`. Typed options are
    /// layered over serialized ones. `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `_options` is present but malformed.
    pub fn sanitize(&self) -> Result<(Fields, CallOptions)> {
        let mut fields = self.fields.clone();
        let serialized = match fields.remove(OPTIONS_FIELD) {
            Some(value) => CallOptions::from_json(&value)?,
            None => CallOptions::default(),
        };
        let options = match &self.options {
            Some(typed) => serialized.overlay(typed.clone()),
            None => serialized,
        };
        Ok((fields, options))
    }
}

impl From<Map<String, Value>> for Model {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_fields(fields)
    }
}

impl TryFrom<Value> for Model {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(value)
    }
}
