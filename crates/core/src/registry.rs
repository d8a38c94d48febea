//! Template registry
//!
//! Named operation templates, frozen at construction. A registry is shared
//! read-only across concurrent calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::template::OperationTemplate;

/// Immutable map from operation name to template.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    templates: BTreeMap<String, Arc<OperationTemplate>>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a template.
    pub fn get(&self, name: &str) -> Option<&Arc<OperationTemplate>> {
        self.templates.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Accumulates templates before they are frozen into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    templates: BTreeMap<String, OperationTemplate>,
}

impl RegistryBuilder {
    /// Add a template.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is already registered.
    pub fn register(mut self, name: impl Into<String>, template: OperationTemplate) -> Result<Self> {
        let name = name.into();
        if self.templates.contains_key(&name) {
            return Err(Error::DuplicateOperation(name));
        }
        self.templates.insert(name, template);
        Ok(self)
    }

    /// Replace a template in place before freezing.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not registered.
    pub fn update<F>(mut self, name: &str, f: F) -> Result<Self>
    where
        F: FnOnce(OperationTemplate) -> OperationTemplate,
    {
        let template = self
            .templates
            .remove(name)
            .ok_or_else(|| Error::InvalidTemplate(format!("no operation named {}", name)))?;
        self.templates.insert(name.to_string(), f(template));
        Ok(self)
    }

    /// Whether `name` has been added.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Freeze into an immutable registry.
    pub fn build(self) -> Registry {
        Registry {
            templates: self
                .templates
                .into_iter()
                .map(|(name, template)| (name, Arc::new(template)))
                .collect(),
        }
    }
}
