//! Store facade.
//!
//! A [`Store`] binds a table-name resolver, a frozen template registry and a
//! driver into callable named operations. Every call runs the same pipeline:
//!
//! 1. copy the model and split off its call options
//! 2. run the template's validator once against the copy
//! 3. compile the request for the resolved table
//! 4. dispatch it, standard or paged, and shape the result
//!
//! The store holds no per-call state. Clones share the registry, driver and
//! dispatcher, and any number of calls may run concurrently.
//!
//! # Example
//!
//! ```ignore
//! use dynochamber::{Model, OperationKind, OperationTemplate, Store, StoreDefinition};
//!
//! let definition = StoreDefinition::new("Movies")
//!     .operation("getMovie", OperationTemplate::new(OperationKind::Get)
//!         .with_field("Key", json!({ "year": "{{year}}", "title": "{{title}}" })))?;
//! let store = Store::new(definition, driver);
//!
//! let movie = store
//!     .call("getMovie", &Model::new().with("year", 2013).with("title", "Rush"))
//!     .await?;
//! ```

use std::fmt;
use std::sync::Arc;

use dynochamber_core::{
    BoxError, Fields, Model, OperationKind, OperationTemplate, Registry, RegistryBuilder,
    TemplateNode, ValidationFailure,
};
use serde_json::Value;
use tracing::debug;

use crate::builder::build;
use crate::config::StoreConfig;
use crate::convert::convert_result;
use crate::dispatch::Dispatcher;
use crate::driver::Driver;
use crate::{Error, Result};

/// Resolves the store's table for each call.
#[derive(Clone)]
pub enum TableName {
    /// Fixed name
    Static(String),
    /// Evaluated lazily on every call
    Dynamic(Arc<dyn Fn() -> String + Send + Sync>),
}

impl TableName {
    /// Wrap a zero-argument resolver.
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        TableName::Dynamic(Arc::new(f))
    }

    /// Current table name.
    pub fn resolve(&self) -> String {
        match self {
            TableName::Static(name) => name.clone(),
            TableName::Dynamic(f) => f(),
        }
    }
}

impl fmt::Debug for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableName::Static(name) => f.debug_tuple("Static").field(name).finish(),
            TableName::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for TableName {
    fn from(name: &str) -> Self {
        TableName::Static(name.to_string())
    }
}

impl From<String> for TableName {
    fn from(name: String) -> Self {
        TableName::Static(name)
    }
}

/// A store under construction: table plus named templates.
#[derive(Debug)]
pub struct StoreDefinition {
    table: TableName,
    registry: RegistryBuilder,
}

impl StoreDefinition {
    /// Start a definition for `table`.
    pub fn new(table: impl Into<TableName>) -> Self {
        Self {
            table: table.into(),
            registry: Registry::builder(),
        }
    }

    /// Build a definition from a declarative config.
    ///
    /// # Errors
    ///
    /// Returns an error if any operation definition is malformed.
    pub fn from_config(config: StoreConfig) -> Result<Self> {
        config
            .templates()?
            .into_iter()
            .try_fold(Self::new(config.table_name), |definition, (name, template)| {
                definition.operation(name, template)
            })
    }

    /// Register a named operation.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is already defined.
    pub fn operation(mut self, name: impl Into<String>, template: OperationTemplate) -> Result<Self> {
        self.registry = convert_result(self.registry.register(name, template))?;
        Ok(self)
    }

    /// Attach a validator to an already defined operation.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not defined.
    pub fn validator<F>(mut self, name: &str, f: F) -> Result<Self>
    where
        F: Fn(&Fields) -> std::result::Result<(), ValidationFailure> + Send + Sync + 'static,
    {
        self.registry = self.registry.update(name, |t| t.with_validator(f))?;
        Ok(self)
    }

    /// Attach an output builder to an already defined operation.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not defined.
    pub fn output_builder<F>(mut self, name: &str, f: F) -> Result<Self>
    where
        F: Fn(&Value) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.registry = self.registry.update(name, |t| t.with_output_builder(f))?;
        Ok(self)
    }

    /// Replace a skeleton member of an already defined operation.
    ///
    /// Used to graft generator nodes onto config-defined operations.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not defined.
    pub fn field(
        mut self,
        name: &str,
        key: impl Into<String>,
        node: impl Into<TemplateNode>,
    ) -> Result<Self> {
        self.registry = self.registry.update(name, |t| t.with_field(key, node))?;
        Ok(self)
    }
}

/// Callable named operations over one table.
///
/// # Thread Safety
///
/// Store is `Send + Sync` and cheap to clone.
#[derive(Clone)]
pub struct Store {
    table: TableName,
    registry: Arc<Registry>,
    driver: Arc<dyn Driver>,
    dispatcher: Arc<Dispatcher>,
}

impl Store {
    /// Freeze a definition and bind it to a driver.
    pub fn new(definition: StoreDefinition, driver: Arc<dyn Driver>) -> Self {
        Self::with_dispatcher(definition, driver, Dispatcher::default())
    }

    /// Like [`Store::new`] with an explicitly constructed dispatcher.
    pub fn with_dispatcher(
        definition: StoreDefinition,
        driver: Arc<dyn Driver>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            table: definition.table,
            registry: Arc::new(definition.registry.build()),
            driver,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// The table name as it resolves right now.
    pub fn table_name(&self) -> String {
        self.table.resolve()
    }

    /// Names of all defined operations, sorted.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// The registry backing this store.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Bind a named operation.
    pub fn operation<'a>(&'a self, name: &'a str) -> Option<Operation<'a>> {
        self.registry.get(name).map(|template| Operation {
            store: self,
            name,
            template: template.as_ref(),
        })
    }

    /// Invoke a named operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperation`] for an undefined name, otherwise
    /// whatever the operation's call returns.
    pub async fn call(&self, name: &str, model: &Model) -> Result<Value> {
        let operation = self.operation(name).ok_or_else(|| Error::UnknownOperation {
            name: name.to_string(),
        })?;
        operation.call(model).await
    }

    async fn run(&self, name: &str, template: &OperationTemplate, model: &Model) -> Result<Value> {
        let (fields, options) = convert_result(model.sanitize())?;

        if let Err(failure) = template.validate(&fields) {
            debug!(operation = name, reason = %failure, "validation failed");
            return Err(Error::Validation(failure));
        }

        let table = match options.table_override() {
            Some(table) => table.to_string(),
            None => self.table.resolve(),
        };
        let request = build(&table, template, &fields)?;
        debug!(operation = name, kind = %template.kind(), "calling");

        self.dispatcher
            .execute(
                self.driver.as_ref(),
                template.kind(),
                request,
                &options,
                template.output_builder(),
            )
            .await
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("table", &self.table)
            .field("operations", &self.registry.names().collect::<Vec<_>>())
            .finish()
    }
}

/// A named operation bound to its store.
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    store: &'a Store,
    name: &'a str,
    template: &'a OperationTemplate,
}

impl<'a> Operation<'a> {
    /// Operation name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Operation kind.
    pub fn kind(&self) -> OperationKind {
        self.template.kind()
    }

    /// The template behind this operation.
    pub fn template(&self) -> &'a OperationTemplate {
        self.template
    }

    /// Run the operation against `model`. The model is only read.
    ///
    /// # Errors
    ///
    /// See [`Error`] for the categories a call can end in.
    pub async fn call(&self, model: &Model) -> Result<Value> {
        self.store.run(self.name, self.template, model).await
    }
}
