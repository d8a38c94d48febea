//! # Dynochamber Executor
//!
//! Turns declarative operation templates into calls against a document
//! store. This is the only crate users need to import. It provides:
//! - [`Store`] - named, validated, paginated operations over one table
//! - [`Driver`] - the async contract a document-store client implements
//! - [`StoreConfig`] - declarative store definitions from TOML or JSON
//!
//! ## Quick Start
//!
//! ```text
//! use dynochamber_executor::{Model, OperationKind, OperationTemplate, Store, StoreDefinition};
//!
//! let definition = StoreDefinition::new("Movies")
//!     .operation("getMovie", OperationTemplate::new(OperationKind::Get)
//!         .with_field("Key", json!({ "year": "{{year}}", "title": "{{title}}" })))?;
//! let store = Store::new(definition, Arc::new(my_driver));
//!
//! let movie = store.call("getMovie", &Model::new().with("year", 2013).with("title", "Rush")).await?;
//! ```
//!
//! ## Execution
//!
//! | Stage | Module |
//! |-------|--------|
//! | model copy, options split, validation | [`Store`] |
//! | template + model -> request | [`build`] |
//! | strategy selection, table rebinding | [`Dispatcher`] |
//! | continuation following | [`Continuation`] |
//! | response shaping | [`Projector`] |
//!
//! ## Paging
//!
//! Query, Scan and BatchGet fetch a single page unless the call asks for all
//! pages. Pages are then streamed to a callback or folded with a reducer:
//!
//! ```text
//! let options = CallOptions::new().all_pages().page_reduce(
//!     |acc, page| json!(acc.as_u64().unwrap_or(0) + page.as_array().map_or(0, |p| p.len() as u64)),
//!     json!(0),
//! );
//! let total = store.call("scanAll", &Model::new().with_options(options)).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builder;
mod config;
mod convert;
mod dispatch;
mod driver;
mod error;
pub mod helpers;
mod output;
mod paging;
mod store;


// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use builder::build;
pub use config::{StoreConfig, CONFIG_FILE_NAME};
pub use dispatch::{Dispatcher, KindProfile, KindTable, Strategy};
pub use driver::{Driver, DriverError, DriverResult};
pub use error::Error;
pub use output::{Extract, Projector};
pub use paging::Continuation;
pub use store::{Operation, Store, StoreDefinition, TableName};

// Re-export core types so users don't need dynochamber-core directly
pub use dynochamber_core::{
    BoxError, BoxFuture, CallOptions, Fields, Generator, Model, OperationKind, OperationTemplate,
    OutputBuilder, PageCallback, PageConsumer, PageReducer, Pages, Registry, RegistryBuilder,
    Request, RequestTemplate, TemplateNode, ValidationFailure, Validator,
};

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;
