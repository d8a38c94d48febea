//! Dynochamber - declarative operations for DynamoDB-style document stores
//!
//! A store is a table plus a set of named operation templates. Each template
//! is a request skeleton with `{{placeholder}}` leaves; calling the operation
//! fills the placeholders from a runtime model, sends the request through a
//! [`Driver`], follows continuation tokens when asked to, and shapes the
//! response.
//!
//! # Quick Start
//!
//! ```ignore
//! use dynochamber::{Model, OperationKind, OperationTemplate, Store, StoreDefinition};
//! use serde_json::json;
//!
//! let definition = StoreDefinition::new("Movies")
//!     .operation("getMovie", OperationTemplate::new(OperationKind::Get)
//!         .with_field("Key", json!({ "year": "{{year}}", "title": "{{title}}" })))?;
//! let store = Store::new(definition, driver);
//!
//! let movie = store.call("getMovie", &Model::new().with("year", 2013).with("title", "Rush")).await?;
//! ```
//!
//! # Architecture
//!
//! Template data types live in `dynochamber-core`; compilation, dispatch and
//! paging live in `dynochamber-executor`. Only the executor API is public
//! here.

// Re-export the public API from dynochamber-executor
pub use dynochamber_executor::*;
