//! Core types for dynochamber
//!
//! This crate defines the pure data side of the system:
//! - OperationKind: the eight store operation kinds
//! - Placeholder mini-language: `{{name}}` whole-value and interpolated strings
//! - OperationTemplate / TemplateNode: declarative request skeletons
//! - Registry: named templates, frozen at construction
//! - Model / CallOptions: caller input for one invocation
//! - Request: a compiled, driver-ready request and protocol field names
//! - Error: template and option parse failures

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kind;
pub mod model;
pub mod options;
pub mod placeholder;
pub mod registry;
pub mod request;
pub mod template;

pub use error::{Error, Result};
pub use kind::OperationKind;
pub use model::Model;
pub use options::{BoxFuture, CallOptions, PageCallback, PageConsumer, PageReducer, Pages};
pub use placeholder::{PlaceholderName, Segment, TextTemplate};
pub use registry::{Registry, RegistryBuilder};
pub use request::Request;
pub use template::{
    BoxError, Fields, Generator, OperationTemplate, OutputBuilder, RequestTemplate, TemplateNode,
    ValidationFailure, Validator,
};
