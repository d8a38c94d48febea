//! Result projection: raw driver response -> caller-visible result.
//!
//! Precedence, applied once per response (once per page when paging):
//!
//! 1. `raw` option set: the response is returned untouched
//! 2. template has an output builder: its result, or its error
//! 3. otherwise the default extraction for the operation kind
//!
//! | Kind | Default extraction |
//! |------|--------------------|
//! | Get | `Item` |
//! | Query, Scan | `Items` |
//! | BatchGet | `Responses` |
//! | Put, Delete, Update, BatchWrite | whole response |

use dynochamber_core::request::{ITEM, ITEMS, RESPONSES};
use dynochamber_core::{OperationKind, OutputBuilder};
use serde_json::Value;

use crate::{Error, Result};

/// Default response field extracted for an operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// `Item` member
    Item,
    /// `Items` member
    Items,
    /// `Responses` member
    Responses,
    /// The response itself
    Response,
}

impl Extract {
    /// Default extraction for `kind`.
    pub const fn for_kind(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Get => Extract::Item,
            OperationKind::Query | OperationKind::Scan => Extract::Items,
            OperationKind::BatchGet => Extract::Responses,
            OperationKind::Put
            | OperationKind::Delete
            | OperationKind::Update
            | OperationKind::BatchWrite => Extract::Response,
        }
    }

    /// Pull the field out of a response; a missing field yields `null`.
    pub fn apply(self, mut response: Value) -> Value {
        let field = match self {
            Extract::Item => ITEM,
            Extract::Items => ITEMS,
            Extract::Responses => RESPONSES,
            Extract::Response => return response,
        };
        response
            .get_mut(field)
            .map(Value::take)
            .unwrap_or(Value::Null)
    }
}

/// Shapes the responses of one call.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    extract: Extract,
    raw: bool,
    output_builder: Option<&'a OutputBuilder>,
}

impl<'a> Projector<'a> {
    /// Create a projector for one call.
    pub fn new(extract: Extract, raw: bool, output_builder: Option<&'a OutputBuilder>) -> Self {
        Self {
            extract,
            raw,
            output_builder,
        }
    }

    /// Shape one response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Projection`] if the output builder fails.
    pub fn project(&self, response: Value) -> Result<Value> {
        if self.raw {
            return Ok(response);
        }
        match self.output_builder {
            Some(builder) => builder.build(&response).map_err(Error::Projection),
            None => Ok(self.extract.apply(response)),
        }
    }
}
