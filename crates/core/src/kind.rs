//! Operation kind enumeration
//!
//! Every template names exactly one kind of store operation. The kind decides
//! which driver method receives the compiled request, whether the operation
//! may be paged, and how a raw response is reduced to the caller-visible shape
//! when no output builder is configured.
//!
//! | Kind | Driver method | Pageable | Default projection |
//! |------|---------------|----------|--------------------|
//! | Get | `get` | no | `Item` |
//! | Put | `put` | no | response |
//! | Delete | `delete` | no | response |
//! | Update | `update` | no | response |
//! | Query | `query` | yes | `Items` |
//! | Scan | `scan` | yes | `Items` |
//! | BatchGet | `batch_get` | yes | `Responses` |
//! | BatchWrite | `batch_write` | no | response |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The eight store operation kinds a template can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    /// Fetch a single item by key
    Get,
    /// Create or replace a single item
    Put,
    /// Remove a single item by key
    Delete,
    /// Modify attributes of a single item
    Update,
    /// Key-condition query, possibly spanning pages
    Query,
    /// Full table scan, possibly spanning pages
    Scan,
    /// Fetch many items by key, possibly spanning pages
    BatchGet,
    /// Put and delete many items in one request
    BatchWrite,
}

impl OperationKind {
    /// All operation kinds (for iteration)
    pub const ALL: [OperationKind; 8] = [
        OperationKind::Get,
        OperationKind::Put,
        OperationKind::Delete,
        OperationKind::Update,
        OperationKind::Query,
        OperationKind::Scan,
        OperationKind::BatchGet,
        OperationKind::BatchWrite,
    ];

    /// Short identifier used in template definitions (`_type`)
    pub const fn id(&self) -> &'static str {
        match self {
            OperationKind::Get => "get",
            OperationKind::Put => "put",
            OperationKind::Delete => "delete",
            OperationKind::Update => "update",
            OperationKind::Query => "query",
            OperationKind::Scan => "scan",
            OperationKind::BatchGet => "batchGet",
            OperationKind::BatchWrite => "batchWrite",
        }
    }

    /// Parse from short identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }

    /// Whether responses of this kind may carry a continuation token.
    ///
    /// Pageable kinds still execute as a single call unless the caller asks
    /// for all pages.
    pub const fn is_pageable(&self) -> bool {
        match self {
            OperationKind::Query | OperationKind::Scan | OperationKind::BatchGet => true,
            OperationKind::Get
            | OperationKind::Put
            | OperationKind::Delete
            | OperationKind::Update
            | OperationKind::BatchWrite => false,
        }
    }

    /// Whether this kind addresses many tables through `RequestItems`.
    pub const fn is_batch(&self) -> bool {
        matches!(self, OperationKind::BatchGet | OperationKind::BatchWrite)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}
