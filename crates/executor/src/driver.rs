//! Driver contract.
//!
//! The driver is the external collaborator that talks to the document store.
//! It receives compiled requests and returns raw JSON responses; network
//! calls, timeouts, retries and backoff all live behind this trait.
//!
//! Response fields read by the default projections: `Item`, `Items`,
//! `Responses`, `LastEvaluatedKey`, `UnprocessedKeys`, `Count`.

use async_trait::async_trait;
use dynochamber_core::{OperationKind, Request};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error reported by a driver, passed to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct DriverError {
    /// Machine-readable code, e.g. `ConditionalCheckFailedException`
    pub code: String,
    /// Human-readable description
    pub message: String,
}

impl DriverError {
    /// Create a driver error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Result type for driver calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Async interface to the document store, one method per operation kind.
///
/// Implementations must be safe to share across concurrent calls.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Fetch a single item.
    async fn get(&self, request: Request) -> DriverResult<Value>;

    /// Create or replace a single item.
    async fn put(&self, request: Request) -> DriverResult<Value>;

    /// Remove a single item.
    async fn delete(&self, request: Request) -> DriverResult<Value>;

    /// Modify a single item.
    async fn update(&self, request: Request) -> DriverResult<Value>;

    /// Run a key-condition query; one page per call.
    async fn query(&self, request: Request) -> DriverResult<Value>;

    /// Scan a table; one page per call.
    async fn scan(&self, request: Request) -> DriverResult<Value>;

    /// Fetch many items by key; one page per call.
    async fn batch_get(&self, request: Request) -> DriverResult<Value>;

    /// Put and delete many items.
    async fn batch_write(&self, request: Request) -> DriverResult<Value>;
}

/// Route a compiled request to the driver method for `kind`.
pub(crate) async fn send(
    driver: &dyn Driver,
    kind: OperationKind,
    request: Request,
) -> DriverResult<Value> {
    match kind {
        OperationKind::Get => driver.get(request).await,
        OperationKind::Put => driver.put(request).await,
        OperationKind::Delete => driver.delete(request).await,
        OperationKind::Update => driver.update(request).await,
        OperationKind::Query => driver.query(request).await,
        OperationKind::Scan => driver.scan(request).await,
        OperationKind::BatchGet => driver.batch_get(request).await,
        OperationKind::BatchWrite => driver.batch_write(request).await,
    }
}
