//! The Dispatcher - picks and runs the execution strategy for one call.
//!
//! The dispatcher is stateless apart from its [`KindTable`], an immutable
//! per-kind profile built once and shared by every call. For each call it:
//!
//! 1. applies the per-call table override to `TableName`
//! 2. rebinds a dynamic `tableName` key inside batch `RequestItems`
//! 3. selects [`Strategy::Standard`] or [`Strategy::Paging`]
//! 4. runs the strategy and shapes responses through a [`Projector`]

use dynochamber_core::request::{DYNAMIC_TABLE_KEY, REQUEST_ITEMS};
use dynochamber_core::{CallOptions, OperationKind, OutputBuilder, Pages, Request};
use serde_json::Value;
use tracing::debug;

use crate::driver::{send, Driver};
use crate::output::{Extract, Projector};
use crate::paging::{self, Continuation};
use crate::Result;

/// Execution strategy for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Exactly one driver call
    Standard,
    /// Follow continuation tokens until exhausted
    Paging(Continuation),
}

/// Static facts about one operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindProfile {
    /// Default projection
    pub extract: Extract,
    /// Continuation scheme; `None` for kinds that never page
    pub continuation: Option<Continuation>,
}

impl KindProfile {
    /// The built-in profile for `kind`.
    pub const fn for_kind(kind: OperationKind) -> Self {
        Self {
            extract: Extract::for_kind(kind),
            continuation: Continuation::for_kind(kind),
        }
    }
}

/// Immutable kind -> profile table.
#[derive(Debug, Clone)]
pub struct KindTable {
    profiles: [KindProfile; 8],
}

impl KindTable {
    /// The built-in profiles for every kind.
    pub fn standard() -> Self {
        Self {
            profiles: OperationKind::ALL.map(KindProfile::for_kind),
        }
    }

    /// Profile for `kind`.
    pub fn profile(&self, kind: OperationKind) -> KindProfile {
        self.profiles[slot(kind)]
    }
}

impl Default for KindTable {
    fn default() -> Self {
        Self::standard()
    }
}

const fn slot(kind: OperationKind) -> usize {
    match kind {
        OperationKind::Get => 0,
        OperationKind::Put => 1,
        OperationKind::Delete => 2,
        OperationKind::Update => 3,
        OperationKind::Query => 4,
        OperationKind::Scan => 5,
        OperationKind::BatchGet => 6,
        OperationKind::BatchWrite => 7,
    }
}

/// Stateless strategy selector and runner.
///
/// # Thread Safety
///
/// Dispatcher is `Send + Sync` and is shared by every call of a store.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    table: KindTable,
}

impl Dispatcher {
    /// Create a dispatcher over an explicit kind table.
    pub fn new(table: KindTable) -> Self {
        Self { table }
    }

    /// The kind table.
    pub fn table(&self) -> &KindTable {
        &self.table
    }

    /// Pick the strategy for `kind` under `options`.
    ///
    /// Pageable kinds run as a single call unless every page was requested.
    pub fn strategy(&self, kind: OperationKind, options: &CallOptions) -> Strategy {
        match (self.table.profile(kind).continuation, options.page_mode()) {
            (Some(continuation), Pages::All) => Strategy::Paging(continuation),
            _ => Strategy::Standard,
        }
    }

    /// Apply call-time table rebinding to a compiled request.
    pub fn prepare(&self, kind: OperationKind, request: &mut Request, options: &CallOptions) {
        if let Some(table) = options.table_override() {
            request.set_table_name(table);
        }

        if kind.is_batch() {
            if let Some(table) = request.table_name().map(str::to_string) {
                if let Some(Value::Object(items)) = request.get_mut(REQUEST_ITEMS) {
                    if let Some(entry) = items.remove(DYNAMIC_TABLE_KEY) {
                        items.insert(table, entry);
                    }
                }
            }
        }
    }

    /// Run a compiled request to completion.
    ///
    /// # Errors
    ///
    /// Driver errors pass through verbatim; projection and page callback
    /// failures end the call. No partial result is returned.
    pub async fn execute(
        &self,
        driver: &dyn Driver,
        kind: OperationKind,
        mut request: Request,
        options: &CallOptions,
        output_builder: Option<&OutputBuilder>,
    ) -> Result<Value> {
        self.prepare(kind, &mut request, options);

        let profile = self.table.profile(kind);
        let projector = Projector::new(profile.extract, options.is_raw(), output_builder);
        let strategy = self.strategy(kind, options);
        debug!(%kind, ?strategy, table = request.table_name(), "dispatching");

        match strategy {
            Strategy::Standard => {
                let response = send(driver, kind, request).await?;
                projector.project(response)
            }
            Strategy::Paging(continuation) => {
                paging::run(
                    driver,
                    kind,
                    request,
                    continuation,
                    &projector,
                    options.consumer(),
                )
                .await
            }
        }
    }
}
