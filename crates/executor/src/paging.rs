//! Paging engine.
//!
//! Drives repeated driver calls for one logical operation, following the
//! continuation token of each response. Pages are strictly sequential: the
//! token for page `n + 1` comes from page `n`, and a page callback must
//! resolve before the next fetch starts.
//!
//! ```text
//! Fetching --token--> HasMore --attach--> Fetching ... --no token--> Done
//!     |
//!     +--driver / projection / callback error--> aborted
//! ```
//!
//! Each page is shaped by the call's [`Projector`] and then handed to the
//! call's [`PageConsumer`]. The call yields the final fold accumulator when
//! a reducer is configured and `null` otherwise.

use dynochamber_core::request::{
    EXCLUSIVE_START_KEY, LAST_EVALUATED_KEY, REQUEST_ITEMS, UNPROCESSED_KEYS,
};
use dynochamber_core::{OperationKind, PageConsumer, Request};
use serde_json::Value;
use tracing::{debug, warn};

use crate::driver::{send, Driver};
use crate::output::Projector;
use crate::{Error, Result};

/// How a pageable kind signals and resumes "more pages".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Response `LastEvaluatedKey` becomes request `ExclusiveStartKey`
    StartKey,
    /// Non-empty response `UnprocessedKeys` becomes request `RequestItems`
    UnprocessedKeys,
}

impl Continuation {
    /// Continuation scheme for `kind`, or `None` when the kind never pages.
    pub const fn for_kind(kind: OperationKind) -> Option<Self> {
        match kind {
            OperationKind::Query | OperationKind::Scan => Some(Continuation::StartKey),
            OperationKind::BatchGet => Some(Continuation::UnprocessedKeys),
            OperationKind::Get
            | OperationKind::Put
            | OperationKind::Delete
            | OperationKind::Update
            | OperationKind::BatchWrite => None,
        }
    }

    /// The token carried by `response`, if more pages remain.
    pub fn token(self, response: &Value) -> Option<Value> {
        match self {
            Continuation::StartKey => response
                .get(LAST_EVALUATED_KEY)
                .filter(|token| !token.is_null())
                .cloned(),
            Continuation::UnprocessedKeys => response
                .get(UNPROCESSED_KEYS)
                .filter(|token| token.as_object().is_some_and(|keys| !keys.is_empty()))
                .cloned(),
        }
    }

    /// Point `request` at the page after the one that produced `token`.
    pub fn attach(self, request: &mut Request, token: Value) {
        match self {
            Continuation::StartKey => request.insert(EXCLUSIVE_START_KEY, token),
            Continuation::UnprocessedKeys => request.insert(REQUEST_ITEMS, token),
        }
    }
}

/// Fetch every page of `request`.
///
/// Any driver, projection or callback error aborts the loop immediately and
/// no accumulator is returned.
pub(crate) async fn run(
    driver: &dyn Driver,
    kind: OperationKind,
    mut request: Request,
    continuation: Continuation,
    projector: &Projector<'_>,
    consumer: &PageConsumer,
) -> Result<Value> {
    let mut accumulator = match consumer {
        PageConsumer::Reduce { initial, .. } => Some(initial.clone()),
        PageConsumer::Discard | PageConsumer::Callback(_) => None,
    };
    let mut page_number: u64 = 0;

    loop {
        page_number += 1;
        let response = send(driver, kind, request.clone()).await.map_err(|e| {
            warn!(%kind, page = page_number, code = %e.code, "driver failed mid-pagination");
            Error::Driver(e)
        })?;

        let token = continuation.token(&response);
        let page = projector.project(response)?;

        match consumer {
            PageConsumer::Discard => {}
            PageConsumer::Callback(callback) => {
                callback.call(page).await.map_err(Error::PageCallback)?;
            }
            PageConsumer::Reduce { reducer, .. } => {
                let acc = accumulator.take().unwrap_or(Value::Null);
                accumulator = Some(reducer.reduce(acc, page));
            }
        }

        match token {
            Some(token) => {
                debug!(%kind, page = page_number, "more pages remain");
                continuation.attach(&mut request, token);
            }
            None => break,
        }
    }

    debug!(%kind, pages = page_number, "pagination complete");
    Ok(accumulator.unwrap_or(Value::Null))
}
