//! Per-call options
//!
//! [`CallOptions`] change how one invocation of a named operation executes
//! without touching its template:
//!
//! | Option | Effect |
//! |--------|--------|
//! | `raw` | return driver responses untouched, skipping all projection |
//! | `pages` | `All` walks every page of a pageable operation |
//! | `consumer` | per-page callback, fold, or discard |
//! | `table_name` | target another table for this call only |
//!
//! Options travel either typed (attached to a [`Model`](crate::Model)) or as
//! an `_options` JSON object inside the model. Only the typed form can carry
//! callbacks and reducers.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::request::COUNT;
use crate::template::BoxError;

/// Boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Consumes one shaped page; the next page is fetched only after the returned
/// future resolves. An error aborts paging.
#[derive(Clone)]
pub struct PageCallback(
    Arc<dyn Fn(Value) -> BoxFuture<'static, std::result::Result<(), BoxError>> + Send + Sync>,
);

impl PageCallback {
    /// Wrap an async page consumer.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), BoxError>> + Send + 'static,
    {
        PageCallback(Arc::new(move |page| Box::pin(f(page))))
    }

    /// Hand a page to the consumer.
    pub fn call(&self, page: Value) -> BoxFuture<'static, std::result::Result<(), BoxError>> {
        (self.0)(page)
    }
}

impl fmt::Debug for PageCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PageCallback(..)")
    }
}

/// Folds one shaped page into the running accumulator.
#[derive(Clone)]
pub struct PageReducer(Arc<dyn Fn(Value, Value) -> Value + Send + Sync>);

impl PageReducer {
    /// Wrap a fold function `(accumulator, page) -> accumulator`.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    {
        PageReducer(Arc::new(f))
    }

    /// Apply one fold step.
    pub fn reduce(&self, accumulator: Value, page: Value) -> Value {
        (self.0)(accumulator, page)
    }
}

impl fmt::Debug for PageReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PageReducer(..)")
    }
}

/// How many pages a pageable operation fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pages {
    /// One driver call, whatever the continuation token says
    #[default]
    First,
    /// Follow continuation tokens until exhausted
    All,
}

/// Where the shaped pages of a multi-page call go.
///
/// Callback and fold are alternatives: a call either streams pages or
/// aggregates them.
#[derive(Debug, Clone, Default)]
pub enum PageConsumer {
    /// Pages are fetched and dropped; the call yields `null`
    #[default]
    Discard,
    /// Each page is handed to a callback; the call yields `null`
    Callback(PageCallback),
    /// Pages are folded; the call yields the final accumulator
    Reduce {
        /// Fold step
        reducer: PageReducer,
        /// Seed accumulator
        initial: Value,
    },
}

/// Options for a single call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    raw: Option<bool>,
    pages: Option<Pages>,
    consumer: PageConsumer,
    table_name: Option<String>,
}

impl CallOptions {
    /// Default options: projected, single page, store table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count-only reducer: raw responses, every page, summing each page's
    /// `Count` from `0`.
    pub fn records_counter() -> Self {
        Self::new().raw(true).all_pages().page_reduce(
            |acc, page| {
                let total = acc.as_u64().unwrap_or(0);
                let count = page.get(COUNT).and_then(Value::as_u64).unwrap_or(0);
                Value::from(total + count)
            },
            Value::from(0u64),
        )
    }

    /// Return driver responses untouched.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Choose how many pages to fetch.
    pub fn pages(mut self, pages: Pages) -> Self {
        self.pages = Some(pages);
        self
    }

    /// Fetch every page.
    pub fn all_pages(self) -> Self {
        self.pages(Pages::All)
    }

    /// Stream shaped pages to `f`. Replaces any configured fold.
    pub fn page_callback<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), BoxError>> + Send + 'static,
    {
        self.consumer = PageConsumer::Callback(PageCallback::new(f));
        self
    }

    /// Fold shaped pages with `f` starting from `initial`. Replaces any
    /// configured callback.
    pub fn page_reduce<F>(mut self, f: F, initial: Value) -> Self
    where
        F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    {
        self.consumer = PageConsumer::Reduce {
            reducer: PageReducer::new(f),
            initial,
        };
        self
    }

    /// Target another table for this call.
    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    /// Whether projection is skipped.
    pub fn is_raw(&self) -> bool {
        self.raw.unwrap_or(false)
    }

    /// Page mode.
    pub fn page_mode(&self) -> Pages {
        self.pages.unwrap_or_default()
    }

    /// Page consumer.
    pub fn consumer(&self) -> &PageConsumer {
        &self.consumer
    }

    /// Per-call table override.
    pub fn table_override(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Parse the `_options` object of a runtime model.
    ///
    /// `null` yields default options. `pages` follows truthiness: `false`,
    /// `0`, `""` and `null` mean a single page, anything else all pages.
    ///
    /// # Errors
    ///
    /// Returns an error for non-object input, wrongly typed members, or
    /// members that only the typed form can express (`pageCallback`,
    /// `pageReduce`).
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => {
                let serialized = SerializedOptions::deserialize(value)?;
                Ok(Self {
                    raw: serialized.raw,
                    pages: serialized.pages.map(|pages| {
                        if is_truthy(&pages) {
                            Pages::All
                        } else {
                            Pages::First
                        }
                    }),
                    consumer: PageConsumer::Discard,
                    table_name: serialized.table_name,
                })
            }
            other => Err(Error::InvalidOptions(format!(
                "options must be an object, got {}",
                other
            ))),
        }
    }

    /// Layer `typed` over `self`.
    ///
    /// Every option `typed` sets explicitly wins; the rest come from `self`.
    /// `raw(false)` therefore turns off a serialized `raw: true`.
    pub fn overlay(self, typed: CallOptions) -> CallOptions {
        CallOptions {
            raw: typed.raw.or(self.raw),
            pages: typed.pages.or(self.pages),
            consumer: match typed.consumer {
                PageConsumer::Discard => self.consumer,
                consumer => consumer,
            },
            table_name: typed.table_name.or(self.table_name),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct SerializedOptions {
    #[serde(default)]
    raw: Option<bool>,
    #[serde(default)]
    pages: Option<Value>,
    #[serde(default)]
    table_name: Option<String>,
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
