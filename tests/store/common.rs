//! Shared fixtures for the store suite.
//!
//! [`MemoryDriver`] keeps tables keyed by `(year, title)` in memory and
//! understands just enough of the request protocol for the movie fixtures:
//! `set`/`add` update expressions, one comparison condition, an equality key
//! condition for queries, `Limit`/`ExclusiveStartKey` paging and
//! `Select: COUNT`.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use dynochamber::{
    helpers::{batch_write, BatchWriteSpec},
    Driver, DriverError, DriverResult, OperationKind, OperationTemplate, Request, Store,
    StoreDefinition, TemplateNode,
};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

type Key = (i64, String);
type Table = BTreeMap<Key, Map<String, Value>>;

// ============================================================================
// MemoryDriver
// ============================================================================

/// In-memory tables behind the [`Driver`] contract.
#[derive(Default)]
pub struct MemoryDriver {
    tables: Mutex<HashMap<String, Table>>,
    batch_get_limit: Option<usize>,
    calls: Mutex<Vec<(OperationKind, Value)>>,
}

impl MemoryDriver {
    /// Driver with the given empty tables.
    pub fn with_tables(names: &[&str]) -> Self {
        let driver = Self::default();
        {
            let mut tables = driver.tables.lock();
            for name in names {
                tables.insert(name.to_string(), Table::new());
            }
        }
        driver
    }

    /// Answer at most `limit` keys per batch get; the rest come back as
    /// `UnprocessedKeys`.
    pub fn batch_get_limit(mut self, limit: usize) -> Self {
        self.batch_get_limit = Some(limit);
        self
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<(OperationKind, Value)> {
        self.calls.lock().clone()
    }

    /// Number of requests of one kind received so far.
    pub fn count(&self, kind: OperationKind) -> usize {
        self.calls.lock().iter().filter(|(k, _)| *k == kind).count()
    }

    /// Insert items directly, bypassing any store.
    pub fn seed(&self, table: &str, items: &[Value]) {
        let mut tables = self.tables.lock();
        let table = tables.entry(table.to_string()).or_default();
        for item in items {
            let item = item.as_object().cloned().unwrap_or_default();
            if let Ok(key) = key_of(&item) {
                table.insert(key, item);
            }
        }
    }

    fn record(&self, kind: OperationKind, request: &Request) -> Map<String, Value> {
        self.calls.lock().push((kind, request.to_value()));
        request.body().clone()
    }

    fn with_table<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Table) -> DriverResult<T>,
    ) -> DriverResult<T> {
        let mut tables = self.tables.lock();
        match tables.get_mut(name) {
            Some(table) => f(table),
            None => Err(DriverError::new(
                "ResourceNotFoundException",
                format!("Requested resource not found: Table: {} not found", name),
            )),
        }
    }
}

fn validation(message: impl Into<String>) -> DriverError {
    DriverError::new("ValidationException", message)
}

fn key_of(value: &Map<String, Value>) -> DriverResult<Key> {
    match (value.get("year").and_then(Value::as_i64), value.get("title").and_then(Value::as_str)) {
        (Some(year), Some(title)) => Ok((year, title.to_string())),
        _ => Err(validation(
            "The provided key element does not match the schema",
        )),
    }
}

fn key_value(key: &Key) -> Value {
    json!({ "year": key.0, "title": key.1 })
}

fn table_name(body: &Map<String, Value>) -> DriverResult<String> {
    body.get("TableName")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| validation("TableName is required"))
}

fn object(body: &Map<String, Value>, field: &str) -> DriverResult<Map<String, Value>> {
    body.get(field)
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| validation(format!("{} must be a map", field)))
}

fn attribute_value(body: &Map<String, Value>, name: &str) -> DriverResult<Value> {
    body.get("ExpressionAttributeValues")
        .and_then(|values| values.get(name))
        .cloned()
        .ok_or_else(|| validation(format!("unresolved attribute value {}", name)))
}

fn attribute_name(body: &Map<String, Value>, token: &str) -> String {
    if token.starts_with('#') {
        if let Some(name) = body
            .get("ExpressionAttributeNames")
            .and_then(|names| names.get(token))
            .and_then(Value::as_str)
        {
            return name.to_string();
        }
    }
    token.to_string()
}

fn check_condition(body: &Map<String, Value>, item: Option<&Map<String, Value>>) -> DriverResult<()> {
    let expression = match body.get("ConditionExpression").and_then(Value::as_str) {
        Some(expression) => expression,
        None => return Ok(()),
    };
    let tokens: Vec<&str> = expression.split_whitespace().collect();
    let [lhs, op, rhs] = tokens[..] else {
        return Err(validation(format!("unsupported condition {}", expression)));
    };
    let actual = item
        .and_then(|item| item.get(&attribute_name(body, lhs)))
        .and_then(Value::as_f64);
    let expected = attribute_value(body, rhs)?.as_f64();
    let holds = match (actual, expected, op) {
        (Some(a), Some(e), ">") => a > e,
        (Some(a), Some(e), "<") => a < e,
        (Some(a), Some(e), "=") => a == e,
        _ => false,
    };
    if holds {
        Ok(())
    } else {
        Err(DriverError::new(
            "ConditionalCheckFailedException",
            "The conditional request failed",
        ))
    }
}

fn apply_update(body: &Map<String, Value>, item: &mut Map<String, Value>) -> DriverResult<()> {
    let expression = body
        .get("UpdateExpression")
        .and_then(Value::as_str)
        .ok_or_else(|| validation("UpdateExpression is required"))?;
    let tokens: Vec<String> = expression
        .split_whitespace()
        .map(|t| t.trim_end_matches(',').to_string())
        .collect();

    let mut i = 0;
    let mut mode = "";
    while i < tokens.len() {
        match tokens[i].to_ascii_lowercase().as_str() {
            "set" | "add" => {
                mode = if tokens[i].eq_ignore_ascii_case("set") { "set" } else { "add" };
                i += 1;
            }
            _ if mode == "set" && tokens.get(i + 1).map(String::as_str) == Some("=") => {
                let name = attribute_name(body, &tokens[i]);
                let value = attribute_value(body, tokens.get(i + 2).map_or("", String::as_str))?;
                item.insert(name, value);
                i += 3;
            }
            _ if mode == "add" => {
                let name = attribute_name(body, &tokens[i]);
                let delta = attribute_value(body, tokens.get(i + 1).map_or("", String::as_str))?;
                let current = item.get(&name).and_then(Value::as_i64).unwrap_or(0);
                let delta = delta
                    .as_i64()
                    .ok_or_else(|| validation("add requires a number"))?;
                item.insert(name, json!(current + delta));
                i += 2;
            }
            _ => return Err(validation(format!("unsupported update {}", expression))),
        }
    }
    Ok(())
}

/// One page of `items` after `ExclusiveStartKey`, honouring `Limit`.
fn page<'a>(
    body: &Map<String, Value>,
    items: impl Iterator<Item = (&'a Key, &'a Map<String, Value>)>,
) -> DriverResult<Value> {
    let start = match body.get("ExclusiveStartKey").and_then(Value::as_object) {
        Some(start) => Bound::Excluded(key_of(start)?),
        None => Bound::Unbounded,
    };
    let limit = body.get("Limit").and_then(Value::as_u64).map(|l| l as usize);

    let mut selected: Vec<(&Key, &Map<String, Value>)> = items
        .filter(|(key, _)| match &start {
            Bound::Excluded(start) => *key > start,
            _ => true,
        })
        .collect();
    let mut last_key = None;
    if let Some(limit) = limit {
        if selected.len() >= limit {
            selected.truncate(limit);
            last_key = selected.last().map(|(key, _)| key_value(key));
        }
    }

    let mut response = json!({ "Count": selected.len(), "ScannedCount": selected.len() });
    if body.get("Select").and_then(Value::as_str) != Some("COUNT") {
        response["Items"] = Value::Array(
            selected
                .iter()
                .map(|(_, item)| Value::Object((*item).clone()))
                .collect(),
        );
    }
    if let Some(key) = last_key {
        response["LastEvaluatedKey"] = key;
    }
    Ok(response)
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn get(&self, request: Request) -> DriverResult<Value> {
        let body = self.record(OperationKind::Get, &request);
        let key = key_of(&object(&body, "Key")?)?;
        self.with_table(&table_name(&body)?, |table| {
            Ok(match table.get(&key) {
                Some(item) => json!({ "Item": item }),
                None => json!({}),
            })
        })
    }

    async fn put(&self, request: Request) -> DriverResult<Value> {
        let body = self.record(OperationKind::Put, &request);
        let item = object(&body, "Item")?;
        let key = key_of(&item)?;
        self.with_table(&table_name(&body)?, |table| {
            check_condition(&body, table.get(&key))?;
            table.insert(key, item);
            Ok(json!({}))
        })
    }

    async fn delete(&self, request: Request) -> DriverResult<Value> {
        let body = self.record(OperationKind::Delete, &request);
        let key = key_of(&object(&body, "Key")?)?;
        self.with_table(&table_name(&body)?, |table| {
            check_condition(&body, table.get(&key))?;
            table.remove(&key);
            Ok(json!({}))
        })
    }

    async fn update(&self, request: Request) -> DriverResult<Value> {
        let body = self.record(OperationKind::Update, &request);
        let key_map = object(&body, "Key")?;
        let key = key_of(&key_map)?;
        self.with_table(&table_name(&body)?, |table| {
            check_condition(&body, table.get(&key))?;
            let mut item = table.get(&key).cloned().unwrap_or(key_map);
            apply_update(&body, &mut item)?;
            table.insert(key, item);
            Ok(json!({}))
        })
    }

    async fn query(&self, request: Request) -> DriverResult<Value> {
        let body = self.record(OperationKind::Query, &request);
        let expression = body
            .get("KeyConditionExpression")
            .and_then(Value::as_str)
            .ok_or_else(|| validation("KeyConditionExpression is required"))?;
        let tokens: Vec<&str> = expression.split_whitespace().collect();
        let [lhs, "=", rhs] = tokens[..] else {
            return Err(validation(format!("unsupported key condition {}", expression)));
        };
        let attribute = attribute_name(&body, lhs);
        let expected = attribute_value(&body, rhs)?;

        self.with_table(&table_name(&body)?, |table| {
            page(
                &body,
                table
                    .iter()
                    .filter(|(_, item)| item.get(&attribute) == Some(&expected)),
            )
        })
    }

    async fn scan(&self, request: Request) -> DriverResult<Value> {
        let body = self.record(OperationKind::Scan, &request);
        self.with_table(&table_name(&body)?, |table| page(&body, table.iter()))
    }

    async fn batch_get(&self, request: Request) -> DriverResult<Value> {
        let body = self.record(OperationKind::BatchGet, &request);
        let mut budget = self.batch_get_limit.unwrap_or(usize::MAX);
        let mut responses = Map::new();
        let mut unprocessed = Map::new();

        for (name, entry) in object(&body, "RequestItems")? {
            let keys = entry
                .get("Keys")
                .and_then(Value::as_array)
                .cloned()
                .ok_or_else(|| validation("Keys must be a list"))?;
            let take = budget.min(keys.len());
            budget -= take;
            let (now, later) = keys.split_at(take);

            let found = self.with_table(&name, |table| {
                now.iter()
                    .map(|key| key_of(key.as_object().unwrap_or(&Map::new())))
                    .filter_map(|key| match key {
                        Ok(key) => table.get(&key).map(|item| Ok(Value::Object(item.clone()))),
                        Err(e) => Some(Err(e)),
                    })
                    .collect::<DriverResult<Vec<Value>>>()
            })?;
            responses.insert(name.clone(), Value::Array(found));
            if !later.is_empty() {
                unprocessed.insert(name, json!({ "Keys": later }));
            }
        }

        Ok(json!({ "Responses": responses, "UnprocessedKeys": unprocessed }))
    }

    async fn batch_write(&self, request: Request) -> DriverResult<Value> {
        let body = self.record(OperationKind::BatchWrite, &request);
        for (name, writes) in object(&body, "RequestItems")? {
            let writes = writes
                .as_array()
                .cloned()
                .ok_or_else(|| validation("write requests must be a list"))?;
            self.with_table(&name, |table| {
                for write in &writes {
                    if let Some(item) = write.pointer("/PutRequest/Item").and_then(Value::as_object) {
                        table.insert(key_of(item)?, item.clone());
                    } else if let Some(key) =
                        write.pointer("/DeleteRequest/Key").and_then(Value::as_object)
                    {
                        table.remove(&key_of(key)?);
                    } else {
                        return Err(validation("unknown write request"));
                    }
                }
                Ok(())
            })?;
        }
        Ok(json!({ "UnprocessedItems": {} }))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Fresh `Movies` and `Films` tables.
pub fn driver() -> Arc<MemoryDriver> {
    Arc::new(MemoryDriver::with_tables(&["Movies", "Films"]))
}

/// The movie store definition used across the suite.
pub fn movies_definition() -> StoreDefinition {
    let year_query = json!({
        "KeyConditionExpression": "#year = :year",
        "ExpressionAttributeNames": { "#year": "year" },
        "ExpressionAttributeValues": { ":year": "{{year}}" },
        "Limit": 3
    });

    let operations = vec![
        ("addMovie", OperationTemplate::new(OperationKind::Put).with_field("Item", "{{movie}}")),
        (
            "getMovieWithPart",
            OperationTemplate::new(OperationKind::Get).with_field(
                "Key",
                json!({ "title": "{{title}}:{{part}}:{{subtitle}}", "year": "{{year}}" }),
            ),
        ),
        ("getMovie", OperationTemplate::new(OperationKind::Get).with_field("Key", "{{key}}")),
        ("deleteMovie", OperationTemplate::new(OperationKind::Delete).with_field("Key", "{{key}}")),
        (
            "addMovies",
            OperationTemplate::new(OperationKind::BatchWrite).with_field(
                "RequestItems",
                TemplateNode::object([(
                    "Movies",
                    batch_write(BatchWriteSpec::new().put("{{movies}}")),
                )]),
            ),
        ),
        (
            "removeMovies",
            OperationTemplate::new(OperationKind::BatchWrite).with_field(
                "RequestItems",
                TemplateNode::object([(
                    "tableName",
                    batch_write(BatchWriteSpec::new().delete("{{keys}}")),
                )]),
            ),
        ),
        (
            "getMovies",
            OperationTemplate::from_json(
                OperationKind::BatchGet,
                json!({ "RequestItems": { "Movies": { "Keys": "{{keys}}" } } }),
            )
            .unwrap(),
        ),
        (
            "addGrossAndSetRating",
            OperationTemplate::from_json(
                OperationKind::Update,
                json!({
                    "Key": "{{key}}",
                    "UpdateExpression": "set rating = :rating add gross :gross",
                    "ExpressionAttributeValues": { ":rating": "{{rating}}", ":gross": "{{gross}}" }
                }),
            )
            .unwrap(),
        ),
        (
            "getAllMovies",
            OperationTemplate::new(OperationKind::Scan).with_field("Limit", json!(3)),
        ),
        (
            "setHighRatingsForHighGrossing",
            OperationTemplate::from_json(
                OperationKind::Update,
                json!({
                    "Key": "{{key}}",
                    "UpdateExpression": "set rating = :rating",
                    "ConditionExpression": "gross > :grossLevel",
                    "ExpressionAttributeValues": { ":rating": "{{rating}}", ":grossLevel": 500000 }
                }),
            )
            .unwrap(),
        ),
        (
            "queryMoviesByYear",
            OperationTemplate::from_json(OperationKind::Query, year_query).unwrap(),
        ),
        (
            "getMoviesCountWithPaging",
            OperationTemplate::from_json(
                OperationKind::Scan,
                json!({ "Select": "COUNT", "Limit": 2 }),
            )
            .unwrap(),
        ),
        (
            "getMoviesWithDynamicTableName",
            OperationTemplate::from_json(
                OperationKind::BatchGet,
                json!({ "RequestItems": { "tableName": { "Keys": "{{keys}}" } } }),
            )
            .unwrap(),
        ),
    ];

    operations
        .into_iter()
        .try_fold(StoreDefinition::new("Movies"), |definition, (name, template)| {
            definition.operation(name, template)
        })
        .unwrap()
}

/// Movie store over `driver`.
pub fn movies_store(driver: &Arc<MemoryDriver>) -> Store {
    Store::new(movies_definition(), driver.clone())
}

/// Key of a movie fixture.
pub fn key(year: i64, title: &str) -> Value {
    json!({ "year": year, "title": title })
}

/// Titles of a list of items, in order.
pub fn titles(items: &Value) -> Vec<String> {
    items
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Fourteen movies across several years; seven of them from 1985.
pub fn library() -> Vec<Value> {
    vec![
        json!({"year": 2001, "title": "Matrix"}),
        json!({"year": 1995, "title": "ToyStory"}),
        json!({"year": 1990, "title": "It"}),
        json!({"year": 1982, "title": "The Thing"}),
        json!({"year": 1978, "title": "Halloween"}),
        json!({"year": 1985, "title": "Robocop"}),
        json!({"year": 1985, "title": "Back to the Future"}),
        json!({"year": 1985, "title": "The Goonies"}),
        json!({"year": 1985, "title": "The Breakfast Club"}),
        json!({"year": 1985, "title": "Rocky IV"}),
        json!({"year": 1985, "title": "A Nightmare on Elm Street Part 2: Freddy's Revenge"}),
        json!({"year": 1985, "title": "Commando"}),
        json!({"year": 2015, "title": "Interstellar", "gross": 10000000}),
        json!({"year": 2015, "title": "TMNT", "gross": 120000, "rating": 4}),
    ]
}

/// The 1985 titles in key order.
pub fn titles_1985() -> Vec<String> {
    [
        "A Nightmare on Elm Street Part 2: Freddy's Revenge",
        "Back to the Future",
        "Commando",
        "Robocop",
        "Rocky IV",
        "The Breakfast Club",
        "The Goonies",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

/// Driver whose `Movies` table holds [`library`].
pub fn library_driver() -> Arc<MemoryDriver> {
    let driver = driver();
    driver.seed("Movies", &library());
    driver
}

/// Store with one extra query operation, `getMovieNames`, for `year`.
pub fn names_store<F>(driver: &Arc<MemoryDriver>, limit: Option<u64>, output_builder: F) -> Store
where
    F: Fn(&Value) -> Result<Value, dynochamber::BoxError> + Send + Sync + 'static,
{
    let mut template = OperationTemplate::from_json(
        OperationKind::Query,
        json!({
            "KeyConditionExpression": "#year = :year",
            "ExpressionAttributeNames": { "#year": "year" },
            "ExpressionAttributeValues": { ":year": "{{year}}" }
        }),
    )
    .unwrap()
    .with_output_builder(output_builder);
    if let Some(limit) = limit {
        template = template.with_field("Limit", json!(limit));
    }
    let definition = StoreDefinition::new("Movies")
        .operation("getMovieNames", template)
        .unwrap();
    Store::new(definition, driver.clone())
}
