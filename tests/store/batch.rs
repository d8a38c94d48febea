//! Batch operations and the dynamic `tableName` key.

use std::sync::Arc;

use dynochamber::{CallOptions, Model, OperationKind, OperationTemplate, Store, StoreDefinition};
use serde_json::{json, Value};

use crate::common::*;

fn two_movies() -> Vec<Value> {
    vec![
        json!({"year": 2015, "title": "TMNT", "gross": 100000}),
        json!({"year": 2015, "title": "Interstellar", "gross": 10000000}),
    ]
}

fn keys_of(movies: &[Value]) -> Value {
    Value::Array(
        movies
            .iter()
            .map(|m| key(m["year"].as_i64().unwrap(), m["title"].as_str().unwrap()))
            .collect(),
    )
}

fn find<'a>(items: &'a Value, title: &str) -> Option<&'a Value> {
    items
        .as_array()?
        .iter()
        .find(|item| item["title"] == json!(title))
}

#[tokio::test]
async fn batch_write_then_batch_get() {
    let driver = driver();
    let store = movies_store(&driver);
    let movies = two_movies();

    store
        .call("addMovies", &Model::new().with("movies", movies.clone()))
        .await
        .unwrap();
    let result = store
        .call("getMovies", &Model::new().with("keys", keys_of(&movies)))
        .await
        .unwrap();

    assert_eq!(find(&result["Movies"], "TMNT"), Some(&movies[0]));
    assert_eq!(find(&result["Movies"], "Interstellar"), Some(&movies[1]));
}

#[tokio::test]
async fn batch_write_request_list_is_generated() {
    let driver = driver();
    let store = movies_store(&driver);

    store
        .call("addMovies", &Model::new().with("movies", two_movies()))
        .await
        .unwrap();

    let (kind, request) = &driver.calls()[0];
    assert_eq!(*kind, OperationKind::BatchWrite);
    assert_eq!(
        request["RequestItems"]["Movies"],
        json!([
            {"PutRequest": {"Item": two_movies()[0]}},
            {"PutRequest": {"Item": two_movies()[1]}}
        ])
    );
}

#[tokio::test]
async fn dynamic_table_key_uses_store_table() {
    let driver = driver();
    let movies = two_movies();
    driver.seed("Movies", &movies);
    let store = movies_store(&driver);

    let result = store
        .call(
            "getMoviesWithDynamicTableName",
            &Model::new().with("keys", keys_of(&movies)),
        )
        .await
        .unwrap();

    assert_eq!(find(&result["Movies"], "TMNT"), Some(&movies[0]));
    assert_eq!(find(&result["Movies"], "Interstellar"), Some(&movies[1]));
}

#[tokio::test]
async fn dynamic_table_key_follows_call_override() {
    let driver = driver();
    let movies = two_movies();
    driver.seed("Movies", &movies);
    let definition = StoreDefinition::new("Movies-Incorrect")
        .operation(
            "getMoviesWithDynamicTableName",
            OperationTemplate::from_json(
                OperationKind::BatchGet,
                json!({"RequestItems": {"tableName": {"Keys": "{{keys}}"}}}),
            )
            .unwrap(),
        )
        .unwrap();
    let store = Store::new(definition, driver.clone());

    let model = Model::new()
        .with("keys", keys_of(&movies))
        .with("_options", json!({"tableName": "Movies"}));
    let result = store
        .call("getMoviesWithDynamicTableName", &model)
        .await
        .unwrap();

    assert_eq!(find(&result["Movies"], "TMNT"), Some(&movies[0]));
    assert_eq!(find(&result["Movies"], "Interstellar"), Some(&movies[1]));
    let request = &driver.calls()[0].1;
    assert_eq!(request["TableName"], json!("Movies"));
    assert!(request["RequestItems"].get("tableName").is_none());
}

#[tokio::test]
async fn dynamic_table_key_in_batch_write() {
    let driver = driver();
    let movies = two_movies();
    driver.seed("Films", &movies);
    let store = movies_store(&driver);

    let model = Model::new()
        .with("keys", keys_of(&movies[..1]))
        .with_options(CallOptions::new().table_name("Films"));
    store.call("removeMovies", &model).await.unwrap();

    let film = store
        .call(
            "getMovie",
            &Model::new()
                .with("key", key(2015, "Interstellar"))
                .with("_options", json!({"tableName": "Films"})),
        )
        .await
        .unwrap();
    assert_eq!(film, movies[1]);
    let gone = store
        .call(
            "getMovie",
            &Model::new()
                .with("key", key(2015, "TMNT"))
                .with("_options", json!({"tableName": "Films"})),
        )
        .await
        .unwrap();
    assert_eq!(gone, Value::Null);
}

#[tokio::test]
async fn batch_get_pages_through_unprocessed_keys() {
    let driver = Arc::new(MemoryDriver::with_tables(&["Movies"]).batch_get_limit(1));
    let movies = two_movies();
    driver.seed("Movies", &movies);
    let store = movies_store(&driver);

    let options = CallOptions::new().all_pages().page_reduce(
        |mut acc, page| {
            if let (Some(all), Some(found)) = (acc.as_array_mut(), page["Movies"].as_array()) {
                all.extend(found.iter().cloned());
            }
            acc
        },
        json!([]),
    );
    let model = Model::new()
        .with("keys", keys_of(&movies))
        .with_options(options);
    let result = store.call("getMovies", &model).await.unwrap();

    assert_eq!(driver.count(OperationKind::BatchGet), 2);
    assert_eq!(find(&result, "TMNT"), Some(&movies[0]));
    assert_eq!(find(&result, "Interstellar"), Some(&movies[1]));
}

#[tokio::test]
async fn batch_get_without_pages_returns_first_batch() {
    let driver = Arc::new(MemoryDriver::with_tables(&["Movies"]).batch_get_limit(1));
    let movies = two_movies();
    driver.seed("Movies", &movies);
    let store = movies_store(&driver);

    let result = store
        .call("getMovies", &Model::new().with("keys", keys_of(&movies)))
        .await
        .unwrap();

    assert_eq!(result["Movies"].as_array().map(Vec::len), Some(1));
    assert_eq!(driver.count(OperationKind::BatchGet), 1);
}
