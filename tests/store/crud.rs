//! Single-item operations: put, get, delete, update.

use dynochamber::{Error, Model, OperationKind, OperationTemplate, Store, StoreDefinition, TableName};
use serde_json::{json, Value};

use crate::common::*;

#[tokio::test]
async fn store_reports_its_table_name() {
    let store = movies_store(&driver());
    assert_eq!(store.table_name(), "Movies");
}

#[tokio::test]
async fn put_then_get() {
    let driver = driver();
    let store = movies_store(&driver);
    let movie = json!({"year": 2013, "title": "Superman", "gross": 2000000});

    store
        .call("addMovie", &Model::new().with("movie", movie.clone()))
        .await
        .unwrap();
    let found = store
        .call("getMovie", &Model::new().with("key", key(2013, "Superman")))
        .await
        .unwrap();

    assert_eq!(found, movie);
}

#[tokio::test]
async fn delete_then_get_is_null() {
    let driver = driver();
    driver.seed("Movies", &[json!({"year": 2013, "title": "Superman"})]);
    let store = movies_store(&driver);

    let model = Model::new().with("key", key(2013, "Superman"));
    store.call("deleteMovie", &model).await.unwrap();

    assert_eq!(store.call("getMovie", &model).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn composite_placeholder_builds_key() {
    let driver = driver();
    let movie = json!({"year": 2013, "title": "Superman:100:omg", "gross": 2000000});
    driver.seed("Movies", &[movie.clone()]);
    let store = movies_store(&driver);

    let model = Model::new()
        .with("year", 2013)
        .with("title", "Superman")
        .with("part", "100")
        .with("subtitle", "omg");
    let found = store.call("getMovieWithPart", &model).await.unwrap();

    assert_eq!(found, movie);
}

#[tokio::test]
async fn update_adds_and_sets() {
    let driver = driver();
    driver.seed("Movies", &[json!({"year": 2015, "title": "TMNT", "gross": 100000})]);
    let store = movies_store(&driver);

    let model = Model::new()
        .with("key", key(2015, "TMNT"))
        .with("rating", 4)
        .with("gross", 20000);
    store.call("addGrossAndSetRating", &model).await.unwrap();

    let found = store
        .call("getMovie", &Model::new().with("key", key(2015, "TMNT")))
        .await
        .unwrap();
    assert_eq!(
        found,
        json!({"year": 2015, "title": "TMNT", "rating": 4, "gross": 120000})
    );
}

#[tokio::test]
async fn failed_condition_surfaces_driver_error() {
    let driver = driver();
    driver.seed("Movies", &[json!({"year": 2015, "title": "TMNT", "gross": 120000})]);
    let store = movies_store(&driver);

    let model = Model::new().with("key", key(2015, "TMNT")).with("rating", 10);
    let err = store
        .call("setHighRatingsForHighGrossing", &model)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Driver(ref e) if e.code == "ConditionalCheckFailedException"));
}

#[tokio::test]
async fn missing_placeholder_is_reported_by_driver() {
    let driver = driver();
    let store = movies_store(&driver);

    let err = store.call("getMovie", &Model::new()).await.unwrap_err();

    assert!(matches!(err, Error::Driver(ref e) if e.code == "ValidationException"));
    assert_eq!(driver.calls()[0].1, json!({"TableName": "Movies"}));
}

#[tokio::test]
async fn table_name_resolver_runs_per_call() {
    let driver = driver();
    driver.seed("Movies", &[json!({"year": 2015, "title": "TMNT", "rating": 4})]);
    let definition = StoreDefinition::new(TableName::dynamic(|| "Movies".to_string()))
        .operation(
            "getMovie",
            OperationTemplate::new(OperationKind::Get).with_field("Key", "{{key}}"),
        )
        .unwrap();
    let store = Store::new(definition, driver.clone());

    assert_eq!(store.table_name(), "Movies");
    let found = store
        .call("getMovie", &Model::new().with("key", key(2015, "TMNT")))
        .await
        .unwrap();
    assert_eq!(found, json!({"year": 2015, "title": "TMNT", "rating": 4}));
}

#[tokio::test]
async fn unknown_table_is_a_driver_error() {
    let driver = driver();
    let store = Store::new(
        StoreDefinition::new("Missing")
            .operation(
                "getMovie",
                OperationTemplate::new(OperationKind::Get).with_field("Key", "{{key}}"),
            )
            .unwrap(),
        driver,
    );

    let err = store
        .call("getMovie", &Model::new().with("key", key(2013, "Superman")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Driver(ref e) if e.code == "ResourceNotFoundException"));
}
