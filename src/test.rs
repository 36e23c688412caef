use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use crate::{
    server::{router, ServerConfig},
    state::ApiState,
    store::{Book, BookStore, Lookup, StoreError},
};

async fn test_store() -> BookStore {
    // A single connection keeps the in-memory database alive for the whole
    // test, a recycled connection would drop it.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    let store = BookStore::new(pool);
    store.migrate().await.expect("Migration failed");

    store
}

async fn test_app() -> (Router, BookStore) {
    let store = test_store().await;
    let app = router(ApiState::new(store.clone()));

    (app, store)
}

fn power_up() -> Book {
    Book {
        isbn: "0691161518".to_string(),
        amazon_url: "http://a.co/eobPtX2".to_string(),
        author: "Matthew Lane".to_string(),
        language: "english".to_string(),
        pages: 264,
        publisher: "Princeton University Press".to_string(),
        title: "Power-Up: Unlocking the Hidden Mathematics in Video Games".to_string(),
        year: 2017,
    }
}

fn dogs_are_nicer() -> Book {
    Book {
        isbn: "0691161517".to_string(),
        amazon_url: "http://a.co/eobPtX3".to_string(),
        author: "Jamie Lee".to_string(),
        language: "english".to_string(),
        pages: 584,
        publisher: "Rainbow".to_string(),
        title: "Dogs are nicer than men".to_string(),
        year: 2015,
    }
}

fn book_json(book: &Book) -> Value {
    serde_json::to_value(book).expect("Book is serializable")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Request is valid")
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("Request is valid")
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Request is valid")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("Router is infallible");
    let status = response.status();

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Body is collectable")
        .to_bytes();

    let body = match bytes.is_empty() {
        true => Value::Null,
        false => serde_json::from_slice(&bytes).expect("Body is JSON"),
    };

    (status, body)
}

#[tokio::test]
async fn example_config_is_valid() {
    ServerConfig::from_config_file("config.example.yaml")
        .await
        .expect("Example config is not parsable");
}

#[tokio::test]
async fn list_books_returns_all_books() {
    let (app, store) = test_app().await;
    let book = power_up();
    store.create(&book).await.expect("Create failed");

    let (status, body) = send(app, get("/books")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "books": [book_json(&book)] }));
}

#[tokio::test]
async fn list_books_returns_empty_list_without_books() {
    let (app, _) = test_app().await;

    let (status, body) = send(app, get("/books")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "books": [] }));
}

#[tokio::test]
async fn get_book_returns_the_book() {
    let (app, store) = test_app().await;
    let book = power_up();
    store.create(&book).await.expect("Create failed");

    let (status, body) = send(app, get("/books/0691161518")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": book_json(&book) }));
}

#[tokio::test]
async fn get_unknown_book_returns_404() {
    let (app, _) = test_app().await;

    let (status, body) = send(app, get("/books/069116117")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"]["message"],
        "There is no book with an isbn '069116117"
    );
    assert_eq!(body["error"]["status"], 404);
}

#[tokio::test]
async fn create_book_returns_201_with_the_book() {
    let (app, _) = test_app().await;
    let book = dogs_are_nicer();

    let (status, body) = send(
        app.clone(),
        json_request("POST", "/books", &json!({ "book": book_json(&book) })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "book": book_json(&book) }));

    let (status, body) = send(app, get("/books/0691161517")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": book_json(&book) }));
}

#[tokio::test]
async fn create_book_with_missing_field_returns_400() {
    let (app, _) = test_app().await;
    let mut book = book_json(&dogs_are_nicer());
    book.as_object_mut()
        .expect("Book is an object")
        .remove("year");

    let (status, body) = send(app, json_request("POST", "/books", &json!({ "book": book }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        json!(["instance.book requires property \"year\""])
    );
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn create_book_with_multiple_missing_fields_lists_every_field() {
    let (app, _) = test_app().await;
    let mut book = book_json(&dogs_are_nicer());
    let fields = book.as_object_mut().expect("Book is an object");
    fields.remove("author");
    fields.remove("year");

    let (status, body) = send(app, json_request("POST", "/books", &json!({ "book": book }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);

    let violations = body["error"]["message"]
        .as_array()
        .expect("Message is a list");

    assert_eq!(violations.len(), 2);
    assert!(violations.contains(&json!("instance.book requires property \"author\"")));
    assert!(violations.contains(&json!("instance.book requires property \"year\"")));
}

#[tokio::test]
async fn create_book_with_wrong_type_returns_400() {
    let (app, _) = test_app().await;
    let mut book = book_json(&dogs_are_nicer());
    book["pages"] = json!("584");

    let (status, body) = send(app, json_request("POST", "/books", &json!({ "book": book }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);

    let violations = body["error"]["message"]
        .as_array()
        .expect("Message is a list");

    assert_eq!(violations.len(), 1);
    assert!(violations[0]
        .as_str()
        .expect("Violation is a string")
        .starts_with("instance.book.pages"));
}

#[tokio::test]
async fn create_book_without_envelope_returns_400() {
    let (app, _) = test_app().await;

    let (status, body) = send(app, json_request("POST", "/books", &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        json!(["instance requires property \"book\""])
    );
}

#[tokio::test]
async fn create_book_with_malformed_body_returns_400() {
    let (app, _) = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("Request is valid");

    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_book_with_duplicate_isbn_returns_500() {
    let (app, store) = test_app().await;
    let book = power_up();
    store.create(&book).await.expect("Create failed");

    let (status, body) = send(
        app,
        json_request("POST", "/books", &json!({ "book": book_json(&book) })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["status"], 500);
}

#[tokio::test]
async fn update_book_replaces_every_field() {
    let (app, store) = test_app().await;
    store.create(&power_up()).await.expect("Create failed");

    let updated = Book {
        isbn: "0691161518".to_string(),
        amazon_url: "http://a.co/eobPtX3".to_string(),
        author: "Jones Lee".to_string(),
        language: "italian".to_string(),
        pages: 750,
        publisher: "Rainbow Bridge".to_string(),
        title: "Dogs are nicer than men".to_string(),
        year: 2005,
    };

    let (status, body) = send(
        app.clone(),
        json_request(
            "PUT",
            "/books/0691161518",
            &json!({ "book": book_json(&updated) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": book_json(&updated) }));

    let (status, body) = send(app, get("/books/0691161518")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": book_json(&updated) }));
}

#[tokio::test]
async fn update_unknown_book_returns_404() {
    let (app, _) = test_app().await;

    let (status, body) = send(
        app,
        json_request(
            "PUT",
            "/books/552631654",
            &json!({ "book": book_json(&dogs_are_nicer()) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"]["message"],
        "There is no book with an isbn '552631654"
    );
}

#[tokio::test]
async fn update_book_with_missing_field_returns_400() {
    let (app, store) = test_app().await;
    store.create(&power_up()).await.expect("Create failed");

    let mut book = book_json(&power_up());
    book.as_object_mut()
        .expect("Book is an object")
        .remove("pages");

    let (status, body) = send(
        app,
        json_request("PUT", "/books/0691161518", &json!({ "book": book })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        json!(["instance.book requires property \"pages\""])
    );
}

#[tokio::test]
async fn delete_book_returns_message_and_removes_the_book() {
    let (app, store) = test_app().await;
    store.create(&power_up()).await.expect("Create failed");

    let (status, body) = send(app.clone(), request("DELETE", "/books/0691161518")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let (status, _) = send(app, get("/books/0691161518")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_book_returns_404() {
    let (app, _) = test_app().await;

    let (status, body) = send(app, request("DELETE", "/books/069116117")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"]["message"],
        "There is no book with an isbn '069116117"
    );
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (app, _) = test_app().await;

    let (status, body) = send(app, get("/authors")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Not Found");
}

#[tokio::test]
async fn unsupported_method_returns_405() {
    let (app, _) = test_app().await;

    let (status, body) = send(app, request("POST", "/books/0691161518")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["message"], "Method Not Allowed");
}

#[tokio::test]
async fn store_create_then_find_returns_identical_book() {
    let store = test_store().await;
    let book = power_up();

    let created = store.create(&book).await.expect("Create failed");
    assert_eq!(created, book);

    let found = store
        .find_by_isbn("0691161518")
        .await
        .expect("Find failed");
    assert_eq!(found, Lookup::Found(book));
}

#[tokio::test]
async fn store_find_unknown_isbn_is_not_found() {
    let store = test_store().await;

    let found = store.find_by_isbn("069116117").await.expect("Find failed");

    assert_eq!(found, Lookup::NotFound);
}

#[tokio::test]
async fn store_replace_changes_the_isbn() {
    let store = test_store().await;
    store.create(&power_up()).await.expect("Create failed");

    let replacement = dogs_are_nicer();
    let replaced = store
        .replace("0691161518", &replacement)
        .await
        .expect("Replace failed");

    assert_eq!(replaced, Lookup::Found(replacement.clone()));
    assert_eq!(
        store
            .find_by_isbn("0691161518")
            .await
            .expect("Find failed"),
        Lookup::NotFound
    );
    assert_eq!(
        store
            .find_by_isbn("0691161517")
            .await
            .expect("Find failed"),
        Lookup::Found(replacement)
    );
}

#[tokio::test]
async fn store_replace_unknown_isbn_is_not_found() {
    let store = test_store().await;

    let replaced = store
        .replace("552631654", &dogs_are_nicer())
        .await
        .expect("Replace failed");

    assert_eq!(replaced, Lookup::NotFound);
}

#[tokio::test]
async fn store_delete_then_find_is_not_found() {
    let store = test_store().await;
    store.create(&power_up()).await.expect("Create failed");

    let deleted = store
        .delete_by_isbn("0691161518")
        .await
        .expect("Delete failed");
    assert_eq!(deleted, Lookup::Found(()));

    let found = store
        .find_by_isbn("0691161518")
        .await
        .expect("Find failed");
    assert_eq!(found, Lookup::NotFound);
}

#[tokio::test]
async fn store_delete_unknown_isbn_is_not_found() {
    let store = test_store().await;

    let deleted = store
        .delete_by_isbn("069116117")
        .await
        .expect("Delete failed");

    assert_eq!(deleted, Lookup::NotFound);
}

#[tokio::test]
async fn store_create_duplicate_isbn_is_a_unique_violation() {
    let store = test_store().await;
    let book = power_up();
    store.create(&book).await.expect("Create failed");

    let err = store
        .create(&book)
        .await
        .expect_err("Duplicate create must fail");

    assert!(matches!(err, StoreError::UniqueViolation { isbn } if isbn == "0691161518"));
}
