//! API integration tests, driving the router in process over the in-memory
//! catalog and session stores

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use locallibrary_server::{
    api,
    config::AppConfig,
    repository::MemoryRepository,
    services::{sessions::MemorySessionStore, Services},
    AppState,
};

struct TestResponse {
    status: StatusCode,
    set_cookie: Option<String>,
    body: Value,
}

fn app() -> Router {
    let config = AppConfig::default();
    let services = Services::new(
        Arc::new(MemoryRepository::new()),
        Arc::new(MemorySessionStore::new(config.session.ttl_seconds)),
        config.catalog.clone(),
    );
    api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };

    TestResponse {
        status,
        set_cookie,
        body,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn with_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let response = send(app, with_json(Method::POST, uri, body)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

async fn create_book(app: &Router, title: &str, body: Value) -> i64 {
    let mut payload = json!({ "title": title, "isbn": "9780000000001" });
    if let (Some(target), Some(extra)) = (payload.as_object_mut(), body.as_object()) {
        target.extend(extra.clone());
    }
    create(app, "/admin/books", payload).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let response = send(&app, get("/health")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");

    let response = send(&app, get("/ready")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ready");
}

#[tokio::test]
async fn test_root_redirects_to_catalog() {
    let response = app()
        .oneshot(get("/"))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/catalog/");
}

#[tokio::test]
async fn test_index_counts_visits_per_session() {
    let app = app();

    let first = send(&app, get("/catalog/")).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["num_visits"], 0);
    assert_eq!(first.body["num_books"], 0);

    let set_cookie = first.set_cookie.expect("session cookie should be set");
    assert!(set_cookie.starts_with("sessionid="));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let second = send(
        &app,
        Request::get("/catalog/")
            .header(header::COOKIE, cookie.as_str())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(second.body["num_visits"], 1);
    assert!(second.set_cookie.is_none());

    // A different client starts its own count
    let other = send(&app, get("/catalog/")).await;
    assert_eq!(other.body["num_visits"], 0);
}

#[tokio::test]
async fn test_index_reports_catalog_counts() {
    let app = app();
    create(&app, "/admin/genres", json!({ "name": "Science Fiction" })).await;
    let book_id = create_book(&app, "Project Hail Mary", json!({})).await;
    create_book(&app, "Dune", json!({})).await;
    create(
        &app,
        "/admin/bookinstances",
        json!({ "book_id": book_id, "imprint": "Ballantine", "status": "available" }),
    )
    .await;
    create(
        &app,
        "/admin/bookinstances",
        json!({ "book_id": book_id, "imprint": "Ballantine" }),
    )
    .await;

    let response = send(&app, get("/catalog/")).await;
    assert_eq!(response.body["num_books"], 2);
    assert_eq!(response.body["num_instances"], 2);
    assert_eq!(response.body["num_instances_available"], 1);
    assert_eq!(response.body["num_genres"], 1);
    assert_eq!(response.body["num_authors"], 0);
    assert_eq!(response.body["num_books_part_word"], 1);
}

#[tokio::test]
async fn test_missing_book_is_404() {
    let app = app();

    let response = send(&app, get("/catalog/book/999")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["code"], 3);
    assert_eq!(response.body["error"], "NoSuchData");

    let response = send(&app, get("/catalog/author/999")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_list_pagination() {
    let app = app();
    for title in ["Alpha", "Bravo", "Charlie", "Delta", "Echo"] {
        create_book(&app, title, json!({})).await;
    }

    let response = send(&app, get("/catalog/books")).await;
    assert_eq!(response.status, StatusCode::OK);
    let titles: Vec<&str> = response.body["book_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Echo", "Delta"]);
    assert_eq!(response.body["is_paginated"], true);
    assert_eq!(response.body["page_obj"]["num_pages"], 3);
    assert_eq!(response.body["page_obj"]["count"], 5);

    let response = send(&app, get("/catalog/books?page=3")).await;
    assert_eq!(response.body["book_list"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["book_list"][0]["title"], "Alpha");
    assert_eq!(response.body["page_obj"]["has_next"], false);

    let response = send(&app, get("/catalog/books?page=4")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["book_list"].as_array().unwrap().is_empty());
    assert_eq!(response.body["page_obj"]["has_next"], false);

    let response = send(&app, get("/catalog/books?page=abc")).await;
    assert_eq!(response.body["page_obj"]["number"], 1);
    assert_eq!(response.body["book_list"][0]["title"], "Echo");
}

#[tokio::test]
async fn test_author_list_and_detail() {
    let app = app();
    let herbert = create(
        &app,
        "/admin/authors",
        json!({ "first_name": "Frank", "last_name": "Herbert", "date_of_birth": "1920-10-08" }),
    )
    .await;
    create(
        &app,
        "/admin/authors",
        json!({ "first_name": "Isaac", "last_name": "Asimov" }),
    )
    .await;
    let herbert_id = herbert["id"].as_i64().unwrap();
    create_book(&app, "Dune", json!({ "author_ids": [herbert_id] })).await;

    let response = send(&app, get("/catalog/authors")).await;
    assert_eq!(response.body["author_list"][0]["name"], "Frank Herbert");
    assert_eq!(response.body["author_list"][1]["name"], "Isaac Asimov");
    assert_eq!(response.body["is_paginated"], false);

    let response = send(&app, get(&format!("/catalog/author/{}", herbert_id))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["author"]["date_of_birth"], "1920-10-08");
    assert_eq!(response.body["author"]["books"][0]["title"], "Dune");
}

#[tokio::test]
async fn test_book_detail_shows_links_and_copies() {
    let app = app();
    let author = create(
        &app,
        "/admin/authors",
        json!({ "first_name": "Ursula", "last_name": "Le Guin" }),
    )
    .await;
    let language = create(&app, "/admin/languages", json!({})).await;
    assert_eq!(language["name"], "English");

    let mut genre_ids = Vec::new();
    for name in ["Science Fiction", "Fantasy", "Philosophy", "Politics"] {
        genre_ids.push(create(&app, "/admin/genres", json!({ "name": name })).await["id"].clone());
    }

    let book_id = create_book(
        &app,
        "The Dispossessed",
        json!({
            "summary": "Shevek, a physicist, travels to Urras.",
            "author_ids": [author["id"]],
            "genre_ids": genre_ids,
            "language_id": language["id"],
        }),
    )
    .await;
    create(
        &app,
        "/admin/bookinstances",
        json!({ "book_id": book_id, "imprint": "Harper & Row, 1974", "due_back": "2001-01-01", "status": "on_loan" }),
    )
    .await;

    let response = send(&app, get(&format!("/catalog/book/{}", book_id))).await;
    assert_eq!(response.status, StatusCode::OK);
    let book = &response.body["book"];
    assert_eq!(book["display_author"], "Ursula Le Guin");
    assert_eq!(book["display_genre"], "Science Fiction, Fantasy, Philosophy");
    assert_eq!(book["genres"].as_array().unwrap().len(), 4);
    assert_eq!(book["language"]["name"], "English");
    assert_eq!(book["instances"][0]["status"], "on_loan");
    assert_eq!(book["instances"][0]["status_label"], "On loan");
    assert_eq!(book["instances"][0]["is_overdue"], true);

    let response = send(&app, get(&format!("/admin/books/{}/instances", book_id))).await;
    assert_eq!(response.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deleting_language_keeps_book() {
    let app = app();
    let language = create(&app, "/admin/languages", json!({ "name": "French" })).await;
    let book_id = create_book(&app, "Vingt mille lieues", json!({ "language_id": language["id"] })).await;

    let response = send(&app, delete(&format!("/admin/languages/{}", language["id"]))).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = send(&app, get(&format!("/admin/books/{}", book_id))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["language"].is_null());
}

#[tokio::test]
async fn test_deleting_book_keeps_copies() {
    let app = app();
    let book_id = create_book(&app, "Solaris", json!({})).await;
    let copy = create(
        &app,
        "/admin/bookinstances",
        json!({ "book_id": book_id, "imprint": "Walker, 1970" }),
    )
    .await;
    assert_eq!(copy["status"], "maintenance");

    let response = send(&app, delete(&format!("/admin/books/{}", book_id))).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = send(&app, get(&format!("/admin/bookinstances/{}", copy["id"].as_str().unwrap()))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["book"].is_null());
}

#[tokio::test]
async fn test_invalid_payloads_are_rejected() {
    let app = app();

    let response = send(
        &app,
        with_json(Method::POST, "/admin/books", json!({ "title": "Short", "isbn": "123" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], 4);

    let response = send(
        &app,
        with_json(
            Method::POST,
            "/admin/books",
            json!({ "title": "Orphan", "isbn": "9780000000001", "author_ids": [42] }),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = send(&app, get("/admin/books")).await;
    assert_eq!(response.body["total"], 0);
}

#[tokio::test]
async fn test_copy_filters_and_update() {
    let app = app();
    let book_id = create_book(&app, "Neuromancer", json!({})).await;
    let copy = create(
        &app,
        "/admin/bookinstances",
        json!({ "book_id": book_id, "imprint": "Ace, 1984", "due_back": "2030-05-01", "status": "on_loan" }),
    )
    .await;
    create(
        &app,
        "/admin/bookinstances",
        json!({ "book_id": book_id, "imprint": "Ace, 1984", "status": "available" }),
    )
    .await;

    let response = send(&app, get("/admin/bookinstances?status=available")).await;
    let copies = response.body.as_array().unwrap();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0]["status"], "available");

    let response = send(&app, get("/admin/bookinstances")).await;
    assert_eq!(response.body[0]["due_back"], "2030-05-01");
    assert!(response.body[1]["due_back"].is_null());

    let uri = format!("/admin/bookinstances/{}", copy["id"].as_str().unwrap());
    let response = send(
        &app,
        with_json(Method::PUT, &uri, json!({ "due_back": null, "status": "available" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["due_back"].is_null());
    assert_eq!(response.body["imprint"], "Ace, 1984");

    let response = send(&app, get("/catalog/")).await;
    assert_eq!(response.body["num_instances_available"], 2);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = send(&app(), get("/api-docs/openapi.json")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/catalog/books"].is_object());
}
