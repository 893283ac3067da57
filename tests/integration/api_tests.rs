//! API integration tests

use bookshelf_server::{config::AppConfig, create_router, AppState};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Serve a fresh app on an ephemeral port and return its base URL
async fn spawn_app() -> String {
    let app = create_router(AppState::new(AppConfig::default()));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    format!("http://{}", addr)
}

async fn create_book(client: &Client, base_url: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(format!("{}/books", base_url))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");

    let status = response.status();
    let body: Value = response.json().await.expect("Failed to parse response");
    (status, body)
}

async fn get_json(client: &Client, url: String) -> (StatusCode, Value) {
    let response = client.get(url).send().await.expect("Failed to send request");
    let status = response.status();
    let body: Value = response.json().await.expect("Failed to parse response");
    (status, body)
}

async fn book_count(client: &Client, base_url: &str) -> usize {
    let (_, body) = get_json(client, format!("{}/books", base_url)).await;
    body["data"]["books"].as_array().expect("books array").len()
}

fn full_payload() -> Value {
    json!({
        "name": "Buku A",
        "year": 2010,
        "author": "John Doe",
        "summary": "Lorem ipsum dolor sit amet",
        "publisher": "Dicoding Indonesia",
        "pageCount": 100,
        "readPage": 25,
        "reading": false
    })
}

#[tokio::test]
async fn test_health_check() {
    let base_url = spawn_app().await;
    let (status, body) = get_json(&Client::new(), format!("{}/health", base_url)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["books"], 0);
}

#[tokio::test]
async fn test_create_book_without_name() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let mut payload = full_payload();
    payload.as_object_mut().unwrap().remove("name");
    let (status, body) = create_book(&client, &base_url, payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Gagal menambahkan buku. Mohon isi nama buku");
    assert_eq!(book_count(&client, &base_url).await, 0);
}

#[tokio::test]
async fn test_create_book_read_page_over_page_count() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let mut payload = full_payload();
    payload["readPage"] = json!(101);
    let (status, body) = create_book(&client, &base_url, payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(
        body["message"],
        "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
    );
    assert_eq!(book_count(&client, &base_url).await, 0);
}

#[tokio::test]
async fn test_create_book_with_malformed_body() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base_url))
        .header("content-type", "application/json")
        .body(r#"{"name": "Buku A", "pageCount": 100"#)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Gagal memproses permintaan"));
}

#[tokio::test]
async fn test_create_book_keeps_unchecked_values() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let cases = [
        (json!({"name": "A", "pageCount": "100", "readPage": 10}), json!("100"), false),
        (json!({"name": "A", "pageCount": 100.0, "readPage": 100}), json!(100.0), true),
        (json!({"name": "A", "pageCount": 1e3}), json!(1000.0), false),
    ];

    for (payload, stored_page_count, finished) in cases {
        let (status, body) = create_book(&client, &base_url, payload).await;
        assert_eq!(status, StatusCode::CREATED);
        let book_id = body["data"]["bookId"].as_str().expect("No book ID");

        let (_, body) = get_json(&client, format!("{}/books/{}", base_url, book_id)).await;
        assert_eq!(body["data"]["book"]["pageCount"], stored_page_count);
        assert_eq!(body["data"]["book"]["finished"], finished);
    }

    let (_, body) = get_json(&client, format!("{}/health", base_url)).await;
    assert_eq!(body["books"], 3);
}

#[tokio::test]
async fn test_create_finished_book() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let (status, body) = create_book(
        &client,
        &base_url,
        json!({"name": "Dicoding", "pageCount": 100, "readPage": 100}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil ditambahkan");
    let book_id = body["data"]["bookId"].as_str().expect("No book ID");
    assert_eq!(book_id.len(), 16);

    let (status, body) = get_json(&client, format!("{}/books/{}", base_url, book_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["book"]["finished"], true);
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let payload = full_payload();
    let (_, body) = create_book(&client, &base_url, payload.clone()).await;
    let book_id = body["data"]["bookId"].as_str().expect("No book ID").to_string();

    let (status, body) = get_json(&client, format!("{}/books/{}", base_url, book_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let book = &body["data"]["book"];
    for (key, value) in payload.as_object().unwrap() {
        assert_eq!(&book[key], value, "field {}", key);
    }
    assert_eq!(book["id"], book_id);
    assert_eq!(book["finished"], false);
    assert_eq!(book["insertedAt"], book["updatedAt"]);
}

#[tokio::test]
async fn test_client_supplied_finished_is_ignored() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let mut payload = full_payload();
    payload["finished"] = json!(true);
    let (_, body) = create_book(&client, &base_url, payload).await;
    let book_id = body["data"]["bookId"].as_str().expect("No book ID");

    let (_, body) = get_json(&client, format!("{}/books/{}", base_url, book_id)).await;
    assert_eq!(body["data"]["book"]["finished"], false);
}

#[tokio::test]
async fn test_list_books_shape() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let (status, body) = get_json(&client, format!("{}/books", base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "data": {"books": []}}));

    create_book(&client, &base_url, full_payload()).await;
    let (status, body) = get_json(&client, format!("{}/books", base_url)).await;
    assert_eq!(status, StatusCode::OK);

    let books = body["data"]["books"].as_array().expect("books array");
    assert_eq!(books.len(), 1);
    let keys: Vec<_> = books[0].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.len(), 3);
    assert_eq!(books[0]["name"], "Buku A");
    assert_eq!(books[0]["publisher"], "Dicoding Indonesia");
    assert!(books[0]["id"].is_string());
}

#[tokio::test]
async fn test_list_books_filters() {
    let base_url = spawn_app().await;
    let client = Client::new();

    for (name, reading, read_page) in [
        ("Belajar Dicoding", true, 100),
        ("dicoding lanjutan", false, 20),
        ("Rust in Action", true, 20),
        ("Clean Code", false, 100),
    ] {
        let (status, _) = create_book(
            &client,
            &base_url,
            json!({
                "name": name,
                "publisher": "Penerbit",
                "pageCount": 100,
                "readPage": read_page,
                "reading": reading
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let names = |body: &Value| -> Vec<String> {
        body["data"]["books"]
            .as_array()
            .expect("books array")
            .iter()
            .map(|b| b["name"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, body) = get_json(&client, format!("{}/books?name=DiCoD", base_url)).await;
    assert_eq!(names(&body), vec!["Belajar Dicoding", "dicoding lanjutan"]);

    let (_, body) = get_json(&client, format!("{}/books?reading=1", base_url)).await;
    assert_eq!(names(&body), vec!["Belajar Dicoding", "Rust in Action"]);

    let (_, body) = get_json(&client, format!("{}/books?reading=0", base_url)).await;
    assert_eq!(names(&body), vec!["dicoding lanjutan", "Clean Code"]);

    let (_, body) = get_json(&client, format!("{}/books?finished=1", base_url)).await;
    assert_eq!(names(&body), vec!["Belajar Dicoding", "Clean Code"]);

    let (_, body) = get_json(&client, format!("{}/books?finished=0", base_url)).await;
    assert_eq!(names(&body), vec!["dicoding lanjutan", "Rust in Action"]);

    // name wins over the other filters
    let (_, body) = get_json(
        &client,
        format!("{}/books?name=rust&reading=0&finished=1", base_url),
    )
    .await;
    assert_eq!(names(&body), vec!["Rust in Action"]);

    let (status, body) = get_json(&client, format!("{}/books?finished=yes", base_url)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_list_books_with_bad_query_string() {
    let base_url = spawn_app().await;
    let (status, body) =
        get_json(&Client::new(), format!("{}/books?name=a&name=b", base_url)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Gagal memproses permintaan"));
}

#[tokio::test]
async fn test_get_unknown_book() {
    let base_url = spawn_app().await;
    let (status, body) = get_json(&Client::new(), format!("{}/books/xxxxx", base_url)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku tidak ditemukan");
}

#[tokio::test]
async fn test_update_book() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let (_, body) = create_book(&client, &base_url, full_payload()).await;
    let book_id = body["data"]["bookId"].as_str().expect("No book ID").to_string();
    let (_, before) = get_json(&client, format!("{}/books/{}", base_url, book_id)).await;

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let response = client
        .put(format!("{}/books/{}", base_url, book_id))
        .json(&json!({
            "name": "Buku A Revisi",
            "year": 2011,
            "author": "Jane Doe",
            "summary": "Maecenas nisl est",
            "publisher": "Dicoding",
            "pageCount": 200,
            "readPage": 200,
            "reading": true
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body,
        json!({"status": "success", "message": "Buku berhasil diperbarui"})
    );

    let (_, after) = get_json(&client, format!("{}/books/{}", base_url, book_id)).await;
    let before = &before["data"]["book"];
    let after = &after["data"]["book"];
    assert_eq!(after["id"], before["id"]);
    assert_eq!(after["insertedAt"], before["insertedAt"]);
    assert_ne!(after["updatedAt"], before["updatedAt"]);
    assert_eq!(after["name"], "Buku A Revisi");
    assert_eq!(after["finished"], true);
    assert_eq!(after["reading"], true);
}

#[tokio::test]
async fn test_update_book_failures() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let (_, body) = create_book(&client, &base_url, full_payload()).await;
    let book_id = body["data"]["bookId"].as_str().expect("No book ID").to_string();

    let cases = [
        (
            format!("{}/books/{}", base_url, book_id),
            json!({"pageCount": 100, "readPage": 10}),
            StatusCode::BAD_REQUEST,
            "Gagal memperbarui buku. Mohon isi nama buku",
        ),
        (
            format!("{}/books/{}", base_url, book_id),
            json!({"name": "Buku A", "pageCount": 100, "readPage": 150}),
            StatusCode::BAD_REQUEST,
            "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount",
        ),
        (
            format!("{}/books/xxxxx", base_url),
            json!({"name": "Buku A", "pageCount": 100, "readPage": 10}),
            StatusCode::NOT_FOUND,
            "Buku tidak ditemukan",
        ),
    ];

    for (url, payload, expected_status, expected_message) in cases {
        let response = client
            .put(url)
            .json(&payload)
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), expected_status);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], expected_message);
    }

    let (_, body) = get_json(&client, format!("{}/books/{}", base_url, book_id)).await;
    assert_eq!(body["data"]["book"]["name"], "Buku A");
}

#[tokio::test]
async fn test_delete_book() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let (_, body) = create_book(&client, &base_url, full_payload()).await;
    let book_id = body["data"]["bookId"].as_str().expect("No book ID").to_string();
    create_book(&client, &base_url, full_payload()).await;
    assert_eq!(book_count(&client, &base_url).await, 2);

    let response = client
        .delete(format!("{}/books/{}", base_url, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"status": "success", "message": "Buku berhasil dihapus"}));
    assert_eq!(book_count(&client, &base_url).await, 1);

    let (status, _) = get_json(&client, format!("{}/books/{}", base_url, book_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = client
        .delete(format!("{}/books/{}", base_url, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku gagal dihapus. Id tidak ditemukan");
    assert_eq!(book_count(&client, &base_url).await, 1);
}
