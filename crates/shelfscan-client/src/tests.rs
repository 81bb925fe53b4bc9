//! Tests for the API clients against a local mock server.

use mockito::Matcher;
use serde_json::json;
use shelfscan_core::config::ApiConfig;
use shelfscan_core::token::testing::student_token;
use shelfscan_core::{Hours, ReturnDays};

use super::books::BooksClient;
use super::client::ApiClient;
use super::error::ApiError;
use super::types::{BookInfo, BorrowRequest};

fn config_for(url: &str) -> ApiConfig {
    ApiConfig {
        base_url: url.to_string(),
        books_url: url.to_string(),
        timeout_secs: 5,
    }
}

fn hours(n: i64) -> Hours {
    Hours::new(n).unwrap()
}

// =============================================================================
// Client construction tests
// =============================================================================

#[test]
fn empty_base_url_returns_config_error() {
    let config = ApiConfig {
        base_url: "  ".into(),
        ..ApiConfig::default()
    };
    let err = ApiClient::new(&config).unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
}

#[test]
fn empty_books_url_returns_config_error() {
    let config = ApiConfig {
        books_url: String::new(),
        ..ApiConfig::default()
    };
    assert!(matches!(BooksClient::new(&config), Err(ApiError::Config(_))));
}

#[test]
fn trailing_slash_stripped_from_base_url() {
    let client = ApiClient::new(&config_for("http://127.0.0.1:8000/")).unwrap();
    assert_eq!(client.url("/attendance"), "http://127.0.0.1:8000/attendance");
}

#[test]
fn volumes_url_constructed_correctly() {
    let client = BooksClient::new(&ApiConfig::default()).unwrap();
    assert_eq!(
        client.volumes_url("9780306406157"),
        "https://www.googleapis.com/books/v1/volumes?q=isbn:9780306406157"
    );
}

// =============================================================================
// Attendance
// =============================================================================

#[tokio::test]
async fn attendance_posts_token_and_hours() {
    let mut server = mockito::Server::new_async().await;
    let token = student_token("21-00001", "Juan Dela Cruz");
    let mock = server
        .mock("POST", "/attendance")
        .match_body(Matcher::Json(json!({"token": &token, "hours": 2})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Attendance recorded successfully for Juan Dela Cruz."}"#)
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let resp = client.post_attendance(&token, hours(2)).await.unwrap();

    assert_eq!(
        resp.message.as_deref(),
        Some("Attendance recorded successfully for Juan Dela Cruz.")
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn attendance_429_is_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/attendance")
        .with_status(429)
        .with_body(r#"{"detail": "Too many requests"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client
        .post_attendance(&student_token("1", "A"), hours(1))
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    mock.assert_async().await;
}

#[tokio::test]
async fn attendance_conflict_carries_detail() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/attendance")
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Attendance already recorded for today"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client
        .post_attendance(&student_token("1", "A"), hours(1))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(err.detail(), Some("Attendance already recorded for today"));
}

#[tokio::test]
async fn attendance_with_empty_token_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/attendance")
        .expect(0)
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client.post_attendance("", hours(1)).await.unwrap_err();

    assert!(matches!(err, ApiError::MissingField("token")));
    mock.assert_async().await;
}

// =============================================================================
// Borrow / return
// =============================================================================

#[tokio::test]
async fn borrow_posts_full_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/borrow")
        .match_body(Matcher::Json(json!({
            "token": "tok",
            "isbn": "9780441013593",
            "bookname": "Dune",
            "bookauthor": "Frank Herbert",
            "returndays": 3
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Book borrowed."}"#)
        .create_async()
        .await;

    let book = BookInfo {
        title: "Dune".into(),
        authors: vec!["Frank Herbert".into()],
        isbn: "9780441013593".into(),
        thumbnail: None,
    };
    let request = BorrowRequest::new("tok", &book, ReturnDays::new(3).unwrap());
    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let resp = client.borrow(&request).await.unwrap();

    assert_eq!(resp.message.as_deref(), Some("Book borrowed."));
    mock.assert_async().await;
}

#[tokio::test]
async fn borrow_validation_error_is_bad_request() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/borrow")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": [{"loc": ["body"], "msg": "You already borrowed a book."}]}"#)
        .create_async()
        .await;

    let book = BookInfo {
        title: "Dune".into(),
        authors: Vec::new(),
        isbn: "9780441013593".into(),
        thumbnail: None,
    };
    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client
        .borrow(&BorrowRequest::new("tok", &book, ReturnDays::default()))
        .await
        .unwrap_err();

    assert!(err.is_bad_request());
    assert_eq!(err.detail(), Some("You already borrowed a book."));
}

#[tokio::test]
async fn borrowed_reports_current_book() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/borrowed")
        .match_body(Matcher::Json(json!({"token": "tok"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"borrowed": true, "books": {"bookname": "Dune", "bookauthor": "Frank Herbert",
                "isbn": "9780441013593", "thumbnail": null, "borrowed_date": "2026-10-16T09:00:00"}}"#,
        )
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let resp = client.borrowed("tok").await.unwrap();

    assert!(resp.borrowed);
    assert_eq!(resp.books.unwrap().isbn, "9780441013593");
}

#[tokio::test]
async fn return_book_posts_token_and_isbn() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/returnbook")
        .match_body(Matcher::Json(json!({"token": "tok", "isbn": "9780441013593"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Ana returned the book successfully."}"#)
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let resp = client.return_book("tok", "9780441013593").await.unwrap();

    assert_eq!(resp.message.as_deref(), Some("Ana returned the book successfully."));
    mock.assert_async().await;
}

#[tokio::test]
async fn return_book_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/returnbook")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "You have no record of borrowing this book."}"#)
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client.return_book("tok", "1").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.detail(), Some("You have no record of borrowing this book."));
}

// =============================================================================
// Admin reports
// =============================================================================

#[tokio::test]
async fn admin_reports_unwrap_envelopes() {
    let mut server = mockito::Server::new_async().await;
    let _top = server
        .mock("GET", "/admin/top-attendance")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"students": [{"name": "Ana", "total_hours": 12}, {"name": "Ben", "total_hours": 3}]}"#)
        .create_async()
        .await;
    let _borrows = server
        .mock("GET", "/admin/most-borrowed-books")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"students": [{"name": "Ben", "books_borrowed": 4}]}"#)
        .create_async()
        .await;
    let _today = server
        .mock("GET", "/admin/today-attendance")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"attendance": [{"name": "Ana", "hours": 2, "time": "2026-10-16 09:00:00"}]}"#)
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();

    let top = client.top_attendance().await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].name, "Ana");
    assert_eq!(top[0].total_hours, 12);

    let borrows = client.most_borrowed().await.unwrap();
    assert_eq!(borrows[0].books_borrowed, 4);

    let today = client.today_attendance().await.unwrap();
    assert_eq!(today[0].time, "2026-10-16 09:00:00");
}

#[tokio::test]
async fn server_error_without_json_has_no_detail() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/admin/top-attendance")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client.top_attendance().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.detail(), None);
}

// =============================================================================
// Book lookup
// =============================================================================

#[tokio::test]
async fn lookup_converts_isbn10_before_querying() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/volumes")
        .match_query(Matcher::UrlEncoded("q".into(), "isbn:9780306406157".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"items": [{"volumeInfo": {"title": "Pride and Prejudice",
                "authors": ["Jane Austen"],
                "industryIdentifiers": [{"type": "ISBN_10", "identifier": "0306406152"}]}}]}"#,
        )
        .create_async()
        .await;

    let client = BooksClient::new(&config_for(&server.url())).unwrap();
    let book = client.lookup("0-306-40615-2").await.unwrap().unwrap();

    assert_eq!(book.title, "Pride and Prejudice");
    assert_eq!(book.isbn, "0306406152");
    assert_eq!(book.author_line(), "Jane Austen");
    mock.assert_async().await;
}

#[tokio::test]
async fn lookup_without_results_is_none() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/volumes")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"kind": "books#volumes", "totalItems": 0}"#)
        .create_async()
        .await;

    let client = BooksClient::new(&config_for(&server.url())).unwrap();
    assert!(client.lookup("9780306406157").await.unwrap().is_none());
}

#[tokio::test]
async fn lookup_rejects_invalid_isbn_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/volumes")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = BooksClient::new(&config_for(&server.url())).unwrap();
    assert!(matches!(client.lookup("123").await, Err(ApiError::InvalidIsbn)));
    mock.assert_async().await;
}
