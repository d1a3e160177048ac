use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use library_lending::api::types::*;
use library_lending::domain::{BookCategory, LoanStatus};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// JSONボディ付きのリクエストを送信
async fn send_json(app: &axum::Router, method: &str, uri: &str, body: Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// ボディなしのリクエストを送信
async fn send(app: &axum::Router, method: &str, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_health_check() {
    let app = common::in_memory_app();

    let response = send(&app, "GET", "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_e2e_full_loan_flow() {
    // Arrange
    let app = common::in_memory_app();

    // Step 1: 書籍登録（POST /book）
    let response = send_json(
        &app,
        "POST",
        "/book",
        json!({ "name": "Alice in Wonderland", "category": "COMPUTER" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let book: BookResponse = read_json(response).await;
    assert_eq!(book.name, "Alice in Wonderland");
    assert_eq!(book.category, BookCategory::Computer);

    // Step 2: 利用者登録（POST /user）、年齢は省略
    let response = send_json(&app, "POST", "/user", json!({ "name": "Choi" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: UserResponse = read_json(response).await;
    assert_eq!(user.name, "Choi");
    assert_eq!(user.age, None);

    // Step 3: 貸出（POST /book/loan）
    let response = send_json(
        &app,
        "POST",
        "/book/loan",
        json!({ "userName": "Choi", "bookName": "Alice in Wonderland" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let loaned: LoanHistoryResponse = read_json(response).await;
    assert_eq!(loaned.user_id, user.id);
    assert_eq!(loaned.status, LoanStatus::Loaned);

    // Step 4: 貸出中の冊数（GET /book/loan）
    let response = send(&app, "GET", "/book/loan").await;
    assert_eq!(response.status(), StatusCode::OK);
    let count: i64 = read_json(response).await;
    assert_eq!(count, 1);

    // Step 5: 同じ書籍の二重貸出は409
    send_json(&app, "POST", "/user", json!({ "name": "Anyone", "age": 30 })).await;
    let response = send_json(
        &app,
        "POST",
        "/book/loan",
        json!({ "userName": "Anyone", "bookName": "Alice in Wonderland" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "BOOK_ALREADY_LOANED");

    // Step 6: 返却（PUT /book/return）
    let response = send_json(
        &app,
        "PUT",
        "/book/return",
        json!({ "userName": "Choi", "bookName": "Alice in Wonderland" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let returned: LoanHistoryResponse = read_json(response).await;
    assert_eq!(returned.id, loaned.id);
    assert_eq!(returned.status, LoanStatus::Returned);
    assert!(returned.returned_at.is_some());

    // Step 7: 貸出履歴（GET /user/loan）
    let response = send(&app, "GET", "/user/loan").await;
    assert_eq!(response.status(), StatusCode::OK);
    let histories: Vec<UserLoanHistoryResponse> = read_json(response).await;
    assert_eq!(histories.len(), 2);
    assert_eq!(histories[0].name, "Choi");
    assert_eq!(histories[0].books.len(), 1);
    assert_eq!(histories[0].books[0].name, "Alice in Wonderland");
    assert!(histories[0].books[0].is_return);
    assert_eq!(histories[1].name, "Anyone");
    assert!(histories[1].books.is_empty());

    // Step 8: 貸出中の冊数は0
    let count: i64 = read_json(send(&app, "GET", "/book/loan").await).await;
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_e2e_user_lifecycle() {
    // Arrange
    let app = common::in_memory_app();
    let created: UserResponse =
        read_json(send_json(&app, "POST", "/user", json!({ "name": "A", "age": 20 })).await).await;
    send_json(&app, "POST", "/user", json!({ "name": "B" })).await;

    // 一覧（GET /user）
    let response = send(&app, "GET", "/user").await;
    assert_eq!(response.status(), StatusCode::OK);
    let users: Vec<UserResponse> = read_json(response).await;
    let mut ages: Vec<Option<u16>> = users.iter().map(|user| user.age).collect();
    ages.sort();
    assert_eq!(ages, vec![None, Some(20)]);

    // 名前変更（PUT /user）
    let response = send_json(
        &app,
        "PUT",
        "/user",
        json!({ "id": created.id, "name": "A2" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let renamed: UserResponse = read_json(response).await;
    assert_eq!(renamed.id, created.id);
    assert_eq!(renamed.name, "A2");
    assert_eq!(renamed.age, Some(20));

    // 削除（DELETE /user?name=）
    let response = send(&app, "DELETE", "/user?name=A2").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // 二度目の削除は404
    let response = send(&app, "DELETE", "/user?name=A2").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "USER_NOT_FOUND");

    let users: Vec<UserResponse> = read_json(send(&app, "GET", "/user").await).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "B");
}

#[tokio::test]
async fn test_e2e_book_statistics() {
    // Arrange
    let app = common::in_memory_app();
    for (name, category) in [
        ("B1", "SCIENCE"),
        ("B2", "SCIENCE"),
        ("B3", "ECONOMY"),
    ] {
        send_json(
            &app,
            "POST",
            "/book",
            json!({ "name": name, "category": category }),
        )
        .await;
    }

    // Act
    let response = send(&app, "GET", "/book/stat").await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let mut stats: Vec<BookStatResponse> = read_json(response).await;
    stats.sort_by_key(|stat| stat.category);
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].category, BookCategory::Economy);
    assert_eq!(stats[0].count, 1);
    assert_eq!(stats[1].category, BookCategory::Science);
    assert_eq!(stats[1].count, 2);
}

// ============================================================================
// E2Eテスト: 異常系
// ============================================================================

#[tokio::test]
async fn test_e2e_blank_book_name_returns_400() {
    let app = common::in_memory_app();

    let response = send_json(
        &app,
        "POST",
        "/book",
        json!({ "name": "   ", "category": "LANGUAGE" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "VALIDATION_ERROR");

    let stats: Vec<BookStatResponse> = read_json(send(&app, "GET", "/book/stat").await).await;
    assert!(stats.is_empty());
}

#[tokio::test]
async fn test_e2e_unknown_category_is_rejected() {
    let app = common::in_memory_app();

    let response = send_json(
        &app,
        "POST",
        "/book",
        json!({ "name": "Poetry", "category": "POETRY" }),
    )
    .await;

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_e2e_loan_unknown_book_returns_404() {
    let app = common::in_memory_app();
    send_json(&app, "POST", "/user", json!({ "name": "U" })).await;

    let response = send_json(
        &app,
        "POST",
        "/book/loan",
        json!({ "userName": "U", "bookName": "Missing" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "BOOK_NOT_FOUND");
}

#[tokio::test]
async fn test_e2e_return_without_loan_returns_404() {
    let app = common::in_memory_app();
    send_json(&app, "POST", "/user", json!({ "name": "U" })).await;
    send_json(
        &app,
        "POST",
        "/book",
        json!({ "name": "Dune", "category": "SCIENCE" }),
    )
    .await;

    let response = send_json(
        &app,
        "PUT",
        "/book/return",
        json!({ "userName": "U", "bookName": "Dune" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "LOAN_NOT_FOUND");
}

#[tokio::test]
async fn test_e2e_delete_user_with_active_loan_returns_409() {
    let app = common::in_memory_app();
    send_json(&app, "POST", "/user", json!({ "name": "Borrower" })).await;
    send_json(
        &app,
        "POST",
        "/book",
        json!({ "name": "Dune", "category": "SCIENCE" }),
    )
    .await;
    send_json(
        &app,
        "POST",
        "/book/loan",
        json!({ "userName": "Borrower", "bookName": "Dune" }),
    )
    .await;

    let response = send(&app, "DELETE", "/user?name=Borrower").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "USER_HAS_ACTIVE_LOANS");
}

#[tokio::test]
async fn test_e2e_out_of_range_age_is_rejected() {
    let app = common::in_memory_app();

    let response = send_json(
        &app,
        "POST",
        "/user",
        json!({ "name": "Old", "age": 3_000_000_000u64 }),
    )
    .await;

    assert!(response.status().is_client_error());
    let users: Vec<UserResponse> = read_json(send(&app, "GET", "/user").await).await;
    assert!(users.is_empty());
}
