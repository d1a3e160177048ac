use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, count_loaned_books, create_book, create_user, delete_user, get_book_statistics,
    get_user_loan_histories, list_users, loan_book, return_book, update_user_name,
};

/// Creates the API router with all library endpoints
///
/// User endpoints:
/// - POST /user - Register a user
/// - GET /user - List users
/// - PUT /user - Rename a user
/// - DELETE /user?name= - Delete a user
/// - GET /user/loan - Loan histories of every user
///
/// Book endpoints:
/// - POST /book - Register a book
/// - POST /book/loan - Loan a book
/// - GET /book/loan - Count loaned books
/// - PUT /book/return - Return a book
/// - GET /book/stat - Book count per category
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route(
            "/user",
            post(create_user)
                .get(list_users)
                .put(update_user_name)
                .delete(delete_user),
        )
        .route("/user/loan", get(get_user_loan_histories))
        .route("/book", post(create_book))
        .route("/book/loan", post(loan_book).get(count_loaned_books))
        .route("/book/return", put(return_book))
        .route("/book/stat", get(get_book_statistics))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
