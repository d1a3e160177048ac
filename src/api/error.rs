use crate::application::loan::LibraryApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LibraryApplicationError);

impl From<LibraryApplicationError> for ApiError {
    fn from(err: LibraryApplicationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 400 Bad Request - 入力値の検証エラー
            LibraryApplicationError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }

            // 404 Not Found - 参照先が存在しない
            LibraryApplicationError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            LibraryApplicationError::BookNotFound => (
                StatusCode::NOT_FOUND,
                "BOOK_NOT_FOUND",
                "Book not found".to_string(),
            ),
            LibraryApplicationError::LoanHistoryNotFound => (
                StatusCode::NOT_FOUND,
                "LOAN_NOT_FOUND",
                "No active loan for this user and book".to_string(),
            ),

            // 409 Conflict - 現在の状態と矛盾する操作
            LibraryApplicationError::BookAlreadyLoaned => (
                StatusCode::CONFLICT,
                "BOOK_ALREADY_LOANED",
                "Book is already loaned".to_string(),
            ),
            LibraryApplicationError::UserHasActiveLoans => (
                StatusCode::CONFLICT,
                "USER_HAS_ACTIVE_LOANS",
                "User still has loaned books".to_string(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LibraryApplicationError::StoreError(ref e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
