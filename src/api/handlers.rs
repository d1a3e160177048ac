use crate::application::loan::{
    ServiceDependencies, count_active_loans as execute_count_active_loans,
    delete_user as execute_delete_user, get_book_statistics as execute_get_book_statistics,
    get_user_loan_histories as execute_get_user_loan_histories, list_users as execute_list_users,
    loan_book as execute_loan_book, register_book as execute_register_book,
    register_user as execute_register_user, rename_user as execute_rename_user,
    return_book as execute_return_book,
};
use crate::domain::{UserId, commands::*};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        BookLoanRequest, BookRequest, BookResponse, BookReturnRequest, BookStatResponse,
        DeleteUserQuery, LoanHistoryResponse, UserCreateRequest, UserLoanHistoryResponse,
        UserResponse, UserUpdateRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// User handlers
// ============================================================================

/// POST /user - 利用者を登録
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserCreateRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let cmd = RegisterUser {
        name: req.name,
        age: req.age,
    };

    let user = execute_register_user(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /user - 全利用者を取得
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = execute_list_users(&state.service_deps).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// PUT /user - 利用者名を変更
pub async fn update_user_name(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserUpdateRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let cmd = RenameUser {
        user_id: UserId::from_i64(req.id),
        name: req.name,
    };

    let user = execute_rename_user(&state.service_deps, cmd).await?;

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /user?name= - 利用者を削除
///
/// 貸出中の書籍を持つ利用者は削除できない（409）。
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeleteUserQuery>,
) -> Result<StatusCode, ApiError> {
    let cmd = DeleteUser { name: query.name };

    execute_delete_user(&state.service_deps, cmd).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /user/loan - 全利用者の貸出履歴を取得
///
/// 貸出履歴のない利用者も空の`books`で含まれる。
pub async fn get_user_loan_histories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserLoanHistoryResponse>>, ApiError> {
    let entries = execute_get_user_loan_histories(&state.service_deps).await?;

    Ok(Json(
        entries
            .into_iter()
            .map(UserLoanHistoryResponse::from)
            .collect(),
    ))
}

// ============================================================================
// Book handlers
// ============================================================================

/// POST /book - 書籍を登録
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let cmd = RegisterBook {
        name: req.name,
        category: req.category,
    };

    let book = execute_register_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// POST /book/loan - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 書籍が存在すること
/// - 書籍が貸出中でないこと
/// - 利用者が存在すること
pub async fn loan_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookLoanRequest>,
) -> Result<(StatusCode, Json<LoanHistoryResponse>), ApiError> {
    let cmd = LoanBook {
        user_name: req.user_name,
        book_name: req.book_name,
        loaned_at: chrono::Utc::now(),
    };

    let history = execute_loan_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanHistoryResponse::from(history))))
}

/// PUT /book/return - 書籍を返却
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookReturnRequest>,
) -> Result<Json<LoanHistoryResponse>, ApiError> {
    let cmd = ReturnBook {
        user_name: req.user_name,
        book_name: req.book_name,
        returned_at: chrono::Utc::now(),
    };

    let history = execute_return_book(&state.service_deps, cmd).await?;

    Ok(Json(LoanHistoryResponse::from(history)))
}

/// GET /book/loan - 貸出中の書籍数を取得
pub async fn count_loaned_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<i64>, ApiError> {
    let count = execute_count_active_loans(&state.service_deps).await?;

    Ok(Json(count))
}

/// GET /book/stat - 分類ごとの蔵書数を取得
pub async fn get_book_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookStatResponse>>, ApiError> {
    let stats = execute_get_book_statistics(&state.service_deps).await?;

    Ok(Json(stats.into_iter().map(BookStatResponse::from).collect()))
}
