use serde::{Deserialize, Serialize};

use crate::application::loan::UserLoanHistories;
use crate::domain::{Book, BookCategory, LoanHistory, LoanStatus, User};
use crate::ports::CategoryCount;

// ============================================================================
// Requests
// ============================================================================

/// 利用者登録リクエスト（POST /user）
#[derive(Debug, Serialize, Deserialize)]
pub struct UserCreateRequest {
    pub name: String,
    pub age: Option<u16>,
}

/// 利用者名変更リクエスト（PUT /user）
#[derive(Debug, Serialize, Deserialize)]
pub struct UserUpdateRequest {
    pub id: i64,
    pub name: String,
}

/// 利用者削除のクエリパラメータ（DELETE /user?name=）
#[derive(Debug, Deserialize)]
pub struct DeleteUserQuery {
    pub name: String,
}

/// 書籍登録リクエスト（POST /book）
#[derive(Debug, Serialize, Deserialize)]
pub struct BookRequest {
    pub name: String,
    pub category: BookCategory,
}

/// 貸出リクエスト（POST /book/loan）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookLoanRequest {
    pub user_name: String,
    pub book_name: String,
}

/// 返却リクエスト（PUT /book/return）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookReturnRequest {
    pub user_name: String,
    pub book_name: String,
}

// ============================================================================
// Responses
// ============================================================================

/// 利用者レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub age: Option<u16>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            name: user.name,
            age: user.age,
        }
    }
}

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub name: String,
    pub category: BookCategory,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            name: book.name,
            category: book.category,
        }
    }
}

/// 貸出履歴レスポンス（貸出・返却の結果）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanHistoryResponse {
    pub id: i64,
    pub user_id: i64,
    pub book_name: String,
    pub status: LoanStatus,
    pub loaned_at: chrono::DateTime<chrono::Utc>,
    pub returned_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<LoanHistory> for LoanHistoryResponse {
    fn from(history: LoanHistory) -> Self {
        Self {
            id: history.id.value(),
            user_id: history.user_id.value(),
            book_name: history.book_name,
            status: history.status,
            loaned_at: history.loaned_at,
            returned_at: history.returned_at,
        }
    }
}

/// 利用者ごとの貸出履歴レスポンス（GET /user/loan）
#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoanHistoryResponse {
    /// 利用者名
    pub name: String,
    pub books: Vec<BookHistoryResponse>,
}

/// 貸出履歴の1冊分
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookHistoryResponse {
    /// 書籍名
    pub name: String,
    pub is_return: bool,
}

impl From<UserLoanHistories> for UserLoanHistoryResponse {
    fn from(entry: UserLoanHistories) -> Self {
        Self {
            name: entry.user.name,
            books: entry
                .histories
                .into_iter()
                .map(|history| BookHistoryResponse {
                    is_return: history.is_returned(),
                    name: history.book_name,
                })
                .collect(),
        }
    }
}

/// 分類別蔵書数レスポンス（GET /book/stat）
#[derive(Debug, Serialize, Deserialize)]
pub struct BookStatResponse {
    pub category: BookCategory,
    pub count: i64,
}

impl From<CategoryCount> for BookStatResponse {
    fn from(stat: CategoryCount) -> Self {
        Self {
            category: stat.category,
            count: stat.count,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
