use crate::domain::{BookError, ReturnBookError};
use thiserror::Error;

/// 図書貸出アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LibraryApplicationError {
    /// 必須項目が空
    #[error("Validation error: {0}")]
    Validation(String),

    /// 利用者が存在しない
    #[error("User not found")]
    UserNotFound,

    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 利用者の履歴に、該当書籍の貸出中レコードがない
    #[error("Active loan not found")]
    LoanHistoryNotFound,

    /// 書籍が既に貸出中
    #[error("Book is already loaned")]
    BookAlreadyLoaned,

    /// 貸出中の書籍を持つ利用者は削除できない
    #[error("User still has active loans")]
    UserHasActiveLoans,

    /// ストアのエラー
    #[error("Store error")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// エラーの分類
///
/// API層はこの分類でHTTPステータスを決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl LibraryApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LibraryApplicationError::Validation(_) => ErrorKind::Validation,
            LibraryApplicationError::UserNotFound
            | LibraryApplicationError::BookNotFound
            | LibraryApplicationError::LoanHistoryNotFound => ErrorKind::NotFound,
            LibraryApplicationError::BookAlreadyLoaned
            | LibraryApplicationError::UserHasActiveLoans => ErrorKind::Conflict,
            LibraryApplicationError::StoreError(_) => ErrorKind::Internal,
        }
    }
}

impl From<BookError> for LibraryApplicationError {
    fn from(err: BookError) -> Self {
        LibraryApplicationError::Validation(err.to_string())
    }
}

impl From<ReturnBookError> for LibraryApplicationError {
    fn from(err: ReturnBookError) -> Self {
        match err {
            ReturnBookError::NoActiveLoan => LibraryApplicationError::LoanHistoryNotFound,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LibraryApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            LibraryApplicationError::from(BookError::BlankName).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LibraryApplicationError::UserNotFound.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LibraryApplicationError::from(ReturnBookError::NoActiveLoan).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LibraryApplicationError::BookAlreadyLoaned.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            LibraryApplicationError::UserHasActiveLoans.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            LibraryApplicationError::StoreError("boom".into()).kind(),
            ErrorKind::Internal
        );
    }
}
