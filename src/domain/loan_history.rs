use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, LoanHistoryId, LoanStatus, ReturnBookError, User, UserId};

/// 永続化前の貸出履歴
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoanHistory {
    pub user_id: UserId,
    pub book_name: String,
    pub status: LoanStatus,
    pub loaned_at: DateTime<Utc>,
}

/// 貸出履歴 - 利用者と書籍名の結合エンティティ
///
/// 書籍は外部キーではなく書籍名の文字列で保持する（非正規化）。
/// そのため「この本は貸出中か」の判定は書籍名の完全一致で行われ、
/// 同名の書籍行は貸出判定の上では区別されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanHistory {
    pub id: LoanHistoryId,
    pub user_id: UserId,
    pub book_name: String,
    pub status: LoanStatus,
    pub loaned_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl LoanHistory {
    pub fn from_new(id: LoanHistoryId, history: NewLoanHistory) -> Self {
        Self {
            id,
            user_id: history.user_id,
            book_name: history.book_name,
            status: history.status,
            loaned_at: history.loaned_at,
            returned_at: None,
        }
    }

    pub fn is_returned(&self) -> bool {
        self.status.is_returned()
    }

    /// 返却済みにする
    ///
    /// 現在の状態に関わらず RETURNED へ遷移させる。二度呼んでもエラーにはならず、
    /// 最初の返却日時が保持される。
    pub fn mark_returned(&mut self, returned_at: DateTime<Utc>) {
        self.status = LoanStatus::Returned;
        self.returned_at.get_or_insert(returned_at);
    }
}

/// 純粋関数：書籍を貸し出す
///
/// 貸出中の重複チェックはアプリケーション層がロック下で行う。
/// ここでは LOANED 状態の新しい履歴を組み立てるだけ。
pub fn loan_book(user: &User, book: &Book, loaned_at: DateTime<Utc>) -> NewLoanHistory {
    NewLoanHistory {
        user_id: user.id,
        book_name: book.name.clone(),
        status: LoanStatus::Loaned,
        loaned_at,
    }
}

/// 純粋関数：書籍を返却する
///
/// 利用者自身が所有する履歴の中から、書籍名が一致する貸出中の履歴を探して返却済みにする。
/// 他の利用者の履歴は、同名の書籍であっても対象にならない。
pub fn return_book<'a>(
    user: &User,
    histories: &'a mut [LoanHistory],
    book_name: &str,
    returned_at: DateTime<Utc>,
) -> Result<&'a LoanHistory, ReturnBookError> {
    let history = histories
        .iter_mut()
        .find(|h| h.user_id == user.id && h.book_name == book_name && !h.is_returned())
        .ok_or(ReturnBookError::NoActiveLoan)?;

    history.mark_returned(returned_at);
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookCategory, BookId, NewBook, NewUser};
    use chrono::Duration;

    fn user(id: i64, name: &str) -> User {
        User::from_new(UserId::from_i64(id), NewUser::new(name, None))
    }

    fn book(name: &str) -> Book {
        Book::from_new(
            BookId::from_i64(1),
            NewBook::new(name, BookCategory::Computer).unwrap(),
        )
    }

    fn history(id: i64, user_id: i64, book_name: &str, status: LoanStatus) -> LoanHistory {
        LoanHistory {
            id: LoanHistoryId::from_i64(id),
            user_id: UserId::from_i64(user_id),
            book_name: book_name.to_string(),
            status,
            loaned_at: Utc::now(),
            returned_at: None,
        }
    }

    #[test]
    fn test_loan_book_creates_loaned_history() {
        let choi = user(1, "Choi");
        let alice = book("Alice in Wonderland");
        let now = Utc::now();

        let new_history = loan_book(&choi, &alice, now);

        assert_eq!(new_history.user_id, choi.id);
        assert_eq!(new_history.book_name, "Alice in Wonderland");
        assert_eq!(new_history.status, LoanStatus::Loaned);
        assert_eq!(new_history.loaned_at, now);
    }

    #[test]
    fn test_from_new_starts_without_returned_at() {
        let new_history = loan_book(&user(1, "A"), &book("B"), Utc::now());
        let history = LoanHistory::from_new(LoanHistoryId::from_i64(3), new_history);

        assert!(!history.is_returned());
        assert_eq!(history.returned_at, None);
    }

    #[test]
    fn test_mark_returned_is_idempotent() {
        let mut history = history(1, 1, "B", LoanStatus::Loaned);
        let first = Utc::now();
        let second = first + Duration::days(1);

        history.mark_returned(first);
        history.mark_returned(second);

        assert!(history.is_returned());
        assert_eq!(history.status, LoanStatus::Returned);
        assert_eq!(history.returned_at, Some(first));
    }

    #[test]
    fn test_return_book_marks_matching_active_history() {
        let choi = user(1, "Choi");
        let mut histories = vec![
            history(1, 1, "Book 1", LoanStatus::Loaned),
            history(2, 1, "Book 2", LoanStatus::Loaned),
        ];

        let returned = return_book(&choi, &mut histories, "Book 2", Utc::now()).unwrap();
        assert_eq!(returned.id.value(), 2);

        assert!(!histories[0].is_returned());
        assert!(histories[1].is_returned());
    }

    #[test]
    fn test_return_book_skips_already_returned_history() {
        let choi = user(1, "Choi");
        let mut histories = vec![
            history(1, 1, "Book", LoanStatus::Returned),
            history(2, 1, "Book", LoanStatus::Loaned),
        ];

        let returned = return_book(&choi, &mut histories, "Book", Utc::now()).unwrap();
        assert_eq!(returned.id.value(), 2);
    }

    #[test]
    fn test_return_book_fails_without_active_loan() {
        let choi = user(1, "Choi");
        let mut histories = vec![history(1, 1, "Book", LoanStatus::Returned)];

        let result = return_book(&choi, &mut histories, "Book", Utc::now());
        assert_eq!(result.unwrap_err(), ReturnBookError::NoActiveLoan);
    }

    #[test]
    fn test_return_book_ignores_other_users_histories() {
        let choi = user(1, "Choi");
        let mut histories = vec![history(1, 2, "Book", LoanStatus::Loaned)];

        let result = return_book(&choi, &mut histories, "Book", Utc::now());
        assert_eq!(result.unwrap_err(), ReturnBookError::NoActiveLoan);
        assert!(!histories[0].is_returned());
    }
}
