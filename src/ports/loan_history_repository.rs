use crate::domain::{LoanHistory, LoanStatus, NewLoanHistory, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出履歴リポジトリポート
#[async_trait]
pub trait LoanHistoryRepository: Send {
    async fn insert_loan_history(&mut self, history: NewLoanHistory) -> Result<LoanHistory>;

    /// 書籍名と状態で貸出履歴を1件検索する
    ///
    /// 「この本は貸出中か」の判定に使われる。
    async fn find_loan_history(
        &mut self,
        book_name: &str,
        status: LoanStatus,
    ) -> Result<Option<LoanHistory>>;

    /// 利用者が所有する貸出履歴をID順に返す
    async fn find_loan_histories_by_user(&mut self, user_id: UserId) -> Result<Vec<LoanHistory>>;

    /// 全貸出履歴をID順に返す
    async fn find_all_loan_histories(&mut self) -> Result<Vec<LoanHistory>>;

    /// 貸出履歴の状態（status, returned_at）を保存する
    async fn update_loan_history(&mut self, history: &LoanHistory) -> Result<()>;

    /// 指定状態の貸出履歴の件数を1回の集計クエリで取得する
    async fn count_loan_histories_by_status(&mut self, status: LoanStatus) -> Result<i64>;

    /// 書籍名単位の排他ロックを取得する
    ///
    /// ロックは作業単位（トランザクション）の終了まで保持される。
    /// 貸出中チェックと貸出履歴の作成の間に、同じ書籍への貸出が割り込まないことを保証する。
    async fn lock_book_name(&mut self, book_name: &str) -> Result<()>;

    async fn delete_all_loan_histories(&mut self) -> Result<()>;
}
