use async_trait::async_trait;

use super::{BookRepository, LoanHistoryRepository, UserRepository};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 作業単位ポート
///
/// 1つのサービス操作の読み書きをまとめる原子的なスコープ。
/// commitされずにdropされた作業単位はロールバックされる。
#[async_trait]
pub trait UnitOfWork: UserRepository + BookRepository + LoanHistoryRepository + Send {
    /// 作業単位内の変更を確定する
    async fn commit(self: Box<Self>) -> Result<()>;

    /// 作業単位内の変更を破棄する
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// ストアポート
///
/// アプリケーション層は作業単位を通してのみ永続化層にアクセスする。
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// 新しい作業単位を開始する
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}
