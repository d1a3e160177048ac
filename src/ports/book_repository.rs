use crate::domain::{Book, BookCategory, NewBook};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 分類ごとの蔵書数（集計結果）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: BookCategory,
    pub count: i64,
}

/// 書籍リポジトリポート
#[async_trait]
pub trait BookRepository: Send {
    async fn insert_book(&mut self, book: NewBook) -> Result<Book>;

    /// 名前で書籍を検索する
    ///
    /// 複本がある場合は最小IDのものを返す。
    async fn find_book_by_name(&mut self, name: &str) -> Result<Option<Book>>;

    async fn find_all_books(&mut self) -> Result<Vec<Book>>;

    async fn delete_all_books(&mut self) -> Result<()>;

    /// 分類ごとの蔵書数を1回の集計クエリで取得する
    ///
    /// 蔵書が0冊の分類は結果に含まれない。順序は不定。
    async fn count_books_by_category(&mut self) -> Result<Vec<CategoryCount>>;
}
