use serde::{Deserialize, Serialize};

use super::{BookCategory, BookError, BookId};

/// 永続化前の書籍
///
/// 不変条件：書籍名は空白のみであってはならない。
/// コンストラクタ経由でしか生成できないため、検証を通過した値だけがストアに渡る。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBook {
    name: String,
    category: BookCategory,
}

impl NewBook {
    pub fn new(name: impl Into<String>, category: BookCategory) -> Result<Self, BookError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BookError::BlankName);
        }
        Ok(Self { name, category })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> BookCategory {
        self.category
    }
}

/// 書籍
///
/// 登録後は変更されない。同名の書籍は複本として別の行で表現する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub category: BookCategory,
}

impl Book {
    /// 採番済みIDと検証済みの値から書籍を組み立てる
    pub fn from_new(id: BookId, book: NewBook) -> Self {
        Self {
            id,
            name: book.name,
            category: book.category,
        }
    }
}
