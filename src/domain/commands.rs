use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookCategory, UserId};

/// コマンド：書籍を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBook {
    pub name: String,
    pub category: BookCategory,
}

/// コマンド：利用者を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub age: Option<u16>,
}

/// コマンド：利用者名を変更する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameUser {
    pub user_id: UserId,
    pub name: String,
}

/// コマンド：利用者を削除する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUser {
    pub name: String,
}

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanBook {
    pub user_name: String,
    pub book_name: String,
    pub loaned_at: DateTime<Utc>,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub user_name: String,
    pub book_name: String,
    pub returned_at: DateTime<Utc>,
}
