use serde::{Deserialize, Serialize};

use super::UserId;

/// 永続化前の利用者
///
/// 書籍と異なり、利用者名には空白チェックを行わない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub age: Option<u16>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, age: Option<u16>) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }
}

/// 利用者
///
/// 貸出履歴は利用者IDで逆参照される。利用者自身は書籍への参照を持たない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub age: Option<u16>,
}

impl User {
    pub fn from_new(id: UserId, user: NewUser) -> Self {
        Self {
            id,
            name: user.name,
            age: user.age,
        }
    }

    /// 利用者名を変更する（登録後に許される唯一の変更）
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}
