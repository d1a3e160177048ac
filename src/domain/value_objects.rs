use serde::{Deserialize, Serialize};

/// 利用者ID - 永続化時にストアが採番するサロゲートキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 書籍ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 貸出履歴ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanHistoryId(i64);

impl LoanHistoryId {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 書籍の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookCategory {
    Computer,
    Economy,
    Society,
    Language,
    Science,
}

impl BookCategory {
    pub const ALL: [BookCategory; 5] = [
        BookCategory::Computer,
        BookCategory::Economy,
        BookCategory::Society,
        BookCategory::Language,
        BookCategory::Science,
    ];

    /// 永続化用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            BookCategory::Computer => "COMPUTER",
            BookCategory::Economy => "ECONOMY",
            BookCategory::Society => "SOCIETY",
            BookCategory::Language => "LANGUAGE",
            BookCategory::Science => "SCIENCE",
        }
    }
}

impl std::str::FromStr for BookCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("Invalid book category: {}", s))
    }
}

/// 貸出状態
///
/// 遷移は LOANED → RETURNED の一方向のみ。
/// 返却済みの書籍を再度貸し出す場合は新しい貸出履歴を作成する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// 貸出中
    Loaned,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Loaned => "LOANED",
            LoanStatus::Returned => "RETURNED",
        }
    }

    pub fn is_returned(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOANED" => Ok(LoanStatus::Loaned),
            "RETURNED" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}
