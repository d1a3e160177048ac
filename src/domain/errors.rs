/// 書籍生成のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// 書籍名が空、または空白のみ
    BlankName,
}

impl std::fmt::Display for BookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookError::BlankName => write!(f, "Book name must not be blank"),
        }
    }
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnBookError {
    /// 利用者自身の履歴に、該当書籍の貸出中レコードが存在しない
    NoActiveLoan,
}

impl std::fmt::Display for ReturnBookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnBookError::NoActiveLoan => write!(f, "No active loan for this book"),
        }
    }
}
