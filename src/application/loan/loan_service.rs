use crate::domain::{self, Book, LoanHistory, LoanStatus, NewBook, commands::*};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{LibraryApplicationError, Result};
use super::unit_of_work::{begin, finish};
use super::user_service::lock_user_by_name;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞いは持たず、各操作関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub store: Arc<dyn LibraryStore>,
}

/// 書籍を登録する
///
/// 書籍名の重複チェックは行わない（同名の書籍は複本として扱う）。
/// 書籍名が空白のみの場合は何も保存せずValidationエラーを返す。
pub async fn register_book(deps: &ServiceDependencies, cmd: RegisterBook) -> Result<Book> {
    let new_book = NewBook::new(cmd.name, cmd.category)?;

    let mut uow = begin(deps).await?;
    let result = uow
        .insert_book(new_book)
        .await
        .map_err(LibraryApplicationError::StoreError);
    let book = finish(uow, result).await?;

    tracing::info!(book_id = book.id.value(), name = %book.name, "Book registered");
    Ok(book)
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 同じ書籍名の貸出中の履歴が存在しないこと
/// - 利用者が存在すること
///
/// # 一貫性保証
///
/// 貸出中チェックと履歴の作成は、書籍名単位のロックを取った同一の作業単位内で行う。
/// 同じ書籍への並行した貸出は直列化され、貸出中の履歴は常に高々1件となる。
pub async fn loan_book(deps: &ServiceDependencies, cmd: LoanBook) -> Result<LoanHistory> {
    let mut uow = begin(deps).await?;
    let result = loan_book_in(uow.as_mut(), &cmd).await;
    let history = finish(uow, result).await?;

    tracing::info!(
        loan_history_id = history.id.value(),
        user_name = %cmd.user_name,
        book_name = %history.book_name,
        "Book loaned"
    );
    Ok(history)
}

async fn loan_book_in(uow: &mut dyn UnitOfWork, cmd: &LoanBook) -> Result<LoanHistory> {
    // 1. 書籍の存在確認
    let book = uow
        .find_book_by_name(&cmd.book_name)
        .await
        .map_err(LibraryApplicationError::StoreError)?
        .ok_or(LibraryApplicationError::BookNotFound)?;

    // 2. 書籍名単位のロックを取得してから貸出中チェック
    uow.lock_book_name(&book.name)
        .await
        .map_err(LibraryApplicationError::StoreError)?;

    let active_loan = uow
        .find_loan_history(&book.name, LoanStatus::Loaned)
        .await
        .map_err(LibraryApplicationError::StoreError)?;

    if active_loan.is_some() {
        tracing::warn!(book_name = %book.name, "Loan rejected: book is already loaned");
        return Err(LibraryApplicationError::BookAlreadyLoaned);
    }

    // 3. 利用者の存在確認（共有ロックで削除との競合を防ぐ）
    let user = uow
        .find_user_by_name_shared(&cmd.user_name)
        .await
        .map_err(LibraryApplicationError::StoreError)?
        .ok_or(LibraryApplicationError::UserNotFound)?;

    // 4. ドメイン層の純粋関数で履歴を組み立てて保存
    let new_history = domain::loan_history::loan_book(&user, &book, cmd.loaned_at);

    uow.insert_loan_history(new_history)
        .await
        .map_err(LibraryApplicationError::StoreError)
}

/// 書籍を返却する
///
/// 利用者自身の貸出履歴の中から、書籍名が一致する貸出中の履歴を返却済みにする。
/// 別の利用者の貸出は、書籍名が同じでも返却できない。
/// 同じ貸出への並行した返却は利用者単位のロックで直列化され、2件目はNotFoundになる。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<LoanHistory> {
    let mut uow = begin(deps).await?;
    let result = return_book_in(uow.as_mut(), &cmd).await;
    let history = finish(uow, result).await?;

    tracing::info!(
        loan_history_id = history.id.value(),
        user_name = %cmd.user_name,
        book_name = %history.book_name,
        "Book returned"
    );
    Ok(history)
}

async fn return_book_in(uow: &mut dyn UnitOfWork, cmd: &ReturnBook) -> Result<LoanHistory> {
    // 同じ利用者の返却を直列化し、貸出中の履歴は必ず最新の状態で読む
    let user = lock_user_by_name(uow, &cmd.user_name).await?;

    let mut histories = uow
        .find_loan_histories_by_user(user.id)
        .await
        .map_err(LibraryApplicationError::StoreError)?;

    let returned = domain::loan_history::return_book(
        &user,
        &mut histories,
        &cmd.book_name,
        cmd.returned_at,
    )?
    .clone();

    uow.update_loan_history(&returned)
        .await
        .map_err(LibraryApplicationError::StoreError)?;

    Ok(returned)
}

/// 貸出中の書籍数を取得する
///
/// 全件を読み込んで数えるのではなく、ストア側の集計クエリ1回で求める。
pub async fn count_active_loans(deps: &ServiceDependencies) -> Result<i64> {
    let mut uow = begin(deps).await?;
    let result = uow
        .count_loan_histories_by_status(LoanStatus::Loaned)
        .await
        .map_err(LibraryApplicationError::StoreError);
    finish(uow, result).await
}

/// 分類ごとの蔵書数を取得する
///
/// GROUP BYの集計クエリ1回で求める。結果の順序は不定。
pub async fn get_book_statistics(deps: &ServiceDependencies) -> Result<Vec<CategoryCount>> {
    let mut uow = begin(deps).await?;
    let result = uow
        .count_books_by_category()
        .await
        .map_err(LibraryApplicationError::StoreError);
    finish(uow, result).await
}
