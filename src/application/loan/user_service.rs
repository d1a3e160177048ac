use crate::domain::{LoanHistory, NewUser, User, UserId, commands::*};
use crate::ports::*;
use std::collections::HashMap;

use super::errors::{LibraryApplicationError, Result};
use super::loan_service::ServiceDependencies;
use super::unit_of_work::{begin, finish};

/// 利用者ごとの貸出履歴
///
/// 貸出履歴が1件もない利用者も、空の履歴で含まれる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLoanHistories {
    pub user: User,
    pub histories: Vec<LoanHistory>,
}

/// 利用者を登録する
///
/// 利用者名の重複チェックは行わない。
pub async fn register_user(deps: &ServiceDependencies, cmd: RegisterUser) -> Result<User> {
    let mut uow = begin(deps).await?;
    let result = uow
        .insert_user(NewUser::new(cmd.name, cmd.age))
        .await
        .map_err(LibraryApplicationError::StoreError);
    let user = finish(uow, result).await?;

    tracing::info!(user_id = user.id.value(), name = %user.name, "User registered");
    Ok(user)
}

/// 全利用者を取得する
pub async fn list_users(deps: &ServiceDependencies) -> Result<Vec<User>> {
    let mut uow = begin(deps).await?;
    let result = uow
        .find_all_users()
        .await
        .map_err(LibraryApplicationError::StoreError);
    finish(uow, result).await
}

/// 利用者名を変更する
pub async fn rename_user(deps: &ServiceDependencies, cmd: RenameUser) -> Result<User> {
    let mut uow = begin(deps).await?;
    let result = rename_user_in(uow.as_mut(), cmd).await;
    let user = finish(uow, result).await?;

    tracing::info!(user_id = user.id.value(), name = %user.name, "User renamed");
    Ok(user)
}

async fn rename_user_in(uow: &mut dyn UnitOfWork, cmd: RenameUser) -> Result<User> {
    let mut user = find_user(uow, cmd.user_id).await?;
    user.rename(cmd.name);

    uow.update_user(&user)
        .await
        .map_err(LibraryApplicationError::StoreError)?;

    Ok(user)
}

async fn find_user(uow: &mut dyn UnitOfWork, user_id: UserId) -> Result<User> {
    uow.find_user_by_id(user_id)
        .await
        .map_err(LibraryApplicationError::StoreError)?
        .ok_or(LibraryApplicationError::UserNotFound)
}

/// 名前で利用者を検索し、作業単位の終了まで排他ロックを保持する
///
/// ロック待ちの間に削除された場合はUserNotFoundを返す。
pub(super) async fn lock_user_by_name(uow: &mut dyn UnitOfWork, name: &str) -> Result<User> {
    let user = uow
        .find_user_by_name(name)
        .await
        .map_err(LibraryApplicationError::StoreError)?
        .ok_or(LibraryApplicationError::UserNotFound)?;

    let locked = uow
        .lock_user(user.id)
        .await
        .map_err(LibraryApplicationError::StoreError)?;

    if !locked {
        return Err(LibraryApplicationError::UserNotFound);
    }
    Ok(user)
}

/// 利用者を削除する
///
/// ビジネスルール：
/// - 利用者が存在すること
/// - 貸出中の書籍がないこと（返却済みの履歴は利用者と一緒に削除される）
pub async fn delete_user(deps: &ServiceDependencies, cmd: DeleteUser) -> Result<()> {
    let mut uow = begin(deps).await?;
    let result = delete_user_in(uow.as_mut(), &cmd).await;
    let user = finish(uow, result).await?;

    tracing::info!(user_id = user.id.value(), name = %user.name, "User deleted");
    Ok(())
}

async fn delete_user_in(uow: &mut dyn UnitOfWork, cmd: &DeleteUser) -> Result<User> {
    // 排他ロックの取得後に貸出中チェックを行う。並行した貸出は確定済みになってから見える
    let user = lock_user_by_name(uow, &cmd.name).await?;

    let histories = uow
        .find_loan_histories_by_user(user.id)
        .await
        .map_err(LibraryApplicationError::StoreError)?;

    if histories.iter().any(|history| !history.is_returned()) {
        tracing::warn!(user_id = user.id.value(), "Delete rejected: user has active loans");
        return Err(LibraryApplicationError::UserHasActiveLoans);
    }

    uow.delete_user(user.id)
        .await
        .map_err(LibraryApplicationError::StoreError)?;

    Ok(user)
}

/// 全利用者の貸出履歴を取得する
///
/// 利用者と貸出履歴をそれぞれ1回ずつ読み込み、メモリ上で利用者ごとにまとめる。
/// 結果は利用者ID順で、各利用者はちょうど1回ずつ現れる。
pub async fn get_user_loan_histories(deps: &ServiceDependencies) -> Result<Vec<UserLoanHistories>> {
    let mut uow = begin(deps).await?;
    let result = get_user_loan_histories_in(uow.as_mut()).await;
    finish(uow, result).await
}

async fn get_user_loan_histories_in(uow: &mut dyn UnitOfWork) -> Result<Vec<UserLoanHistories>> {
    let users = uow
        .find_all_users()
        .await
        .map_err(LibraryApplicationError::StoreError)?;

    let histories = uow
        .find_all_loan_histories()
        .await
        .map_err(LibraryApplicationError::StoreError)?;

    let mut by_user: HashMap<UserId, Vec<LoanHistory>> = HashMap::new();
    for history in histories {
        by_user.entry(history.user_id).or_default().push(history);
    }

    Ok(users
        .into_iter()
        .map(|user| {
            let histories = by_user.remove(&user.id).unwrap_or_default();
            UserLoanHistories { user, histories }
        })
        .collect())
}
