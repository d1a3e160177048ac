use crate::ports::UnitOfWork;

use super::errors::{LibraryApplicationError, Result};
use super::loan_service::ServiceDependencies;

/// 作業単位を開始する
pub(super) async fn begin(deps: &ServiceDependencies) -> Result<Box<dyn UnitOfWork>> {
    deps.store
        .begin()
        .await
        .map_err(LibraryApplicationError::StoreError)
}

/// 操作結果に応じて作業単位を確定またはロールバックする
///
/// 成功時はcommitし、commitの失敗はStoreErrorとして返す。
/// 失敗時はrollbackし、元のエラーを返す。
pub(super) async fn finish<T>(uow: Box<dyn UnitOfWork>, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            uow.commit()
                .await
                .map_err(LibraryApplicationError::StoreError)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::error!("Rollback failed after {}: {}", err, rollback_err);
            }
            Err(err)
        }
    }
}
