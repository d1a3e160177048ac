use crate::domain::{NewUser, User, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 利用者リポジトリポート
///
/// 利用者名は一意ではないため、名前検索は最小IDの利用者を返す。
#[async_trait]
pub trait UserRepository: Send {
    /// 利用者を保存し、採番されたIDを含む利用者を返す
    async fn insert_user(&mut self, user: NewUser) -> Result<User>;

    async fn find_user_by_id(&mut self, user_id: UserId) -> Result<Option<User>>;

    /// 名前で利用者を検索する
    ///
    /// 同名の利用者が複数いる場合は最小IDのものを返す。
    async fn find_user_by_name(&mut self, name: &str) -> Result<Option<User>>;

    /// 名前で利用者を検索し、作業単位の終了まで共有ロックを保持する
    ///
    /// 貸出の作成中に、同じ利用者の削除が割り込まないようにする。
    async fn find_user_by_name_shared(&mut self, name: &str) -> Result<Option<User>>;

    /// 利用者行の排他ロックを作業単位の終了まで保持する
    ///
    /// 削除・返却の前に取得する。利用者が既に存在しなければ`false`を返す。
    async fn lock_user(&mut self, user_id: UserId) -> Result<bool>;

    /// 全利用者をID順に返す
    async fn find_all_users(&mut self) -> Result<Vec<User>>;

    /// 利用者の現在状態を保存する（名前変更用）
    async fn update_user(&mut self, user: &User) -> Result<()>;

    /// 利用者を削除する
    ///
    /// 利用者が所有する貸出履歴も合わせて削除される。
    async fn delete_user(&mut self, user_id: UserId) -> Result<()>;

    async fn delete_all_users(&mut self) -> Result<()>;
}
