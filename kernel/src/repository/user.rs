use crate::model::{
    id::UserId,
    user::{
        event::{CreateUser, DeleteUser, UpdateUserActive, UpdateUserPassword, UpdateUserRole},
        User, UserListOptions,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, event: CreateUser) -> AppResult<User>;
    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>>;
    // ユーザー一覧を条件付きで取得する。管理画面の一覧用
    async fn find_all(&self, options: UserListOptions) -> AppResult<Vec<User>>;
    async fn update_password(&self, event: UpdateUserPassword) -> AppResult<()>;
    // ロールを変更する。最後の稼働中管理者の降格は拒否される
    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()>;
    // 稼働フラグを変更する。最後の稼働中管理者の無効化は拒否される
    async fn update_active(&self, event: UpdateUserActive) -> AppResult<()>;
    // ユーザーを削除する。最後の稼働中管理者の削除は拒否される。
    // 削除はカスケードで予約を消すため、稼働中予約ぶんの残枠を先に復元する
    async fn delete(&self, event: DeleteUser) -> AppResult<()>;
}
