use crate::model::{id::UserId, role::Role};

pub mod event;

#[derive(Debug, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

// 管理者向け一覧の絞り込み条件。search は名前・メールアドレスの部分一致
#[derive(Debug)]
pub struct UserListOptions {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}
