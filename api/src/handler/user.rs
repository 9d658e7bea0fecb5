use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{id::UserId, user::event::DeleteUser};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::user::{
        CreateUserRequest, UpdateUserActiveRequest, UpdateUserActiveRequestWithUserId,
        UpdateUserPasswordRequest, UpdateUserPasswordRequestWithUserId, UpdateUserRoleRequest,
        UpdateUserRoleRequestWithUserId, UserListQuery, UserResponse, UsersResponse,
    },
};

pub async fn register_user(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }
    req.validate()?;

    registry
        .user_repository()
        .create(req.into())
        .await
        .map(UserResponse::from)
        .map(Json)
}

pub async fn show_current_user(user: AuthorizedUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.user))
}

pub async fn show_user_list(
    user: AuthorizedUser,
    Query(query): Query<UserListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UsersResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }

    let items = registry
        .user_repository()
        .find_all(query.into())
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(UsersResponse { items }))
}

pub async fn update_user_password(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserPasswordRequest>,
) -> AppResult<StatusCode> {
    req.validate()?;

    registry
        .user_repository()
        .update_password(UpdateUserPasswordRequestWithUserId::new(user.id(), req).into())
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn update_user_role(
    user: AuthorizedUser,
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserRoleRequest>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }

    registry
        .user_repository()
        .update_role(UpdateUserRoleRequestWithUserId::new(user_id, req).into())
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn update_user_active(
    user: AuthorizedUser,
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserActiveRequest>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }

    registry
        .user_repository()
        .update_active(UpdateUserActiveRequestWithUserId::new(user_id, req).into())
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    user: AuthorizedUser,
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }

    registry
        .user_repository()
        .delete(DeleteUser { user_id })
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
