use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{facility::event::DeleteFacility, id::FacilityId};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::facility::{
        CreateFacilityRequest, FacilitiesResponse, FacilityListQuery, FacilityResponse,
        UpdateFacilityRequest, UpdateFacilityRequestWithId,
    },
};

pub async fn register_facility(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateFacilityRequest>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }
    req.validate()?;

    registry
        .facility_repository()
        .create(req.into())
        .await
        .map(|_| StatusCode::CREATED)
}

pub async fn show_facility_list(
    user: AuthorizedUser,
    Query(query): Query<FacilityListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<FacilitiesResponse>> {
    // 無効化済みの施設は管理者が明示的に要求した場合のみ含める
    let only_active = !(query.include_inactive && user.is_admin());

    registry
        .facility_repository()
        .find_all(only_active)
        .await
        .map(FacilitiesResponse::from)
        .map(Json)
}

pub async fn show_facility(
    _user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<FacilityResponse>> {
    registry
        .facility_repository()
        .find_by_id(facility_id)
        .await?
        .map(FacilityResponse::from)
        .map(Json)
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("施設（{}）が見つかりませんでした。", facility_id))
        })
}

pub async fn update_facility(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateFacilityRequest>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }
    req.validate()?;

    registry
        .facility_repository()
        .update(UpdateFacilityRequestWithId::new(facility_id, req).into())
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn delete_facility(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }

    registry
        .facility_repository()
        .delete(DeleteFacility { facility_id })
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
