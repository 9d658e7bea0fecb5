use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::{FacilityId, SlotId},
    slot::event::DeleteSlot,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::slot::{CreateSlotRequest, CreateSlotRequestWithFacilityId, SlotListQuery, SlotsResponse},
};

pub async fn register_slot(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateSlotRequest>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }
    req.validate()?;

    // 開始・終了の前後関係は DB の CHECK 制約でも守られるが、境界で弾いておく
    if req.starts_at >= req.ends_at {
        return Err(AppError::UnprocessableEntity(
            "開始時刻は終了時刻より前である必要があります。".into(),
        ));
    }

    registry
        .slot_repository()
        .create(CreateSlotRequestWithFacilityId::new(facility_id, req).into())
        .await
        .map(|_| StatusCode::CREATED)
}

pub async fn show_slot_list(
    _user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    Query(query): Query<SlotListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<SlotsResponse>> {
    registry
        .slot_repository()
        .find_by_facility_and_date(facility_id, query.date, query.only_available)
        .await
        .map(SlotsResponse::from)
        .map(Json)
}

pub async fn delete_slot(
    user: AuthorizedUser,
    Path((facility_id, slot_id)): Path<(FacilityId, SlotId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }

    registry
        .slot_repository()
        .delete(DeleteSlot {
            slot_id,
            facility_id,
        })
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
