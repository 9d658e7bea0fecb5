use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use kernel::model::{
    id::ReservationId,
    reservation::event::{AdminCancelReservation, BookSlot, CancelReservation},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::reservation::{
        CreateReservationRequest, ReservationListQuery, ReservationResponse, ReservationsResponse,
    },
};

pub async fn book_slot(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = registry
        .reservation_repository()
        .book(BookSlot::new(req.facility_id, req.slot_id, user.id()))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse::from(reservation)),
    ))
}

pub async fn show_my_reservations(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationsResponse>> {
    registry
        .reservation_repository()
        .find_active_by_user_id(user.id())
        .await
        .map(ReservationsResponse::from)
        .map(Json)
}

pub async fn cancel_reservation(
    user: AuthorizedUser,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .reservation_repository()
        .cancel(CancelReservation::new(reservation_id, user.id()))
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn show_all_reservations(
    user: AuthorizedUser,
    Query(query): Query<ReservationListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationsResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }

    registry
        .reservation_repository()
        .find_all(query.into())
        .await
        .map(ReservationsResponse::from)
        .map(Json)
}

pub async fn admin_cancel_reservation(
    user: AuthorizedUser,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "管理者のみが実行できる操作です。".into(),
        ));
    }

    registry
        .reservation_repository()
        .admin_cancel(AdminCancelReservation::new(reservation_id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
