use crate::model::{
    id::UserId,
    reservation::{
        event::{AdminCancelReservation, BookSlot, CancelReservation},
        Reservation, ReservationListOptions,
    },
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use shared::error::AppResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    // 予約操作を行う。残枠の減算と予約レコードの作成は単一トランザクションで行われる
    async fn book(&self, event: BookSlot) -> AppResult<Reservation>;
    // 予約者本人による取消。残枠を復元する
    async fn cancel(&self, event: CancelReservation) -> AppResult<()>;
    // 管理者による取消。所有チェックなし・冪等
    async fn admin_cancel(&self, event: AdminCancelReservation) -> AppResult<()>;
    // 指定ユーザーが同日の時間帯に交差する稼働中予約を持つか
    async fn has_overlap(
        &self,
        user_id: UserId,
        slot_date: NaiveDate,
        starts_at: NaiveTime,
        ends_at: NaiveTime,
    ) -> AppResult<bool>;
    // ユーザー ID に紐づく稼働中の予約一覧を取得する
    async fn find_active_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Reservation>>;
    // 予約一覧（取消済み含む）を条件付きで取得する。管理画面の一覧用
    async fn find_all(&self, options: ReservationListOptions) -> AppResult<Vec<Reservation>>;
}
