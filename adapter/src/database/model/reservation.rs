use kernel::model::{
    id::{FacilityId, ReservationId, SlotId, UserId},
    reservation::{Reservation, ReservationSlot, ReservationStatus},
};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveTime, Utc};

// 取消処理の事前チェックに使う型。
// 残枠の復元可否は status で判定する（取消済みなら復元しない）
#[derive(sqlx::FromRow)]
pub struct ReservationStateRow {
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub slot_id: SlotId,
    pub status: ReservationStatus,
}

// 予約一覧を取得する際に使う型。スロットの時間帯を JOIN で一緒に引く
#[derive(sqlx::FromRow)]
pub struct ReservationRow {
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub facility_id: FacilityId,
    pub slot_id: SlotId,
    pub status: ReservationStatus,
    pub reserved_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub slot_date: NaiveDate,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
}

impl From<ReservationRow> for Reservation {
    fn from(value: ReservationRow) -> Self {
        let ReservationRow {
            reservation_id,
            user_id,
            facility_id,
            slot_id,
            status,
            reserved_at,
            cancelled_at,
            slot_date,
            starts_at,
            ends_at,
        } = value;
        Reservation {
            reservation_id,
            reserved_by: user_id,
            facility_id,
            status,
            reserved_at,
            cancelled_at,
            slot: ReservationSlot {
                slot_id,
                slot_date,
                starts_at,
                ends_at,
            },
        }
    }
}
