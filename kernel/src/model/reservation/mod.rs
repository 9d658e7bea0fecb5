use crate::model::id::{FacilityId, ReservationId, SlotId, UserId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

pub mod event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Cancelled,
}

#[derive(Debug)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub reserved_by: UserId,
    pub facility_id: FacilityId,
    pub status: ReservationStatus,
    pub reserved_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub slot: ReservationSlot,
}

// レスポンスに予約時間帯をそのまま載せられるよう、スロット情報を非正規化して持つ
#[derive(Debug)]
pub struct ReservationSlot {
    pub slot_id: SlotId,
    pub slot_date: NaiveDate,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
}

// 管理者向け一覧の絞り込み条件。None の条件は適用しない
#[derive(Debug)]
pub struct ReservationListOptions {
    pub user_id: Option<UserId>,
    pub facility_id: Option<FacilityId>,
    pub slot_date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
    pub limit: i64,
    pub offset: i64,
}
