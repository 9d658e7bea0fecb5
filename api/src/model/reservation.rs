use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kernel::model::{
    id::{FacilityId, ReservationId, SlotId, UserId},
    reservation::{Reservation, ReservationListOptions, ReservationSlot, ReservationStatus},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub facility_id: FacilityId,
    pub slot_id: SlotId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatusName {
    Active,
    Cancelled,
}

impl From<ReservationStatus> for ReservationStatusName {
    fn from(value: ReservationStatus) -> Self {
        match value {
            ReservationStatus::Active => Self::Active,
            ReservationStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<ReservationStatusName> for ReservationStatus {
    fn from(value: ReservationStatusName) -> Self {
        match value {
            ReservationStatusName::Active => Self::Active,
            ReservationStatusName::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationListQuery {
    pub user_id: Option<UserId>,
    pub facility_id: Option<FacilityId>,
    pub date: Option<NaiveDate>,
    pub status: Option<ReservationStatusName>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl From<ReservationListQuery> for ReservationListOptions {
    fn from(value: ReservationListQuery) -> Self {
        let ReservationListQuery {
            user_id,
            facility_id,
            date,
            status,
            limit,
            offset,
        } = value;
        ReservationListOptions {
            user_id,
            facility_id,
            slot_date: date,
            status: status.map(ReservationStatus::from),
            limit,
            offset,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub items: Vec<ReservationResponse>,
}

impl From<Vec<Reservation>> for ReservationsResponse {
    fn from(value: Vec<Reservation>) -> Self {
        Self {
            items: value.into_iter().map(ReservationResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: ReservationId,
    pub reserved_by: UserId,
    pub facility_id: FacilityId,
    pub status: ReservationStatusName,
    pub reserved_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub slot: ReservationSlotResponse,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            reservation_id,
            reserved_by,
            facility_id,
            status,
            reserved_at,
            cancelled_at,
            slot,
        } = value;
        Self {
            reservation_id,
            reserved_by,
            facility_id,
            status: status.into(),
            reserved_at,
            cancelled_at,
            slot: slot.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSlotResponse {
    pub slot_id: SlotId,
    pub slot_date: NaiveDate,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
}

impl From<ReservationSlot> for ReservationSlotResponse {
    fn from(value: ReservationSlot) -> Self {
        let ReservationSlot {
            slot_id,
            slot_date,
            starts_at,
            ends_at,
        } = value;
        Self {
            slot_id,
            slot_date,
            starts_at,
            ends_at,
        }
    }
}
