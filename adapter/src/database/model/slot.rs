use kernel::model::{
    id::{FacilityId, SlotId},
    slot::Slot,
};
use sqlx::types::chrono::{NaiveDate, NaiveTime};

#[derive(sqlx::FromRow)]
pub struct SlotRow {
    pub slot_id: SlotId,
    pub facility_id: FacilityId,
    pub slot_date: NaiveDate,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub capacity: i32,
    pub remaining: i32,
}

impl From<SlotRow> for Slot {
    fn from(value: SlotRow) -> Self {
        let SlotRow {
            slot_id,
            facility_id,
            slot_date,
            starts_at,
            ends_at,
            capacity,
            remaining,
        } = value;
        Slot {
            slot_id,
            facility_id,
            slot_date,
            starts_at,
            ends_at,
            capacity,
            remaining,
        }
    }
}
