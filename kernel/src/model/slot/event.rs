use crate::model::id::{FacilityId, SlotId};
use chrono::{NaiveDate, NaiveTime};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateSlot {
    pub facility_id: FacilityId,
    pub slot_date: NaiveDate,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub capacity: i32,
}

#[derive(Debug)]
pub struct DeleteSlot {
    pub slot_id: SlotId,
    pub facility_id: FacilityId,
}
