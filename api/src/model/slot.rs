use chrono::{NaiveDate, NaiveTime};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{FacilityId, SlotId},
    slot::{event::CreateSlot, Slot},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequest {
    #[garde(skip)]
    pub slot_date: NaiveDate,
    #[garde(skip)]
    pub starts_at: NaiveTime,
    #[garde(skip)]
    pub ends_at: NaiveTime,
    #[garde(range(min = 1))]
    pub capacity: i32,
}

#[derive(new)]
pub struct CreateSlotRequestWithFacilityId(FacilityId, CreateSlotRequest);

impl From<CreateSlotRequestWithFacilityId> for CreateSlot {
    fn from(value: CreateSlotRequestWithFacilityId) -> Self {
        let CreateSlotRequestWithFacilityId(
            facility_id,
            CreateSlotRequest {
                slot_date,
                starts_at,
                ends_at,
                capacity,
            },
        ) = value;
        CreateSlot {
            facility_id,
            slot_date,
            starts_at,
            ends_at,
            capacity,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotListQuery {
    pub date: NaiveDate,
    // true の場合は残枠のあるスロットのみを返す
    #[serde(default)]
    pub only_available: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResponse {
    pub items: Vec<SlotResponse>,
}

impl From<Vec<Slot>> for SlotsResponse {
    fn from(value: Vec<Slot>) -> Self {
        Self {
            items: value.into_iter().map(SlotResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    pub slot_id: SlotId,
    pub facility_id: FacilityId,
    pub slot_date: NaiveDate,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub capacity: i32,
    pub remaining: i32,
}

impl From<Slot> for SlotResponse {
    fn from(value: Slot) -> Self {
        let Slot {
            slot_id,
            facility_id,
            slot_date,
            starts_at,
            ends_at,
            capacity,
            remaining,
        } = value;
        Self {
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
