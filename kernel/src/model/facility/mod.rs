use crate::model::id::FacilityId;

pub mod event;

#[derive(Debug)]
pub struct Facility {
    pub facility_id: FacilityId,
    pub name: String,
    pub category: Option<String>,
    pub capacity_hint: Option<i32>,
    pub is_active: bool,
}
