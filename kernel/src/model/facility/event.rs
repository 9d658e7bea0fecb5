use crate::model::id::FacilityId;

pub struct CreateFacility {
    pub name: String,
    pub category: Option<String>,
    pub capacity_hint: Option<i32>,
    pub is_active: bool,
}

// None のフィールドは更新しない
#[derive(Debug)]
pub struct UpdateFacility {
    pub facility_id: FacilityId,
    pub name: Option<String>,
    pub category: Option<String>,
    pub capacity_hint: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug)]
pub struct DeleteFacility {
    pub facility_id: FacilityId,
}
