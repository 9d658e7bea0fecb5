use kernel::model::{facility::Facility, id::FacilityId};

#[derive(sqlx::FromRow)]
pub struct FacilityRow {
    pub facility_id: FacilityId,
    pub name: String,
    pub category: Option<String>,
    pub capacity_hint: Option<i32>,
    pub is_active: bool,
}

impl From<FacilityRow> for Facility {
    fn from(value: FacilityRow) -> Self {
        let FacilityRow {
            facility_id,
            name,
            category,
            capacity_hint,
            is_active,
        } = value;
        Facility {
            facility_id,
            name,
            category,
            capacity_hint,
            is_active,
        }
    }
}
