use garde::Validate;
use kernel::model::{
    facility::{
        event::{CreateFacility, UpdateFacility},
        Facility,
    },
    id::FacilityId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilityRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(skip)]
    pub category: Option<String>,
    #[garde(inner(range(min = 1)))]
    pub capacity_hint: Option<i32>,
    #[garde(skip)]
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl From<CreateFacilityRequest> for CreateFacility {
    fn from(value: CreateFacilityRequest) -> Self {
        let CreateFacilityRequest {
            name,
            category,
            capacity_hint,
            is_active,
        } = value;
        CreateFacility {
            name,
            category,
            capacity_hint,
            is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacilityRequest {
    #[garde(inner(length(min = 1)))]
    pub name: Option<String>,
    #[garde(skip)]
    pub category: Option<String>,
    #[garde(inner(range(min = 1)))]
    pub capacity_hint: Option<i32>,
    #[garde(skip)]
    pub is_active: Option<bool>,
}

#[derive(derive_new::new)]
pub struct UpdateFacilityRequestWithId(FacilityId, UpdateFacilityRequest);

impl From<UpdateFacilityRequestWithId> for UpdateFacility {
    fn from(value: UpdateFacilityRequestWithId) -> Self {
        let UpdateFacilityRequestWithId(
            facility_id,
            UpdateFacilityRequest {
                name,
                category,
                capacity_hint,
                is_active,
            },
        ) = value;
        UpdateFacility {
            facility_id,
            name,
            category,
            capacity_hint,
            is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityListQuery {
    // true の場合は無効化済みの施設も一覧に含める（管理画面向け）
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitiesResponse {
    pub items: Vec<FacilityResponse>,
}

impl From<Vec<Facility>> for FacilitiesResponse {
    fn from(value: Vec<Facility>) -> Self {
        Self {
            items: value.into_iter().map(FacilityResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityResponse {
    pub facility_id: FacilityId,
    pub name: String,
    pub category: Option<String>,
    pub capacity_hint: Option<i32>,
    pub is_active: bool,
}

impl From<Facility> for FacilityResponse {
    fn from(value: Facility) -> Self {
        let Facility {
            facility_id,
            name,
            category,
            capacity_hint,
            is_active,
        } = value;
        Self {
            facility_id,
            name,
            category,
            capacity_hint,
            is_active,
        }
    }
}
