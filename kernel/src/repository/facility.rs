use crate::model::{
    facility::{
        event::{CreateFacility, DeleteFacility, UpdateFacility},
        Facility,
    },
    id::FacilityId,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait FacilityRepository: Send + Sync {
    async fn create(&self, event: CreateFacility) -> AppResult<FacilityId>;
    async fn find_all(&self, only_active: bool) -> AppResult<Vec<Facility>>;
    async fn find_by_id(&self, facility_id: FacilityId) -> AppResult<Option<Facility>>;
    async fn update(&self, event: UpdateFacility) -> AppResult<()>;
    // 施設を削除する。配下のスロット・予約は外部キーのカスケードで消える
    async fn delete(&self, event: DeleteFacility) -> AppResult<()>;
}
