use crate::model::{
    id::{FacilityId, SlotId},
    slot::{
        event::{CreateSlot, DeleteSlot},
        Slot,
    },
};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

#[async_trait]
pub trait SlotRepository: Send + Sync {
    // スロットを作成する。同一施設・同一時間帯の重複は拒否される
    async fn create(&self, event: CreateSlot) -> AppResult<SlotId>;
    async fn find_by_facility_and_date(
        &self,
        facility_id: FacilityId,
        slot_date: NaiveDate,
        only_available: bool,
    ) -> AppResult<Vec<Slot>>;
    async fn find_by_id(&self, slot_id: SlotId) -> AppResult<Option<Slot>>;
    // スロットを削除する。稼働中の予約が残っている場合は拒否する
    async fn delete(&self, event: DeleteSlot) -> AppResult<()>;
}
