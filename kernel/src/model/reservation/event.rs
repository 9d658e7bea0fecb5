use crate::model::id::{FacilityId, ReservationId, SlotId, UserId};
use derive_new::new;

#[derive(Debug, new)]
pub struct BookSlot {
    pub facility_id: FacilityId,
    pub slot_id: SlotId,
    pub reserved_by: UserId,
}

#[derive(Debug, new)]
pub struct CancelReservation {
    pub reservation_id: ReservationId,
    pub requested_by: UserId,
}

#[derive(Debug, new)]
pub struct AdminCancelReservation {
    pub reservation_id: ReservationId,
}
