use crate::model::id::{FacilityId, SlotId};
use chrono::{NaiveDate, NaiveTime};

pub mod event;

#[derive(Debug, Clone)]
pub struct Slot {
    pub slot_id: SlotId,
    pub facility_id: FacilityId,
    pub slot_date: NaiveDate,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub capacity: i32,
    pub remaining: i32,
}

/// 半開区間 [a_start, a_end) と [b_start, b_end) が交差するかを判定する。
/// 端点を共有するだけの隣接区間は交差とみなさない。
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    #[test]
    fn partially_overlapping_intervals_intersect() {
        assert!(intervals_overlap(t(10, 0), t(11, 0), t(10, 30), t(11, 30)));
        assert!(intervals_overlap(t(10, 30), t(11, 30), t(10, 0), t(11, 0)));
    }

    #[test]
    fn contained_interval_intersects() {
        assert!(intervals_overlap(t(9, 0), t(12, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn abutting_intervals_do_not_intersect() {
        assert!(!intervals_overlap(t(10, 0), t(11, 0), t(11, 0), t(12, 0)));
        assert!(!intervals_overlap(t(11, 0), t(12, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn disjoint_intervals_do_not_intersect() {
        assert!(!intervals_overlap(t(8, 0), t(9, 0), t(13, 0), t(14, 0)));
    }
}
