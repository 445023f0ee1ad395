//! Half-hour slot calculation.
//!
//! Pure functions that compute the upcoming half-hour boundaries a game can
//! be scheduled on. No side effects, no error conditions.

use chrono::{Duration, Timelike};

use crate::domain::foundation::Timestamp;

/// How many future slots the horizon keeps populated.
pub const HORIZON_SLOTS: usize = 3;

/// Returns the first half-hour boundary strictly after `after`.
///
/// Rounding: minute >= 30 goes to the next hour at :00, otherwise to :30 of
/// the same hour, with seconds and sub-seconds truncated. If rounding lands
/// exactly on `after`, the result advances one more step.
pub fn next_slot(after: Timestamp) -> Timestamp {
    let reference = *after.as_datetime();
    // with_second / with_nanosecond cannot fail for in-range values.
    let truncated = reference.with_second(0).unwrap().with_nanosecond(0).unwrap();

    let mut slot = if truncated.minute() >= 30 {
        truncated.with_minute(0).unwrap() + Duration::hours(1)
    } else {
        truncated.with_minute(30).unwrap()
    };

    // Equality guard: the slot must be strictly in the future.
    if slot <= reference {
        slot = slot + Duration::minutes(30);
    }

    Timestamp::from_datetime(slot)
}

/// Lazy sequence of the next `HORIZON_SLOTS` half-hour boundaries after
/// `after`, strictly increasing, 30 minutes apart.
pub fn upcoming_slots(after: Timestamp) -> impl Iterator<Item = Timestamp> {
    std::iter::successors(Some(next_slot(after)), |slot| Some(slot.plus_minutes(30)))
        .take(HORIZON_SLOTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn at(h: u32, m: u32, s: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 20, h, m, s).unwrap())
    }

    #[test]
    fn early_minute_rounds_to_half_hour() {
        let slots: Vec<_> = upcoming_slots(at(14, 5, 0)).collect();
        assert_eq!(slots, vec![at(14, 30, 0), at(15, 0, 0), at(15, 30, 0)]);
    }

    #[test]
    fn late_minute_rounds_to_next_hour() {
        let slots: Vec<_> = upcoming_slots(at(14, 45, 0)).collect();
        assert_eq!(slots, vec![at(15, 0, 0), at(15, 30, 0), at(16, 0, 0)]);
    }

    #[test]
    fn exact_boundary_advances_to_the_next_one() {
        assert_eq!(next_slot(at(14, 30, 0)), at(15, 0, 0));
        assert_eq!(next_slot(at(14, 0, 0)), at(14, 30, 0));
    }

    #[test]
    fn seconds_are_truncated_not_rounded() {
        assert_eq!(next_slot(at(14, 29, 59)), at(14, 30, 0));
    }

    #[test]
    fn crosses_midnight() {
        let late = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 20, 23, 40, 0).unwrap());
        let slots: Vec<_> = upcoming_slots(late).collect();
        assert_eq!(
            *slots[0].as_datetime(),
            Utc.with_ymd_and_hms(2024, 5, 21, 0, 0, 0).unwrap()
        );
        assert_eq!(
            *slots[2].as_datetime(),
            Utc.with_ymd_and_hms(2024, 5, 21, 1, 0, 0).unwrap()
        );
    }

    proptest! {
        #[test]
        fn slots_are_aligned_increasing_and_future(secs in 0i64..=4_000_000_000) {
            let reference = Timestamp::from_datetime(
                Utc.timestamp_opt(secs, 0).unwrap(),
            );
            let slots: Vec<_> = upcoming_slots(reference).collect();

            prop_assert_eq!(slots.len(), HORIZON_SLOTS);
            prop_assert!(slots[0].is_after(&reference));
            for slot in &slots {
                let dt = slot.as_datetime();
                prop_assert_eq!(dt.second(), 0);
                prop_assert!(dt.minute() == 0 || dt.minute() == 30);
            }
            for pair in slots.windows(2) {
                prop_assert_eq!(pair[1].duration_since(&pair[0]).num_minutes(), 30);
            }
        }

        #[test]
        fn first_slot_is_at_most_thirty_minutes_out(secs in 0i64..=4_000_000_000, nanos in 0u32..1_000_000_000) {
            let reference = Timestamp::from_datetime(
                Utc.timestamp_opt(secs, nanos).unwrap(),
            );
            let first = next_slot(reference);
            let gap = first.duration_since(&reference);

            prop_assert!(gap.num_seconds() > 0);
            prop_assert!(gap.num_seconds() <= 30 * 60);
        }
    }
}
