//! 重叠判定的性质测试。

use chrono::{DateTime, TimeDelta, Utc};
use proptest::prelude::*;
use viewlink_core::{DateRange, Duration, TimeShift, Timezone};
use viewlink_timefilter::TimeFilterValidator;

fn day_aligned(day: i64) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::days(day)
}

proptest! {
    /// UTC 下按整日平移：偏移短于区间长度才重叠。
    #[test]
    fn whole_day_shift_overlaps_iff_shorter_than_range(
        first_day in 0i64..40_000,
        length in 1i64..60,
        shift_days in 1u32..90,
    ) {
        let range = DateRange::new(day_aligned(first_day), day_aligned(first_day + length)).unwrap();
        let shift = TimeShift::from_duration(Duration::days(shift_days)).unwrap();
        prop_assert_eq!(
            TimeFilterValidator::overlaps(&range, &shift, Timezone::UTC),
            i64::from(shift_days) < length
        );
    }

    /// 结果只取决于区间与偏移，与求值顺序或重复次数无关。
    #[test]
    fn overlap_is_a_pure_function(
        start in 0i64..4_000_000_000,
        length in 1i64..10_000_000,
        hours in 1u32..5_000,
        zone in prop::sample::select(vec!["Etc/UTC", "Europe/Warsaw", "America/New_York"]),
    ) {
        let timezone = Timezone::parse(zone).unwrap();
        let range = DateRange::new(
            DateTime::UNIX_EPOCH + TimeDelta::seconds(start),
            DateTime::UNIX_EPOCH + TimeDelta::seconds(start + length),
        )
        .unwrap();
        let shift = TimeShift::from_duration(Duration::hours(hours)).unwrap();
        let copy = range;

        let first = TimeFilterValidator::overlaps(&range, &shift, timezone);
        let _ = TimeFilterValidator::overlaps(&copy, &TimeShift::EMPTY, timezone);
        let second = TimeFilterValidator::overlaps(&copy, &shift, timezone);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, i64::from(hours) * 3_600 < length);
    }
}
