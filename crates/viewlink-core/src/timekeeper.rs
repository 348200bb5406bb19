//! # timekeeper 模块说明
//!
//! ## 角色定位（Why）
//! - 相对时间子句（“最近一天”“本周”“上个月”）只有结合某个“当前时刻”才有具体区间；
//! - 把“当前时刻”显式化为值对象，使求值成为纯函数，测试可以固定时间。
//!
//! ## 求值规则（What）
//! - `Latest`：`[now - d, now)`；
//! - `Current`：`[floor(now), floor(now) + d)`；
//! - `Previous`：`[floor(now) - d, floor(now))`；
//! - 无法取整的时长或溢出时返回 `None`，调用方保留原相对子句。

use chrono::{DateTime, Utc};

use crate::{DateRange, FixedTimeClause, RelativeTimeClause, TimePeriod, Timezone};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timekeeper {
    now: DateTime<Utc>,
}

impl Timekeeper {
    pub fn fixed(now: DateTime<Utc>) -> Self {
        Timekeeper { now }
    }

    /// 以系统时钟为当前时刻。
    pub fn system() -> Self {
        Timekeeper { now: Utc::now() }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn evaluate(
        &self,
        clause: &RelativeTimeClause,
        timezone: Timezone,
    ) -> Option<FixedTimeClause> {
        let duration = &clause.duration;
        let (start, end) = match clause.period {
            TimePeriod::Latest => (duration.shift(self.now, timezone, -1)?, self.now),
            TimePeriod::Current => {
                let floor = duration.floor(self.now, timezone)?;
                (floor, duration.shift(floor, timezone, 1)?)
            }
            TimePeriod::Previous => {
                let floor = duration.floor(self.now, timezone)?;
                (duration.shift(floor, timezone, -1)?, floor)
            }
        };
        let range = DateRange::new(start, end).ok()?;
        Some(FixedTimeClause {
            reference: clause.reference.clone(),
            values: vec![range],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Duration;
    use chrono::TimeZone;

    fn clause(period: TimePeriod, duration: &str) -> RelativeTimeClause {
        RelativeTimeClause {
            reference: "time".into(),
            period,
            duration: Duration::parse(duration).unwrap(),
        }
    }

    fn range_of(clause: FixedTimeClause) -> (DateTime<Utc>, DateTime<Utc>) {
        (clause.values[0].start(), clause.values[0].end())
    }

    #[test]
    fn evaluates_each_period() {
        let now = Utc.with_ymd_and_hms(2015, 9, 13, 10, 30, 0).unwrap();
        let keeper = Timekeeper::fixed(now);
        let day = |d: u32| Utc.with_ymd_and_hms(2015, 9, d, 0, 0, 0).unwrap();

        let latest = keeper.evaluate(&clause(TimePeriod::Latest, "P1D"), Timezone::UTC);
        assert_eq!(
            range_of(latest.unwrap()),
            (Utc.with_ymd_and_hms(2015, 9, 12, 10, 30, 0).unwrap(), now)
        );

        let current = keeper.evaluate(&clause(TimePeriod::Current, "P1D"), Timezone::UTC);
        assert_eq!(range_of(current.unwrap()), (day(13), day(14)));

        let previous = keeper.evaluate(&clause(TimePeriod::Previous, "P1D"), Timezone::UTC);
        assert_eq!(range_of(previous.unwrap()), (day(12), day(13)));
    }

    #[test]
    fn composite_duration_cannot_be_floored() {
        let keeper = Timekeeper::fixed(Utc.with_ymd_and_hms(2015, 9, 13, 0, 0, 0).unwrap());
        let evaluated = keeper.evaluate(&clause(TimePeriod::Current, "P1DT1H"), Timezone::UTC);
        assert_eq!(evaluated, None);
    }
}
