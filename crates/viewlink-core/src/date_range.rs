//! # date_range 模块说明
//!
//! ## 角色定位（Why）
//! - 固定时间过滤条件的载荷：半开区间 `[start, end)`；
//! - 对比偏移校验需要“把区间向过去平移”并判断与原区间是否相交。
//!
//! ## 契约（What）
//! - 构造只能经过 [`DateRange::new`]，`start >= end` 一律拒绝，因此任何存在的 `DateRange` 都非空；
//! - 端点限定在四位年份内（0000 至 9999），与令牌里的 RFC 3339 文本一一对应；
//! - 相交判断遵循半开语义：首尾相接（`a.end == b.start`）不算相交。

use chrono::{DateTime, Datelike, Utc};

use crate::{Duration, ModelError, Timezone};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// 经过校验的工厂：`start < end` 且两端都在四位年份内时返回携带原样端点的区间。
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ModelError> {
        for instant in [start, end] {
            if !Self::is_representable(instant) {
                return Err(ModelError::InstantOutOfRange { instant });
            }
        }
        if start >= end {
            return Err(ModelError::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// 端点能否出现在区间中。
    pub fn is_representable(instant: DateTime<Utc>) -> bool {
        (0..=9999).contains(&instant.year())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// 半开区间相交：`self.start < other.end && other.start < self.end`。
    pub fn intersects(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// 把区间在 `timezone` 下向过去平移一个 `duration`。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：生成对比周期（“上一个”周期），方向固定为向后；
    /// - **契约 (What)**：端点平移溢出，或月末钳制使平移后的区间退化为空时返回 `None`；
    /// - **风险 (Trade-offs)**：按月平移时两端各自钳制，平移后区间长度可能与原区间不同。
    pub fn shift(&self, duration: &Duration, timezone: Timezone) -> Option<DateRange> {
        let start = duration.shift(self.start, timezone, -1)?;
        let end = duration.shift(self.end, timezone, -1)?;
        DateRange::new(start, end).ok()
    }
}
