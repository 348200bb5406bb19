//! # validator 模块说明
//!
//! ## 角色定位（Why）
//! - 把“草稿能否提交、为什么不能”集中成纯函数，界面每次按键后重新求值即可；
//! - 判定规则只依赖草稿、会话快照与目标维度，没有任何跨调用的记忆。
//!
//! ## 契约（What）
//! - 区间：起点必填；终点缺省为起点之后一个日历日；要求 `start < end`；
//! - 偏移：空串表示不对比；非空时必须是正向时长；
//! - 重叠：当前区间与向过去平移偏移后的区间按半开区间相交；
//! - 提交：表单合法，且新过滤器或新偏移与会话当前值至少有一项不同。

use chrono::{DateTime, Utc};
use tracing::debug;
use viewlink_core::{DateRange, Duration, Essence, Filter, FilterClause, TimeShift, Timezone};

use crate::{BlockReason, FixedTimeDraft};

/// 针对某个会话与时间维度的校验器。
#[derive(Clone, Copy, Debug)]
pub struct TimeFilterValidator<'a> {
    essence: &'a Essence,
    dimension: &'a str,
}

impl<'a> TimeFilterValidator<'a> {
    pub fn new(essence: &'a Essence, dimension: &'a str) -> Self {
        TimeFilterValidator { essence, dimension }
    }

    pub fn essence(&self) -> &'a Essence {
        self.essence
    }

    pub fn dimension(&self) -> &'a str {
        self.dimension
    }

    /// 解析草稿的起止时刻。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：日期选择器允许只选起点，此时默认选中一整天；
    /// - **契约 (What)**：`start` 缺失或解析出的终点不晚于起点时返回 `None`；
    /// - **执行 (How)**：缺省终点由 `P1D` 在 `timezone` 的日历上平移一步得到，而不是加 24 小时。
    pub fn resolve_endpoint(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        timezone: Timezone,
    ) -> Option<DateRange> {
        let start = start?;
        let end = match end {
            Some(end) => end,
            None => Duration::days(1).shift(start, timezone, 1)?,
        };
        DateRange::new(start, end).ok()
    }

    /// 非法文本返回 `None`，不携带任何时长。
    pub fn parse_shift(text: &str) -> Option<TimeShift> {
        TimeShift::parse(text).ok()
    }

    /// 当前区间与其对比周期是否重叠。
    pub fn overlaps(range: &DateRange, shift: &TimeShift, timezone: Timezone) -> bool {
        let Some(duration) = shift.duration() else {
            return false;
        };
        match range.shift(duration, timezone) {
            Some(previous) => range.intersects(&previous),
            None => false,
        }
    }

    pub fn date_range(&self, draft: &FixedTimeDraft) -> Option<DateRange> {
        Self::resolve_endpoint(draft.start, draft.end, self.essence.timezone())
    }

    pub fn are_dates_valid(&self, draft: &FixedTimeDraft) -> bool {
        self.date_range(draft).is_some()
    }

    pub fn is_time_shift_valid(&self, draft: &FixedTimeDraft) -> bool {
        Self::parse_shift(&draft.shift).is_some()
    }

    /// 区间或偏移本身不合法时不报告重叠。
    pub fn does_time_shift_overlap(&self, draft: &FixedTimeDraft) -> bool {
        match (self.date_range(draft), Self::parse_shift(&draft.shift)) {
            (Some(range), Some(shift)) => Self::overlaps(&range, &shift, self.essence.timezone()),
            _ => false,
        }
    }

    pub fn is_form_valid(&self, draft: &FixedTimeDraft) -> bool {
        self.are_dates_valid(draft)
            && self.is_time_shift_valid(draft)
            && !self.does_time_shift_overlap(draft)
    }

    /// 提交后会话的过滤器：替换（或追加）目标维度上的固定时间子句。
    pub fn construct_filter(&self, draft: &FixedTimeDraft) -> Option<Filter> {
        let range = self.date_range(draft)?;
        Some(
            self.essence
                .filter
                .set_clause(FilterClause::fixed_time(self.dimension, range)),
        )
    }

    /// 草稿相对会话当前状态是否有实际变化。
    pub fn is_change_meaningful(&self, draft: &FixedTimeDraft) -> bool {
        let (Some(filter), Some(shift)) =
            (self.construct_filter(draft), Self::parse_shift(&draft.shift))
        else {
            return false;
        };
        filter != self.essence.filter || shift != *self.essence.time_shift()
    }

    /// 按展示优先级给出第一条阻止原因。
    pub fn validate(&self, draft: &FixedTimeDraft) -> Result<(), BlockReason> {
        if !self.are_dates_valid(draft) {
            return Err(BlockReason::InvalidRange);
        }
        if !self.is_time_shift_valid(draft) {
            return Err(BlockReason::InvalidShift);
        }
        if self.does_time_shift_overlap(draft) {
            return Err(BlockReason::Overlap);
        }
        if !self.is_change_meaningful(draft) {
            return Err(BlockReason::Unchanged);
        }
        Ok(())
    }

    /// 生成提交后的新会话：过滤器与对比偏移同时替换。
    pub fn commit(&self, draft: &FixedTimeDraft) -> Result<Essence, BlockReason> {
        self.validate(draft).inspect_err(|reason| {
            debug!(code = reason.code(), dimension = self.dimension, "time filter commit blocked");
        })?;
        let (Some(filter), Some(shift)) =
            (self.construct_filter(draft), Self::parse_shift(&draft.shift))
        else {
            return Err(BlockReason::InvalidRange);
        };
        Ok(self.essence.with_filter(filter).with_time_shift(shift))
    }
}
