//! 编辑中的固定时间过滤器。

use chrono::{DateTime, Utc};
use viewlink_core::{Essence, FilterClause, Timekeeper};

/// 不可变草稿：每次字段变更都产生新值，校验只依赖当前草稿。
///
/// `shift` 保留用户输入的原文，非法文本在校验边界被拒绝，而不是在这里被规整。
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct FixedTimeDraft {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub shift: String,
}

impl FixedTimeDraft {
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        shift: impl Into<String>,
    ) -> Self {
        FixedTimeDraft {
            start,
            end,
            shift: shift.into(),
        }
    }

    /// 打开菜单时的草稿。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：相对时间子句（如“最近一天”）在切到固定时间页时应显示其当前对应的具体区间；
    /// - **契约 (What)**：按 `timekeeper` 求值生效过滤器，取 `dimension` 上固定时间子句的第一个区间；
    ///   没有这样的子句时起止为空；偏移总是取会话当前已应用的值；
    /// - **风险 (Trade-offs)**：多区间子句只回显第一个区间，提交后其余区间被丢弃。
    pub fn initial(essence: &Essence, dimension: &str, timekeeper: &Timekeeper) -> Self {
        let shift = essence.time_shift().to_string();
        let effective = essence.effective_filter(timekeeper);
        match effective.clause_for_reference(dimension) {
            Some(FilterClause::FixedTime(clause)) => match clause.values.first() {
                Some(range) => FixedTimeDraft::new(Some(range.start()), Some(range.end()), shift),
                None => FixedTimeDraft::new(None, None, shift),
            },
            _ => FixedTimeDraft::new(None, None, shift),
        }
    }

    pub fn with_start(&self, start: Option<DateTime<Utc>>) -> Self {
        FixedTimeDraft {
            start,
            ..self.clone()
        }
    }

    pub fn with_end(&self, end: Option<DateTime<Utc>>) -> Self {
        FixedTimeDraft {
            end,
            ..self.clone()
        }
    }

    pub fn with_shift(&self, shift: impl Into<String>) -> Self {
        FixedTimeDraft {
            shift: shift.into(),
            ..self.clone()
        }
    }
}
