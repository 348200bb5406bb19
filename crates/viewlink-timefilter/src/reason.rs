//! 阻止提交的原因。

use core::fmt;

/// 编辑器一次只展示一条原因，枚举顺序即展示优先级。
///
/// # 教案式说明
/// - **意图 (Why)**：界面需要在提交按钮置灰的同时告诉用户“哪里不对”；
/// - **契约 (What)**：`Overlap` 只在区间与偏移各自合法时出现；`Unchanged` 只在表单合法时出现；
/// - **风险 (Trade-offs)**：文案为英文常量，本地化由宿主按 [`BlockReason::code`] 映射。
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BlockReason {
    InvalidRange,
    InvalidShift,
    Overlap,
    Unchanged,
}

impl BlockReason {
    pub fn message(&self) -> &'static str {
        match self {
            BlockReason::InvalidRange => "Invalid date range",
            BlockReason::InvalidShift => "Invalid time shift",
            BlockReason::Overlap => "Shifted period overlaps with main period",
            BlockReason::Unchanged => "No changes to apply",
        }
    }

    /// 稳定标识，供日志与本地化使用。
    pub fn code(&self) -> &'static str {
        match self {
            BlockReason::InvalidRange => "timefilter.invalid_range",
            BlockReason::InvalidShift => "timefilter.invalid_shift",
            BlockReason::Overlap => "timefilter.overlap",
            BlockReason::Unchanged => "timefilter.unchanged",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
