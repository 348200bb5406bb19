//! 对比偏移：空（不对比）或一个正向时长。

use core::fmt;

use crate::{Duration, ModelError};

/// 会话当前应用的对比偏移。
///
/// # 教案式说明
/// - **意图 (Why)**：用户输入的偏移文本只有在通过语法校验后才会成为 `TimeShift`，
///   非法文本停留在校验边界，不会混入会话快照；
/// - **契约 (What)**：空字符串是合法的“无偏移”；非空文本必须是非零、非负的时长；
/// - **风险 (Trade-offs)**：对比方向固定为向过去，负向时长因此被拒绝而不是被翻转。
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TimeShift(Option<Duration>);

impl TimeShift {
    pub const EMPTY: TimeShift = TimeShift(None);

    pub fn parse(text: &str) -> Result<Self, ModelError> {
        if text.is_empty() {
            return Ok(TimeShift::EMPTY);
        }
        let invalid = || ModelError::InvalidTimeShift {
            text: text.to_owned(),
        };
        let duration = Duration::parse(text).map_err(|_| invalid())?;
        TimeShift::from_duration(duration).ok_or_else(invalid)
    }

    /// 零或负向时长返回 `None`。
    pub fn from_duration(duration: Duration) -> Option<Self> {
        if duration.is_zero() || duration.is_negative() {
            return None;
        }
        Some(TimeShift(Some(duration)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn duration(&self) -> Option<&Duration> {
        self.0.as_ref()
    }
}

/// 文本能否成为 [`TimeShift`]。
pub fn is_valid_time_shift(text: &str) -> bool {
    TimeShift::parse(text).is_ok()
}

impl fmt::Display for TimeShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(duration) => fmt::Display::fmt(duration, f),
            None => Ok(()),
        }
    }
}
