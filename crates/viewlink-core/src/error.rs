//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义领域模型在构造、解析阶段的失败语义；
//! - 解码层把这些错误折叠为 `MalformedPayload`，编辑层则据此给出可展示的阻断原因。
//!
//! ## 设计要求（What）
//! - 所有变体派生 `thiserror::Error`，并通过 [`ModelError::code`] 暴露稳定错误码；
//! - 变体携带原始输入文本，便于日志排障，但不包含任何堆栈或内部状态。

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::SplitKind;

/// 稳定错误码常量，供日志与上层映射使用。
pub mod codes {
    pub const INVALID_DURATION: &str = "model.invalid_duration";
    pub const INVALID_TIME_SHIFT: &str = "model.invalid_time_shift";
    pub const INVALID_DATE_RANGE: &str = "model.invalid_date_range";
    pub const UNKNOWN_TIMEZONE: &str = "model.unknown_timezone";
    pub const UNKNOWN_VISUALIZATION: &str = "model.unknown_visualization";
    pub const UNKNOWN_KEYWORD: &str = "model.unknown_keyword";
    pub const INSTANT_OUT_OF_RANGE: &str = "model.instant_out_of_range";
    pub const NON_FINITE_NUMBER: &str = "model.non_finite_number";
    pub const INCOMPATIBLE_BUCKET: &str = "model.incompatible_bucket";
}

/// 领域模型错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把“文本无法成为合法领域值”的所有路径归为一类，调用方无需区分来源即可拒绝输入；
/// - **契约 (What)**：所有变体 `Clone + Eq`，可直接在测试中比较；
/// - **风险 (Trade-offs)**：`UnknownKeyword` 以 `&'static str` 标注关键字类别，避免为每个小枚举单独建变体。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ModelError {
    /// 文本不符合时长语法。
    #[error("`{text}` is not a valid duration")]
    InvalidDuration { text: String },

    /// 文本是合法时长，但不能作为对比偏移（零或负向）。
    #[error("`{text}` is not a valid time shift")]
    InvalidTimeShift { text: String },

    /// 区间起点不早于终点。
    #[error("date range start {start} must be strictly before end {end}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("unknown time zone `{name}`")]
    UnknownTimezone { name: String },

    #[error("unknown visualization `{name}`")]
    UnknownVisualization { name: String },

    /// 封闭关键字集合（排序方向、区间边界、切分类型等）之外的取值。
    #[error("unknown {kind} `{value}`")]
    UnknownKeyword { kind: &'static str, value: String },

    /// 时刻超出四位年份（0000 至 9999）。
    #[error("instant {instant} is outside years 0000-9999")]
    InstantOutOfRange { instant: DateTime<Utc> },

    /// 数值端点或分桶步长为 NaN 或无穷。
    #[error("number `{text}` is not finite")]
    NonFiniteNumber { text: String },

    /// 分桶粒度与切分类型不相容。
    #[error("granularity does not fit the {kind_name} split `{dimension}`", kind_name = .kind.as_str())]
    IncompatibleBucket { dimension: String, kind: SplitKind },
}

impl ModelError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidDuration { .. } => codes::INVALID_DURATION,
            ModelError::InvalidTimeShift { .. } => codes::INVALID_TIME_SHIFT,
            ModelError::InvalidDateRange { .. } => codes::INVALID_DATE_RANGE,
            ModelError::UnknownTimezone { .. } => codes::UNKNOWN_TIMEZONE,
            ModelError::UnknownVisualization { .. } => codes::UNKNOWN_VISUALIZATION,
            ModelError::UnknownKeyword { .. } => codes::UNKNOWN_KEYWORD,
            ModelError::InstantOutOfRange { .. } => codes::INSTANT_OUT_OF_RANGE,
            ModelError::NonFiniteNumber { .. } => codes::NON_FINITE_NUMBER,
            ModelError::IncompatibleBucket { .. } => codes::INCOMPATIBLE_BUCKET,
        }
    }

    pub(crate) fn keyword(kind: &'static str, value: &str) -> Self {
        ModelError::UnknownKeyword {
            kind,
            value: value.to_owned(),
        }
    }

    pub(crate) fn finite(value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ModelError::NonFiniteNumber {
                text: value.to_string(),
            })
        }
    }
}
