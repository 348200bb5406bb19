//! # viewlink-core
//!
//! ## 角色定位（Why）
//! - 承载可分享会话快照（essence）的强类型模型：数据源、过滤条件、切分、序列、对比偏移、时区与可视化；
//! - 提供解码、校验两侧共用的时间原语：ISO-8601 风格的 [`Duration`]、半开区间 [`DateRange`]
//!   与“空或正向时长”的 [`TimeShift`]。
//!
//! ## 设计要求（What）
//! - 所有模型值均为不可变快照：更新操作返回新值，从不原地修改调用方持有的实例；
//! - 过滤条件是封闭的和类型 [`FilterClause`]，消费方需穷尽匹配；
//! - 时间运算一律在 [`Timezone`] 的日历规则下进行，夏令时切换日的“一天”可能是 23 或 25 小时。
//!
//! ## 模块导览（How）
//! - [`duration`]：时长语法解析、规范化输出、时区感知的平移与取整；
//! - [`date_range`] / [`time_shift`] / [`timezone`]：时间相关的值类型；
//! - [`filter`] / [`split`] / [`series`] / [`essence`]：会话快照本体；
//! - [`timekeeper`]：固定“当前时刻”，把相对时间条件求值为固定区间。

pub mod date_range;
pub mod duration;
pub mod error;
pub mod essence;
pub mod filter;
pub mod series;
pub mod split;
pub mod time_shift;
pub mod timekeeper;
pub mod timezone;

pub use date_range::DateRange;
pub use duration::Duration;
pub use error::{ModelError, codes};
pub use essence::{Essence, Legend, Visualization};
pub use filter::{
    BooleanClause, Bounds, Filter, FilterClause, FixedTimeClause, NumberClause, NumberRange,
    RelativeTimeClause, StringAction, StringClause, TimePeriod,
};
pub use series::{FormatKind, Series, SeriesFormat};
pub use split::{Bucket, Direction, SeriesPeriod, Sort, SortKind, Split, SplitKind};
pub use time_shift::TimeShift;
pub use timekeeper::Timekeeper;
pub use timezone::Timezone;

/// 领域层统一的结果别名。
pub type Result<T, E = ModelError> = core::result::Result<T, E>;
