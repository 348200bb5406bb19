//! `viewlink-timefilter` 负责固定时间过滤器的编辑：草稿、校验与提交。
//!
//! # 教案背景（Why）
//! - 用户在过滤菜单里选择起止时刻与对比偏移，每改一个字段都要重新判断能否提交，
//!   并给出唯一一条阻止提交的原因；
//! - 编辑中的字段不再藏在可变的组件状态里，而是不可变的 [`FixedTimeDraft`]，
//!   校验是草稿的纯函数，状态机因此可以脱离界面直接测试。
//!
//! # 使用概览（How）
//! - [`FixedTimeDraft::initial`] 从会话的生效过滤器预填草稿；
//! - [`TimeFilterValidator`] 对草稿给出各项判定与 [`BlockReason`]；
//! - [`FixedTimeEditor`] 把字段事件、提交与取消组织成 `Editing → Blocked | Ready → Closed` 的状态机。
//!
//! # 合约说明（What）
//! - 未填终点时默认为起点之后的一个日历日（按会话时区计算，夏令时切换日可能是 23 或 25 小时）；
//! - 对比周期总是把当前区间向过去平移；平移结果超出可表示范围时视为不重叠；
//! - 与当前已应用的过滤器和偏移完全相同的草稿不可提交。

mod draft;
mod editor;
mod reason;
mod validator;

pub use draft::FixedTimeDraft;
pub use editor::{EditorError, EditorEvent, EditorState, FixedTimeEditor, Outcome};
pub use reason::BlockReason;
pub use validator::TimeFilterValidator;
