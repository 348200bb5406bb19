//! # editor 模块说明
//!
//! ## 角色定位（Why）
//! - 把固定时间页的交互建模为显式状态机，界面只负责转发事件与渲染当前状态；
//! - 每个字段事件都用新草稿替换旧草稿，并立即重新校验，状态只是校验结果的投影。
//!
//! ## 状态机约束（What）
//! - `Editing`：刚打开、尚未收到任何字段事件；
//! - `Blocked(reason)` / `Ready`：最近一次校验的结论，二者之间可任意往返；
//! - `Closed(Committed | Cancelled)`：终态，之后的任何事件都返回 [`EditorError::Closed`]；
//! - `Commit` 只在 `Ready` 下生效；`Blocked` 下提交返回 [`EditorError::NotReady`] 且状态不变，
//!   `Editing` 下提交先对预填草稿校验一次，再按 `Ready` 或 `Blocked` 处理；
//! - `Cancel` 在任意开放状态下生效。

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;
use viewlink_core::{Essence, Timekeeper};

use crate::{BlockReason, FixedTimeDraft, TimeFilterValidator};

/// 编辑器关闭的方式。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Outcome {
    Committed,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EditorState {
    Editing,
    Blocked(BlockReason),
    Ready,
    Closed(Outcome),
}

impl EditorState {
    pub fn is_closed(self) -> bool {
        matches!(self, EditorState::Closed(_))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EditorEvent {
    SetStart(Option<DateTime<Utc>>),
    SetEnd(Option<DateTime<Utc>>),
    SetShift(String),
    Commit,
    Cancel,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum EditorError {
    #[error("time filter editor is already closed")]
    Closed,
    #[error("time filter cannot be committed: {0}")]
    NotReady(BlockReason),
}

/// 固定时间过滤器编辑会话。
///
/// # 教案式说明
/// - **意图 (Why)**：一次菜单打开对应一个编辑器，持有打开时的会话快照与当前草稿；
/// - **契约 (What)**：[`FixedTimeEditor::apply`] 在 `Commit` 成功时返回新会话，其余事件返回 `None`；
///   编辑器从不修改打开时拿到的会话；
/// - **风险 (Trade-offs)**：单写者假设由宿主的事件分派保证，编辑器本身不做同步。
#[derive(Clone, Debug)]
pub struct FixedTimeEditor {
    essence: Essence,
    dimension: String,
    draft: FixedTimeDraft,
    state: EditorState,
}

impl FixedTimeEditor {
    /// 以会话当前生效的过滤器预填草稿。
    pub fn open(essence: Essence, dimension: impl Into<String>, timekeeper: &Timekeeper) -> Self {
        let dimension = dimension.into();
        let draft = FixedTimeDraft::initial(&essence, &dimension, timekeeper);
        FixedTimeEditor {
            essence,
            dimension,
            draft,
            state: EditorState::Editing,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn draft(&self) -> &FixedTimeDraft {
        &self.draft
    }

    pub fn validator(&self) -> TimeFilterValidator<'_> {
        TimeFilterValidator::new(&self.essence, &self.dimension)
    }

    /// 驱动一次状态跃迁。
    pub fn apply(&mut self, event: EditorEvent) -> Result<Option<Essence>, EditorError> {
        if self.state.is_closed() {
            return Err(EditorError::Closed);
        }
        match event {
            EditorEvent::SetStart(start) => self.replace(self.draft.with_start(start)),
            EditorEvent::SetEnd(end) => self.replace(self.draft.with_end(end)),
            EditorEvent::SetShift(shift) => self.replace(self.draft.with_shift(shift)),
            EditorEvent::Cancel => {
                self.state = EditorState::Closed(Outcome::Cancelled);
                Ok(None)
            }
            EditorEvent::Commit => self.commit().map(Some),
        }
    }

    fn replace(&mut self, draft: FixedTimeDraft) -> Result<Option<Essence>, EditorError> {
        self.draft = draft;
        self.revalidate();
        Ok(None)
    }

    fn revalidate(&mut self) {
        self.state = match self.validator().validate(&self.draft) {
            Ok(()) => EditorState::Ready,
            Err(reason) => EditorState::Blocked(reason),
        };
        debug!(dimension = %self.dimension, state = ?self.state, "time filter draft revalidated");
    }

    fn commit(&mut self) -> Result<Essence, EditorError> {
        match self.state {
            EditorState::Ready => {
                let essence = self
                    .validator()
                    .commit(&self.draft)
                    .map_err(EditorError::NotReady)?;
                self.state = EditorState::Closed(Outcome::Committed);
                Ok(essence)
            }
            EditorState::Blocked(reason) => Err(EditorError::NotReady(reason)),
            EditorState::Editing => {
                // 尚未收到字段事件：先对预填草稿做一次校验，再按结论处理。
                self.revalidate();
                self.commit()
            }
            EditorState::Closed(_) => Err(EditorError::Closed),
        }
    }
}
