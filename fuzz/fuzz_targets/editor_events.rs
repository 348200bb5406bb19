#![no_main]

use arbitrary::Arbitrary;
use chrono::{DateTime, TimeDelta, Utc};
use libfuzzer_sys::fuzz_target;
use viewlink_core::{Essence, Timekeeper, Visualization};
use viewlink_timefilter::{EditorError, EditorEvent, EditorState, FixedTimeEditor};

/// 编辑器事件序列。
///
/// - **Why**：界面可能以任意顺序转发字段变更、提交与取消；
/// - **What**：验证终态之后一律拒绝事件，且只有 `Ready` 下的提交会产出新会话。
#[derive(Debug, Arbitrary)]
struct EditorCase {
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Start(Option<i32>),
    End(Option<i32>),
    Shift(ShiftText),
    Commit,
    Cancel,
}

#[derive(Debug, Arbitrary)]
enum ShiftText {
    Empty,
    Days(u8),
    Hours(u16),
    Raw(String),
}

impl ShiftText {
    fn render(self) -> String {
        match self {
            ShiftText::Empty => String::new(),
            ShiftText::Days(days) => format!("P{days}D"),
            ShiftText::Hours(hours) => format!("PT{hours}H"),
            ShiftText::Raw(text) => text,
        }
    }
}

fn instant(minutes: i32) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::minutes(i64::from(minutes))
}

fuzz_target!(|case: EditorCase| {
    let timekeeper = Timekeeper::fixed(instant(26_000_000));
    let mut editor = FixedTimeEditor::open(Essence::new(Visualization::Table), "time", &timekeeper);

    for op in case.ops {
        let before = editor.state();
        let event = match op {
            Op::Start(minutes) => EditorEvent::SetStart(minutes.map(instant)),
            Op::End(minutes) => EditorEvent::SetEnd(minutes.map(instant)),
            Op::Shift(text) => EditorEvent::SetShift(text.render()),
            Op::Commit => EditorEvent::Commit,
            Op::Cancel => EditorEvent::Cancel,
        };
        let is_commit = event == EditorEvent::Commit;
        let result = editor.apply(event);

        if before.is_closed() {
            assert_eq!(result, Err(EditorError::Closed));
            continue;
        }
        match result {
            Ok(Some(_)) => {
                assert!(is_commit);
                assert_ne!(before, EditorState::Blocked(viewlink_timefilter::BlockReason::Unchanged));
                assert!(editor.state().is_closed());
            }
            Ok(None) => assert!(!is_commit),
            Err(EditorError::NotReady(reason)) => {
                assert!(is_commit);
                assert_eq!(editor.state(), EditorState::Blocked(reason));
            }
            Err(EditorError::Closed) => unreachable!("open editor reported closed"),
        }
    }
});
