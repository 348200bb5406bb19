//! # migration 模块说明
//!
//! ## 角色定位（Why）
//! - 令牌模式演进过多次，解码器只负责把各版本还原成中间树，跨版本的语义转换集中在这里；
//! - 每一步只知道“从 N 升到 N+1”，任意旧版本沿链逐步走到当前版本。
//!
//! ## 契约（What）
//! - 步骤是纯函数 `&Value -> Result<Value, String>`：输入不被修改，失败时整步结果被丢弃，
//!   链路以 `MigrationFailed { from, to }` 终止，从不产生“升级了一半”的树；
//! - 对已是当前版本的中间表示运行整条链是恒等变换，因此重复运行也是恒等的。

mod expression;
mod v1_to_v2;
mod v2_to_v3;
mod v3_to_v4;

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::{CURRENT_VERSION, DecodeError, IntermediateState};

/// 单步升级函数。
pub type StepFn = fn(&Value) -> Result<Value, String>;

/// 迁移链：以起始版本为键的升级步骤表。
pub struct MigrationChain {
    steps: BTreeMap<u32, StepFn>,
    target: u32,
}

impl MigrationChain {
    /// 空链，目标版本为 `target`。
    pub fn new(target: u32) -> Self {
        MigrationChain {
            steps: BTreeMap::new(),
            target,
        }
    }

    /// 注册从 `from` 升到 `from + 1` 的步骤。
    pub fn with_step(mut self, from: u32, step: StepFn) -> Self {
        self.steps.insert(from, step);
        self
    }

    /// 1 → 2 → 3 → 4。
    pub fn standard() -> Self {
        MigrationChain::new(CURRENT_VERSION)
            .with_step(1, v1_to_v2::migrate)
            .with_step(2, v2_to_v3::migrate)
            .with_step(3, v3_to_v4::migrate)
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// 把中间表示逐步升级到目标版本。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：统一处理所有历史版本，调用方拿到的一定是目标版本的树；
    /// - **契约 (What)**：版本高于目标或链中缺少某一步时返回 `MigrationFailed`；
    /// - **执行 (How)**：每步在新树上运行，成功后才替换当前树，并以 `debug!` 记录一次升级。
    pub fn run(&self, state: IntermediateState) -> Result<IntermediateState, DecodeError> {
        let IntermediateState {
            mut version,
            mut tree,
        } = state;

        if version > self.target {
            return Err(DecodeError::MigrationFailed {
                from: version,
                to: self.target,
                reason: "version is newer than the current schema".to_owned(),
            });
        }

        while version < self.target {
            let to = version + 1;
            let step = self.steps.get(&version).ok_or_else(|| DecodeError::MigrationFailed {
                from: version,
                to,
                reason: "no migration step registered".to_owned(),
            })?;
            tree = step(&tree).map_err(|reason| DecodeError::MigrationFailed {
                from: version,
                to,
                reason,
            })?;
            debug!(from = version, to, "migrated view definition");
            version = to;
        }

        Ok(IntermediateState::new(version, tree))
    }
}

impl Default for MigrationChain {
    fn default() -> Self {
        MigrationChain::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn current_state_passes_through_unchanged() {
        let chain = MigrationChain::standard();
        let state = IntermediateState::new(CURRENT_VERSION, json!({"anything": [1, 2, 3]}));
        let once = chain.run(state.clone()).unwrap();
        let twice = chain.run(once.clone()).unwrap();
        assert_eq!(once, state);
        assert_eq!(twice, state);
    }

    #[test]
    fn missing_step_fails_without_partial_result() {
        let chain = MigrationChain::new(3).with_step(1, |tree| Ok(tree.clone()));
        let err = chain.run(IntermediateState::new(1, json!({}))).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MigrationFailed {
                from: 2,
                to: 3,
                reason: "no migration step registered".into()
            }
        );
    }

    #[test]
    fn newer_versions_are_rejected() {
        let chain = MigrationChain::standard();
        let err = chain.run(IntermediateState::new(CURRENT_VERSION + 1, json!({})));
        assert!(matches!(err, Err(DecodeError::MigrationFailed { .. })));
    }
}
