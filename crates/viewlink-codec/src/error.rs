//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 解码是不可信输入的入口，所有失败都必须是带类型的结果，调用方据此回退到空会话；
//! - 四类错误对用户呈现相同（“无法恢复此链接”），但日志需要稳定错误码区分根因。
//!
//! ## 设计要求（What）
//! - [`DecodeError`] 派生 `thiserror::Error`，[`DecodeError::code`] 返回 [`codes`] 中的常量；
//! - 错误中只携带定位所需的上下文（版本号、索引、简短原因），不回显整段载荷。

use thiserror::Error;

use crate::lz::LzError;

/// 稳定错误码。
pub mod codes {
    pub const UNKNOWN_VERSION: &str = "codec.unknown_version";
    pub const MALFORMED_PAYLOAD: &str = "codec.malformed_payload";
    pub const INVALID_BACK_REFERENCE: &str = "codec.invalid_back_reference";
    pub const MIGRATION_FAILED: &str = "codec.migration_failed";
}

/// 令牌解码错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把“版本不认识”“载荷坏了”“旧字典被滥用”“升级步骤看不懂输入”分开记录，
///   便于区分是令牌本身损坏还是迁移链存在缺陷；
/// - **契约 (What)**：任何变体出现时，解码都没有产生部分结果；
///   [`DecodeError::is_malformed`] 把后三类归入“载荷损坏”族，供只关心用户提示的调用方使用；
/// - **风险 (Trade-offs)**：原因以 `String` 保存，牺牲少量分配换取可读日志。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    /// 版本前缀无法解析，或解析出的版本没有对应解码器。
    #[error("unknown token version `{tag}`")]
    UnknownVersion { tag: String },

    /// 传输编码损坏、解压失败、结构不符，或迁移后的树无法提升为会话快照。
    #[error("malformed token payload: {reason}")]
    MalformedPayload { reason: String },

    /// 第 2 版回引用指向尚未完整物化的字典项。
    #[error("back-reference #{index} is not materialized (dictionary holds {len} entries)")]
    InvalidBackReference { index: u64, len: usize },

    /// 迁移步骤遇到无法升级的形状；该步骤的结果被整体丢弃。
    #[error("migration from version {from} to {to} failed: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },
}

impl DecodeError {
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::UnknownVersion { .. } => codes::UNKNOWN_VERSION,
            DecodeError::MalformedPayload { .. } => codes::MALFORMED_PAYLOAD,
            DecodeError::InvalidBackReference { .. } => codes::INVALID_BACK_REFERENCE,
            DecodeError::MigrationFailed { .. } => codes::MIGRATION_FAILED,
        }
    }

    /// 用户侧等同于“载荷损坏”的错误。
    pub fn is_malformed(&self) -> bool {
        !matches!(self, DecodeError::UnknownVersion { .. })
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        DecodeError::MalformedPayload {
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_version(tag: impl Into<String>) -> Self {
        DecodeError::UnknownVersion { tag: tag.into() }
    }
}

impl From<LzError> for DecodeError {
    fn from(err: LzError) -> Self {
        DecodeError::malformed(err.to_string())
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::malformed(format!("invalid JSON: {err}"))
    }
}

impl From<viewlink_core::ModelError> for DecodeError {
    fn from(err: viewlink_core::ModelError) -> Self {
        DecodeError::malformed(err.to_string())
    }
}
