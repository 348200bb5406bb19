//! # config 模块说明
//!
//! ## 角色定位（Why）
//! - 令牌来自地址栏，属于不可信输入；解码需要对长度、解压产物与回引用展开规模设上限，
//!   防止构造出的小令牌在解码时膨胀成巨大的结构；
//! - 上限以 TOML 声明，宿主可以随部署调整而无需重新编译。
//!
//! ## 契约（What）
//! - 每个字段都有默认值，缺省的 TOML 表即为默认配置；未知字段拒绝加载，避免拼写错误被静默忽略；
//! - 超过任一上限的令牌被视为 `MalformedPayload`。

use serde::Deserialize;
use thiserror::Error;

/// 解码资源上限。
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// 令牌最大字节数。
    pub max_token_length: usize,
    /// 解压后载荷最大 UTF-16 码元数。
    pub max_decompressed_units: usize,
    /// 回引用展开后 JSON 节点总数上限。
    pub max_materialized_nodes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            max_token_length: 64 * 1024,
            max_decompressed_units: 1024 * 1024,
            max_materialized_nodes: 100_000,
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid codec configuration: {0}")]
pub struct ConfigError(#[from] toml::de::Error);

impl CodecConfig {
    /// 从 TOML 文本加载，例如：
    ///
    /// ```toml
    /// max_token_length = 8192
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(CodecConfig::from_toml_str("").unwrap(), CodecConfig::default());
    }

    #[test]
    fn partial_document_overrides_selected_limits() {
        let config = CodecConfig::from_toml_str("max_token_length = 2048\n").unwrap();
        assert_eq!(config.max_token_length, 2048);
        assert_eq!(config.max_materialized_nodes, 100_000);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CodecConfig::from_toml_str("max_tokens = 1\n").is_err());
    }
}
