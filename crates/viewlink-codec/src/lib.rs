//! `viewlink-codec` 把会话快照编码为可分享的版本化令牌，并解码历史上出现过的每一种令牌格式。
//!
//! # 教案背景（Why）
//! - 令牌格式随产品演进改过多次，已分享出去的链接无法撤回，因此解码侧必须永久兼容所有旧格式，
//!   而编码侧只产出当前格式；
//! - 令牌来自地址栏，属于不可信输入：任何失败都以 [`DecodeError`] 返回，从不 panic，
//!   也从不产生部分应用的结果。
//!
//! # 使用概览（How）
//! - [`StateCodec::encode`] 把 [`viewlink_core::Essence`] 直接写成当前版本令牌；
//! - [`StateCodec::decode`] 依次执行：[`token::split`] 拆分版本前缀 → [`DecoderTable`] 分派到对应的
//!   [`VersionDecoder`] 得到 [`IntermediateState`]（第 2 版经 [`HashTable`] 还原回引用）→
//!   [`MigrationChain`] 逐步升级到当前版本 → 按当前模式提升为强类型快照。
//!
//! # 合约说明（What）
//! - 往返律：对任何合法构造的快照 `s`，`decode(encode(s)) == s`；
//! - 当前版本的中间表示经过迁移链保持不变；
//! - 资源上限由 [`CodecConfig`] 声明，超限一律视为 `MalformedPayload`。
//!
//! # 风险提示与后续（Trade-offs）
//! - 传输层是与历史 JavaScript 生产者逐字节一致的 lz-string 实现，换用其他压缩算法会让已分享的
//!   当前版本令牌无法逐字节重现；
//! - 新增版本时只需注册解码器与迁移步骤，并把 [`CURRENT_VERSION`] 前移。

mod codec;
mod config;
mod decoder;
pub mod definition;
mod error;
mod hash_table;
pub mod ir;
pub mod lz;
mod migration;
pub mod token;

pub use codec::StateCodec;
pub use config::{CodecConfig, ConfigError};
pub use decoder::{DecoderTable, JsonDecoder, V1Decoder, V2Decoder, VersionDecoder};
pub use definition::ViewDefinition4;
pub use error::{DecodeError, codes};
pub use hash_table::HashTable;
pub use ir::IntermediateState;
pub use migration::{MigrationChain, StepFn};

/// 编码器产出的令牌版本。
pub const CURRENT_VERSION: u32 = 4;
