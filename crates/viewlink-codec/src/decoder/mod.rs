//! # decoder 模块说明
//!
//! ## 角色定位（Why）
//! - 每个历史令牌版本对应一种载荷文法；解码器把各自的文法还原为同一种 [`IntermediateState`]，
//!   后续只需一条迁移链；
//! - 版本分派是一张以版本号为键的表，另有一个默认项负责没有版本前缀的隐式格式，
//!   新增版本只需注册一个解码器。
//!
//! ## 契约（What）
//! - 解码器只做“传输解码 + 结构化”，不做跨版本语义转换；
//! - 任何结构问题都报告为 `MalformedPayload`（或第 2 版的 `InvalidBackReference`）。

mod json;
mod positional;

use std::collections::BTreeMap;

pub use json::JsonDecoder;
pub use positional::{V1Decoder, V2Decoder};

use crate::{
    CodecConfig, DecodeError, IntermediateState,
    token::{TokenParts, VersionTag},
};

/// 单个版本的载荷解码策略。
pub trait VersionDecoder: Send + Sync + 'static {
    /// 产出的中间表示所处的模式版本。
    fn version(&self) -> u32;

    fn decode(
        &self,
        parts: &TokenParts<'_>,
        config: &CodecConfig,
    ) -> Result<IntermediateState, DecodeError>;
}

/// 版本号到解码器的分派表。
///
/// # 教案式说明
/// - **意图 (Why)**：以查表替代条件链，保证“显式版本”与“隐式版本”的分派规则集中在一处；
/// - **契约 (What)**：显式版本必须在表中注册，否则为 `UnknownVersion`；隐式令牌总是交给默认项；
/// - **风险 (Trade-offs)**：默认项不会被显式版本号命中，因此 `1/...` 这样的令牌同样是未知版本。
pub struct DecoderTable {
    explicit: BTreeMap<u32, Box<dyn VersionDecoder>>,
    implicit: Box<dyn VersionDecoder>,
}

impl DecoderTable {
    pub fn new(implicit: Box<dyn VersionDecoder>) -> Self {
        DecoderTable {
            explicit: BTreeMap::new(),
            implicit,
        }
    }

    /// 注册显式版本解码器；同版本重复注册时后者覆盖前者。
    pub fn with(mut self, decoder: Box<dyn VersionDecoder>) -> Self {
        self.explicit.insert(decoder.version(), decoder);
        self
    }

    /// 全部历史版本：隐式第 1 版，显式第 2、3、4 版。
    pub fn standard() -> Self {
        DecoderTable::new(Box::new(V1Decoder))
            .with(Box::new(V2Decoder))
            .with(Box::new(JsonDecoder::new(3)))
            .with(Box::new(JsonDecoder::new(4)))
    }

    pub fn lookup(&self, tag: VersionTag) -> Result<&dyn VersionDecoder, DecodeError> {
        match tag {
            VersionTag::Implicit => Ok(self.implicit.as_ref()),
            VersionTag::Explicit(version) => self
                .explicit
                .get(&version)
                .map(|decoder| decoder.as_ref())
                .ok_or_else(|| DecodeError::unknown_version(version.to_string())),
        }
    }

    pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
        self.explicit.keys().copied()
    }
}

impl Default for DecoderTable {
    fn default() -> Self {
        DecoderTable::standard()
    }
}

/// 所有版本共享的传输解码：长度上限 + LZ 解压。
pub(crate) fn unpack(payload: &str, config: &CodecConfig) -> Result<String, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::malformed("empty payload"));
    }
    let text = crate::lz::decompress_from_base64(payload, config.max_decompressed_units)?;
    if text.is_empty() {
        return Err(DecodeError::malformed("payload decompresses to nothing"));
    }
    Ok(text)
}
